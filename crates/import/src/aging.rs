//! Aging calculator: cell typing, days overdue, the overdue filter.

use chrono::NaiveDate;

use crate::model::{AgedInvoice, CanonicalInvoice, FailureSamples, RawInvoice};
use crate::money::parse_money;
use crate::profile::{BelowThresholdPolicy, DateFormat, ImportProfile};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Runtime knobs for one run. `today` is captured once at run start and
/// reused for every row, keeping a run internally consistent.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub today: NaiveDate,
    pub min_days_overdue: i64,
    /// Disable the days clause of the overdue filter entirely: every
    /// positive balance qualifies, due yet or not.
    pub process_all: bool,
}

// ---------------------------------------------------------------------------
// Typing
// ---------------------------------------------------------------------------

/// Type one raw row. Balance and due date fail independently into `None`
/// — never a silent zero. The date format comes from the profile; it is
/// never guessed per row.
pub fn canonicalize(raw: &RawInvoice, format: DateFormat) -> CanonicalInvoice {
    CanonicalInvoice {
        customer: raw.customer.clone(),
        balance_cents: parse_money(&raw.balance).ok(),
        due_date: NaiveDate::parse_from_str(raw.due_date.trim(), format.pattern()).ok(),
        invoice_date: raw
            .invoice_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), format.pattern()).ok()),
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AgingOutcome {
    pub aged: Vec<AgedInvoice>,
    pub bad_balances: FailureSamples,
    pub bad_dates: FailureSamples,
    pub non_positive_balance: usize,
    pub below_threshold: usize,
}

/// Type every row, compute days overdue against the run date, and apply
/// the overdue filter. Per-cell parse failures land in the diagnostics,
/// never abort the run.
pub fn age_and_filter(
    rows: &[RawInvoice],
    profile: &ImportProfile,
    options: &ImportOptions,
) -> AgingOutcome {
    let mut outcome = AgingOutcome::default();

    for raw in rows {
        let canonical = canonicalize(raw, profile.date_format);
        if canonical.balance_cents.is_none() {
            outcome.bad_balances.record(&raw.balance);
        }
        if canonical.due_date.is_none() {
            outcome.bad_dates.record(&raw.due_date);
        }
        // A row with an unparsable due date is excluded from aging
        // entirely, regardless of balance sign.
        let (Some(balance_cents), Some(due_date)) =
            (canonical.balance_cents, canonical.due_date)
        else {
            continue;
        };

        if balance_cents <= 0 {
            outcome.non_positive_balance += 1;
            continue;
        }

        let days_overdue = (options.today - due_date).num_days();
        if !options.process_all && days_overdue < options.min_days_overdue {
            outcome.below_threshold += 1;
            if profile.below_threshold == BelowThresholdPolicy::Drop {
                continue;
            }
        }

        outcome.aged.push(AgedInvoice {
            customer: raw.customer.clone(),
            balance_cents,
            due_date,
            days_overdue,
        });
    }

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(customer: &str, balance: &str, due: &str) -> RawInvoice {
        RawInvoice {
            customer: customer.into(),
            balance: balance.into(),
            due_date: due.into(),
            invoice_date: None,
            line: 1,
        }
    }

    fn options(today: &str, min: i64) -> ImportOptions {
        ImportOptions {
            today: NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap(),
            min_days_overdue: min,
            process_all: false,
        }
    }

    #[test]
    fn unparsable_due_date_excluded_regardless_of_balance() {
        let rows = vec![raw("Acme", "500.00", "not a date"), raw("Acme", "-10.00", "??")];
        let out = age_and_filter(&rows, &ImportProfile::default(), &options("2024-03-01", 21));
        assert!(out.aged.is_empty());
        assert_eq!(out.bad_dates.count, 2);
        assert_eq!(out.bad_dates.samples, vec!["not a date", "??"]);
    }

    #[test]
    fn unparsable_balance_excluded_and_sampled() {
        let rows = vec![raw("Acme", "n/a", "01/01/2024")];
        let out = age_and_filter(&rows, &ImportProfile::default(), &options("2024-03-01", 21));
        assert!(out.aged.is_empty());
        assert_eq!(out.bad_balances.count, 1);
        assert_eq!(out.bad_balances.samples, vec!["n/a"]);
    }

    #[test]
    fn both_cells_can_fail_on_one_row() {
        let rows = vec![raw("Acme", "oops", "oops")];
        let out = age_and_filter(&rows, &ImportProfile::default(), &options("2024-03-01", 21));
        assert_eq!(out.bad_balances.count, 1);
        assert_eq!(out.bad_dates.count, 1);
    }

    #[test]
    fn zero_and_credit_balances_do_not_qualify() {
        let rows = vec![raw("A", "0.00", "01/01/2024"), raw("B", "-25.00", "01/01/2024")];
        let out = age_and_filter(&rows, &ImportProfile::default(), &options("2024-03-01", 21));
        assert!(out.aged.is_empty());
        assert_eq!(out.non_positive_balance, 2);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 2024-02-09 → 21 days before 2024-03-01
        let rows = vec![raw("A", "10.00", "02/09/2024"), raw("B", "10.00", "02/10/2024")];
        let out = age_and_filter(&rows, &ImportProfile::default(), &options("2024-03-01", 21));
        assert_eq!(out.aged.len(), 1);
        assert_eq!(out.aged[0].customer, "A");
        assert_eq!(out.aged[0].days_overdue, 21);
        assert_eq!(out.below_threshold, 1);
    }

    #[test]
    fn include_unbucketed_keeps_below_threshold_rows() {
        let profile = ImportProfile {
            below_threshold: BelowThresholdPolicy::IncludeUnbucketed,
            ..ImportProfile::default()
        };
        let rows = vec![raw("A", "10.00", "02/25/2024")];
        let out = age_and_filter(&rows, &profile, &options("2024-03-01", 21));
        assert_eq!(out.aged.len(), 1);
        assert_eq!(out.aged[0].days_overdue, 5);
        assert_eq!(out.below_threshold, 1);
    }

    #[test]
    fn process_all_includes_not_yet_due() {
        let opts = ImportOptions {
            process_all: true,
            ..options("2024-03-01", 21)
        };
        let rows = vec![raw("A", "10.00", "04/01/2024")];
        let out = age_and_filter(&rows, &ImportProfile::default(), &opts);
        assert_eq!(out.aged.len(), 1);
        assert_eq!(out.aged[0].days_overdue, -31);
    }

    #[test]
    fn iso_profile_parses_iso_dates() {
        let profile = ImportProfile {
            date_format: DateFormat::Iso,
            ..ImportProfile::default()
        };
        let rows = vec![raw("A", "10.00", "2024-01-01")];
        let out = age_and_filter(&rows, &profile, &options("2024-03-01", 21));
        assert_eq!(out.aged.len(), 1);
        assert_eq!(out.aged[0].days_overdue, 60);
    }
}
