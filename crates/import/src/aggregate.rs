use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{AgeBucket, AgedInvoice, CustomerAggregate};

/// Collapse qualifying invoices to one row per customer: sum balances,
/// keep the earliest due date, then re-derive days outstanding from that
/// aggregated date — the bucket must reflect the group's oldest
/// obligation, not any individual invoice.
pub fn aggregate(aged: &[AgedInvoice], today: NaiveDate) -> Vec<CustomerAggregate> {
    let mut groups: BTreeMap<&str, (i64, NaiveDate)> = BTreeMap::new();

    for inv in aged {
        let entry = groups
            .entry(inv.customer.as_str())
            .or_insert((0, inv.due_date));
        entry.0 += inv.balance_cents;
        if inv.due_date < entry.1 {
            entry.1 = inv.due_date;
        }
    }

    groups
        .into_iter()
        .map(|(customer, (amount_cents, oldest_due))| {
            let days_outstanding = (today - oldest_due).num_days();
            let bucket = AgeBucket::for_days(days_outstanding);
            CustomerAggregate {
                customer: customer.to_string(),
                amount_cents,
                oldest_due,
                days_outstanding,
                bucket,
                collection_item: bucket.map(|b| b.collection_item()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CollectionItem;

    fn inv(customer: &str, cents: i64, due: &str) -> AgedInvoice {
        let due_date = NaiveDate::parse_from_str(due, "%Y-%m-%d").unwrap();
        AgedInvoice {
            customer: customer.into(),
            balance_cents: cents,
            due_date,
            days_overdue: 0,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn sums_balances_and_keeps_oldest_date() {
        let aged = vec![
            inv("Acme", 120000, "2024-01-01"),
            inv("Acme", 30000, "2024-02-15"),
        ];
        let aggs = aggregate(&aged, day("2024-03-01"));
        assert_eq!(aggs.len(), 1);
        let a = &aggs[0];
        assert_eq!(a.customer, "Acme");
        assert_eq!(a.amount_cents, 150000);
        assert_eq!(a.oldest_due, day("2024-01-01"));
        assert_eq!(a.days_outstanding, 60);
        assert_eq!(a.bucket, Some(AgeBucket::Days46To60));
        assert_eq!(a.collection_item, Some(CollectionItem::ManagerEscalation));
    }

    #[test]
    fn deterministic_customer_order() {
        let aged = vec![
            inv("Zeta", 100, "2024-01-01"),
            inv("Acme", 100, "2024-01-01"),
            inv("Beta Corp", 100, "2024-01-01"),
        ];
        let aggs = aggregate(&aged, day("2024-03-01"));
        let names: Vec<&str> = aggs.iter().map(|a| a.customer.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Beta Corp", "Zeta"]);
    }

    #[test]
    fn days_outstanding_recomputed_from_group_minimum() {
        // One fresh invoice must not shrink the group's age.
        let aged = vec![
            inv("Acme", 100, "2024-02-20"),
            inv("Acme", 100, "2023-11-01"),
        ];
        let aggs = aggregate(&aged, day("2024-03-01"));
        assert_eq!(aggs[0].days_outstanding, 121);
        assert_eq!(aggs[0].bucket, Some(AgeBucket::Days91Plus));
    }

    #[test]
    fn below_threshold_groups_stay_unbucketed() {
        let aged = vec![inv("Acme", 100, "2024-02-25")];
        let aggs = aggregate(&aged, day("2024-03-01"));
        assert_eq!(aggs[0].days_outstanding, 5);
        assert_eq!(aggs[0].bucket, None);
        assert_eq!(aggs[0].collection_item, None);
    }
}
