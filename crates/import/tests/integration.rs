//! End-to-end pipeline tests: raw export text in, aggregates out.

use chrono::NaiveDate;

use duesheet_import::model::{AgeBucket, CollectionItem};
use duesheet_import::profile::{BelowThresholdPolicy, HeaderRule};
use duesheet_import::{run, ImportError, ImportOptions, ImportProfile};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn options(today: &str) -> ImportOptions {
    ImportOptions {
        today: day(today),
        min_days_overdue: 21,
        process_all: false,
    }
}

#[test]
fn quickbooks_style_export() {
    let csv = "\
A/R Aging Detail as of March 1, 2024
Customer Full Name,Invoice Date,Due Date,Open Balance
Acme:Project X,12/15/2023,01/01/2024,\"1,200.00\"
Acme,01/30/2024,02/15/2024,300.00
OUT OF RANGE,,,12345.00
JohnDoeLLC,01/01/2024,01/15/2024,$500.00
Beta:West,n/a,02/01/2024,not a number
Gamma,01/01/2024,02/25/2024,75.00
Delta,01/01/2024,02/01/2024,-40.00
";
    let out = run(csv, &ImportProfile::default(), &options("2024-03-01")).unwrap();

    // Gamma is only 5 days overdue, Delta is a credit, Beta's balance is
    // unparsable, the marker row is dropped. Three invoices qualify,
    // collapsing to two customers.
    assert_eq!(out.summary.rows_read, 7);
    assert_eq!(out.summary.marker_rows_dropped, 1);
    assert_eq!(out.summary.bad_balances.count, 1);
    assert_eq!(out.summary.below_threshold, 1);
    assert_eq!(out.summary.non_positive_balance, 1);
    assert_eq!(out.summary.qualified, 3);
    assert_eq!(out.summary.customers, 2);

    let acme = out
        .aggregates
        .iter()
        .find(|a| a.customer == "Acme")
        .unwrap();
    assert_eq!(acme.amount_cents, 150000);
    assert_eq!(acme.oldest_due, day("2024-01-01"));
    assert_eq!(acme.days_outstanding, 60);
    assert_eq!(acme.bucket, Some(AgeBucket::Days46To60));
    assert_eq!(acme.collection_item, Some(CollectionItem::ManagerEscalation));

    let doe = out
        .aggregates
        .iter()
        .find(|a| a.customer == "John Doe LLC")
        .unwrap();
    assert_eq!(doe.amount_cents, 50000);
    assert_eq!(doe.days_outstanding, 46);
}

#[test]
fn unparsable_due_date_never_reaches_an_aggregate() {
    let csv = "\
Customer,Due Date,Open Balance
Acme,bogus,9999.00
Acme,01/01/2024,100.00
";
    let out = run(csv, &ImportProfile::default(), &options("2024-03-01")).unwrap();
    assert_eq!(out.summary.bad_dates.count, 1);
    assert_eq!(out.aggregates.len(), 1);
    assert_eq!(out.aggregates[0].amount_cents, 10000);
}

#[test]
fn skip_profile_with_semicolons_and_iso_dates() {
    let toml = r#"
header = { mode = "skip", lines = 1 }
delimiter = "semicolon"
date_format = "iso"
"#;
    let profile = ImportProfile::from_toml(toml).unwrap();
    let csv = "\
export 2024-03-01
Customer;Due Date;Amount
Acme;2024-01-01;150.00
";
    let out = run(csv, &profile, &options("2024-03-01")).unwrap();
    assert_eq!(out.aggregates.len(), 1);
    assert_eq!(out.aggregates[0].days_outstanding, 60);
}

#[test]
fn include_unbucketed_groups_have_empty_bucket() {
    let profile = ImportProfile {
        below_threshold: BelowThresholdPolicy::IncludeUnbucketed,
        ..ImportProfile::default()
    };
    let csv = "\
Customer,Due Date,Open Balance
Fresh Co,02/27/2024,10.00
";
    let out = run(csv, &profile, &options("2024-03-01")).unwrap();
    assert_eq!(out.aggregates.len(), 1);
    assert_eq!(out.aggregates[0].bucket, None);
    assert_eq!(out.aggregates[0].collection_item, None);
}

#[test]
fn missing_required_column_aborts_whole_run() {
    let csv = "Customer,Due Date\nAcme,01/01/2024\n";
    let err = run(csv, &ImportProfile::default(), &options("2024-03-01")).unwrap_err();
    assert!(matches!(err, ImportError::MissingColumn { column: "balance" }));
}

#[test]
fn header_search_tolerates_nothing_but_title_lines() {
    let profile = ImportProfile {
        header: HeaderRule::Search,
        ..ImportProfile::default()
    };
    let err = run("only a title\nno header here\n", &profile, &options("2024-03-01"))
        .unwrap_err();
    assert!(matches!(err, ImportError::HeaderRowNotFound));
}
