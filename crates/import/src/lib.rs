//! `duesheet-import` — AR aging CSV import pipeline.
//!
//! Pure transformation crate: raw export text plus an import profile in,
//! per-customer aggregates and run diagnostics out. No spreadsheet or
//! network dependencies.

pub mod aggregate;
pub mod aging;
pub mod error;
pub mod model;
pub mod money;
pub mod normalize;
pub mod profile;

pub use aging::ImportOptions;
pub use error::ImportError;
pub use model::{AgeBucket, CollectionItem, CustomerAggregate, ImportSummary};
pub use profile::ImportProfile;

#[derive(Debug)]
pub struct ImportOutput {
    pub aggregates: Vec<CustomerAggregate>,
    pub summary: ImportSummary,
}

/// Run the full pipeline: normalize → type/age/filter → aggregate.
pub fn run(
    text: &str,
    profile: &ImportProfile,
    options: &ImportOptions,
) -> Result<ImportOutput, ImportError> {
    let normalized = normalize::normalize(text, profile)?;
    let aging = aging::age_and_filter(&normalized.rows, profile, options);
    let aggregates = aggregate::aggregate(&aging.aged, options.today);

    let summary = ImportSummary {
        rows_read: normalized.rows_read,
        marker_rows_dropped: normalized.marker_rows_dropped,
        blank_rows_dropped: normalized.blank_rows_dropped,
        bad_balances: aging.bad_balances,
        bad_dates: aging.bad_dates,
        non_positive_balance: aging.non_positive_balance,
        below_threshold: aging.below_threshold,
        qualified: aging.aged.len(),
        customers: aggregates.len(),
        fallback_customer_header: normalized.fallback_customer_header,
    };

    Ok(ImportOutput {
        aggregates,
        summary,
    })
}
