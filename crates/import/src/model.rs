use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Pipeline rows
// ---------------------------------------------------------------------------

/// One invoice line after header mapping. Cells are still raw strings —
/// no numeric or date coercion happens at parse time.
#[derive(Debug, Clone)]
pub struct RawInvoice {
    /// Normalized customer key (sub-customer suffix stripped, camel-case
    /// repaired, trimmed).
    pub customer: String,
    pub balance: String,
    pub due_date: String,
    pub invoice_date: Option<String>,
    /// 1-based line number in the source file, for diagnostics.
    pub line: u64,
}

/// A typed invoice row. Balance and due date fail to parse independently;
/// a failed cell is an explicit `None`, never a silent zero.
#[derive(Debug, Clone)]
pub struct CanonicalInvoice {
    pub customer: String,
    pub balance_cents: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub invoice_date: Option<NaiveDate>,
}

/// An invoice with both cells typed and its age computed.
#[derive(Debug, Clone)]
pub struct AgedInvoice {
    pub customer: String,
    pub balance_cents: i64,
    pub due_date: NaiveDate,
    pub days_overdue: i64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One row per customer among the qualifying invoices. Recomputed fully
/// each run; never carried over from a previous run.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerAggregate {
    pub customer: String,
    /// Sum of qualifying balances, in cents.
    pub amount_cents: i64,
    /// Earliest due date across the group.
    pub oldest_due: NaiveDate,
    /// Recomputed from `oldest_due`, not from any per-invoice value: the
    /// bucket must reflect the group's oldest obligation.
    pub days_outstanding: i64,
    pub bucket: Option<AgeBucket>,
    pub collection_item: Option<CollectionItem>,
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Age bucket driving the escalation workflow. Total over days
/// outstanding ≥ 21; below that a row is unbucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBucket {
    Days21To30,
    Days31To45,
    Days46To60,
    Days61To90,
    Days91Plus,
}

impl AgeBucket {
    /// Lowest interval first, first match wins.
    pub fn for_days(days: i64) -> Option<Self> {
        match days {
            21..=30 => Some(Self::Days21To30),
            31..=45 => Some(Self::Days31To45),
            46..=60 => Some(Self::Days46To60),
            61..=90 => Some(Self::Days61To90),
            d if d >= 91 => Some(Self::Days91Plus),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Days21To30 => "21-30",
            Self::Days31To45 => "31-45",
            Self::Days46To60 => "46-60",
            Self::Days61To90 => "61-90",
            Self::Days91Plus => "91+",
        }
    }

    pub fn collection_item(&self) -> CollectionItem {
        match self {
            Self::Days21To30 => CollectionItem::AccountingOutreach,
            Self::Days31To45 => CollectionItem::CsmAeOutreach,
            Self::Days46To60 => CollectionItem::ManagerEscalation,
            Self::Days61To90 => CollectionItem::AddToNoWorkList,
            Self::Days91Plus => CollectionItem::DemandLetter,
        }
    }
}

impl std::fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The workflow step a bucket maps to. Fixed function of the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionItem {
    AccountingOutreach,
    CsmAeOutreach,
    ManagerEscalation,
    AddToNoWorkList,
    DemandLetter,
}

impl CollectionItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccountingOutreach => "Accounting Outreach",
            Self::CsmAeOutreach => "CSM/AE Outreach",
            Self::ManagerEscalation => "Manager Escalation",
            Self::AddToNoWorkList => "Add to No Work List",
            Self::DemandLetter => "Demand Letter",
        }
    }
}

impl std::fmt::Display for CollectionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Count of per-cell failures plus a capped sample of the raw values,
/// enough for the run summary to be actionable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FailureSamples {
    pub count: usize,
    pub samples: Vec<String>,
}

impl FailureSamples {
    const MAX_SAMPLES: usize = 5;

    pub fn record(&mut self, raw: &str) {
        self.count += 1;
        if self.samples.len() < Self::MAX_SAMPLES {
            self.samples.push(raw.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Everything the run summary prints about the import stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub marker_rows_dropped: usize,
    pub blank_rows_dropped: usize,
    pub bad_balances: FailureSamples,
    pub bad_dates: FailureSamples,
    pub non_positive_balance: usize,
    pub below_threshold: usize,
    pub qualified: usize,
    pub customers: usize,
    /// Set when the normalizer fell back to a header merely containing
    /// "customer". The caller is expected to warn loudly.
    pub fallback_customer_header: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
