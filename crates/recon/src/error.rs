use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Reading current store state failed. No mutation was attempted.
    StoreUnavailable(String),
    /// The target tab's header cell holds something other than the
    /// expected header — the tab belongs to someone else.
    LayoutMismatch { found: String },
    /// The sync would run past the worksheet's row ceiling.
    CapacityExceeded { needed: u32, max: u32 },
    /// Writing the header row or column layout failed.
    Provision(String),
    /// A write failed partway through apply. Carries the customers
    /// affected so the operator can reconcile manually or re-run; there
    /// is no row-level transaction to roll back.
    PartialWrite { customers: Vec<String>, detail: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreUnavailable(msg) => {
                write!(f, "store unavailable, nothing written: {msg}")
            }
            Self::LayoutMismatch { found } => {
                write!(f, "worksheet header cell holds {found:?}, refusing to write over it")
            }
            Self::CapacityExceeded { needed, max } => {
                write!(f, "sync needs {needed} rows but the worksheet is capped at {max}")
            }
            Self::Provision(msg) => write!(f, "worksheet provisioning failed: {msg}"),
            Self::PartialWrite { customers, detail } => {
                write!(f, "partial write ({detail}); affected customers: {}", customers.join(", "))
            }
        }
    }
}

impl std::error::Error for ReconError {}
