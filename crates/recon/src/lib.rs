//! `duesheet-recon` — worklist reconciliation engine.
//!
//! Diffs per-customer aggregates against the persisted worklist through
//! the narrow [`store::WorksheetStore`] contract: update-in-place for
//! known customers (derived columns only), append for new ones, never
//! delete. Backends are injected; this crate performs no IO of its own.

pub mod engine;
pub mod error;
pub mod layout;
pub mod memory;
pub mod store;

pub use engine::{apply, plan, sync, SyncPlan, SyncReport};
pub use error::ReconError;
pub use layout::WorklistLayout;
pub use store::{CellValue, StoreError, WorksheetHandle, WorksheetStore};
