//! The narrow table-store contract the reconciliation engine depends on.
//!
//! The engine never talks to a spreadsheet API directly; it sees only
//! this trait. Backends: `duesheet-sheets` (Google Sheets) and the
//! in-memory store in [`crate::memory`].

use std::fmt;

use chrono::NaiveDate;
use duesheet_import::money::format_money;

use crate::layout::WorklistLayout;

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A value written into a single worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// Cents. Rendered as a plain decimal; the currency display format
    /// is column layout, not data.
    Money(i64),
    Date(NaiveDate),
    Int(i64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Backend-neutral rendering. Booleans use the sheet spelling so
    /// user-entered input parses into a real checkbox value.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Money(cents) => format_money(*cents),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Int(n) => n.to_string(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handles + errors
// ---------------------------------------------------------------------------

/// Handle to one worksheet tab inside the backing spreadsheet.
#[derive(Debug, Clone)]
pub struct WorksheetHandle {
    pub title: String,
    /// Backend-assigned id (Sheets needs it for structural requests).
    pub sheet_id: i64,
    /// True when `ensure_worksheet` had to create the tab.
    pub created: bool,
}

#[derive(Debug)]
pub enum StoreError {
    /// The store cannot be reached (network, connectivity, missing
    /// spreadsheet).
    Unavailable(String),
    /// Credentials rejected.
    Auth(String),
    /// The store rejected an individual operation.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "store unreachable: {msg}"),
            Self::Auth(msg) => write!(f, "store auth failed: {msg}"),
            Self::Backend(msg) => write!(f, "store rejected operation: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Read/write/append operations over one spreadsheet. Rows and columns
/// are 1-based. `read_column` returns the column from row 1 down, header
/// rows included, blank-padded to the last occupied row.
pub trait WorksheetStore {
    /// Open the named tab, creating it (with at least the given
    /// dimensions) when absent.
    fn ensure_worksheet(
        &mut self,
        title: &str,
        min_rows: u32,
        min_cols: u32,
    ) -> Result<WorksheetHandle, StoreError>;

    fn read_column(&mut self, ws: &WorksheetHandle, col: u32) -> Result<Vec<String>, StoreError>;

    fn read_cell(&mut self, ws: &WorksheetHandle, row: u32, col: u32)
        -> Result<String, StoreError>;

    /// Write a rectangular block with its top-left corner at (row, col).
    fn write_range(
        &mut self,
        ws: &WorksheetHandle,
        row: u32,
        col: u32,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StoreError>;

    /// Write full-width rows (starting at column 1) directly below
    /// `after_row`.
    fn append_rows(
        &mut self,
        ws: &WorksheetHandle,
        after_row: u32,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StoreError>;

    /// One-time column policy: validation rules and number formats.
    /// Idempotent to call repeatedly.
    fn apply_layout(&mut self, ws: &WorksheetHandle, layout: &WorklistLayout)
        -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_rendering() {
        assert_eq!(CellValue::text("Acme").render(), "Acme");
        assert_eq!(CellValue::Money(150000).render(), "1500.00");
        assert_eq!(
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).render(),
            "2024-01-01"
        );
        assert_eq!(CellValue::Int(60).render(), "60");
        assert_eq!(CellValue::Bool(true).render(), "TRUE");
        assert_eq!(CellValue::Bool(false).render(), "FALSE");
    }
}
