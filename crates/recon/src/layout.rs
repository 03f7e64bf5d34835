//! The persisted worklist layout.
//!
//! # Column Contract
//!
//! The worksheet carries a fixed 11-column block. The first six are
//! derived and rewritten every run; the last five are operator-owned and
//! MUST never appear in an update's write range after the row is created.
//!
//! | #  | Column                              | Owner    |
//! |----|-------------------------------------|----------|
//! | 1  | Customer                            | pipeline |
//! | 2  | Amount                              | pipeline |
//! | 3  | Date                                | pipeline |
//! | 4  | Days Outstanding                    | pipeline |
//! | 5  | Bucket                              | pipeline |
//! | 6  | Collection Item                     | pipeline |
//! | 7  | Action Taken                        | operator |
//! | 8  | Slack Updated                       | operator |
//! | 9  | No Work List                        | operator |
//! | 10 | Removed from No Work List Approver  | operator |
//! | 11 | Demand Letter                       | operator |
//!
//! Column A of the sheet is reserved (the block starts at B), the header
//! sits at row 3, and the sheet is capped at 2000 rows. All three are
//! layout parameters, not constants baked into the engine.

use crate::store::CellValue;

/// Fixed column order of the worklist block.
pub const COLUMNS: [&str; 11] = [
    "Customer",
    "Amount",
    "Date",
    "Days Outstanding",
    "Bucket",
    "Collection Item",
    "Action Taken",
    "Slack Updated",
    "No Work List",
    "Removed from No Work List Approver",
    "Demand Letter",
];

/// Width of every update write: the derived columns only.
pub const CORE_COLUMNS: usize = 6;

/// Choice list applied to the Action Taken column.
pub const ACTION_TAKEN_OPTIONS: [&str; 6] = [
    "Emailed",
    "Called",
    "Escalated to CSM",
    "Payment Plan",
    "Promise to Pay",
    "Sent to Collections",
];

/// Choice list applied to the approver column.
pub const APPROVER_OPTIONS: [&str; 4] = ["Dana W.", "Priya R.", "Marcus C.", "Elena K."];

// ---------------------------------------------------------------------------
// Layout parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WorklistLayout {
    /// 1-based row of the header line.
    pub header_row: u32,
    /// 1-based column of Customer; everything left of it stays reserved.
    pub first_col: u32,
    /// Hard row ceiling for the worksheet.
    pub max_rows: u32,
}

impl Default for WorklistLayout {
    fn default() -> Self {
        Self {
            header_row: 3,
            first_col: 2,
            max_rows: 2000,
        }
    }
}

impl WorklistLayout {
    /// Column holding the business key (Customer).
    pub fn key_col(&self) -> u32 {
        self.first_col
    }

    /// Absolute column of the i-th worklist column (0-based index into
    /// [`COLUMNS`]).
    pub fn col(&self, index: usize) -> u32 {
        self.first_col + index as u32
    }

    pub fn last_col(&self) -> u32 {
        self.first_col + COLUMNS.len() as u32 - 1
    }

    pub fn first_data_row(&self) -> u32 {
        self.header_row + 1
    }

    pub fn header_values(&self) -> Vec<CellValue> {
        COLUMNS.iter().map(|c| CellValue::text(*c)).collect()
    }

    /// Pad a block starting at `first_col` out to a full sheet row
    /// starting at column 1, for appends.
    pub fn pad_row(&self, values: Vec<CellValue>) -> Vec<CellValue> {
        let mut row = vec![CellValue::Text(String::new()); (self.first_col - 1) as usize];
        row.extend(values);
        row
    }

    /// Per-column validation rules applied once at provisioning.
    pub fn validation_rules(&self) -> Vec<ColumnRule> {
        let to_list = |opts: &[&str]| opts.iter().map(|s| s.to_string()).collect();
        vec![
            ColumnRule {
                col: self.col(6),
                rule: ValidationRule::OneOfList(to_list(&ACTION_TAKEN_OPTIONS)),
            },
            ColumnRule {
                col: self.col(7),
                rule: ValidationRule::Checkbox,
            },
            ColumnRule {
                col: self.col(8),
                rule: ValidationRule::Checkbox,
            },
            ColumnRule {
                col: self.col(9),
                rule: ValidationRule::OneOfList(to_list(&APPROVER_OPTIONS)),
            },
            ColumnRule {
                col: self.col(10),
                rule: ValidationRule::Checkbox,
            },
        ]
    }

    /// Per-column number formats applied once at provisioning.
    pub fn number_formats(&self) -> Vec<ColumnFormat> {
        vec![
            ColumnFormat {
                col: self.col(1),
                format: NumberFormat::Currency,
            },
            ColumnFormat {
                col: self.col(2),
                format: NumberFormat::IsoDate,
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRule {
    pub col: u32,
    pub rule: ValidationRule,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// Boolean checkbox cell.
    Checkbox,
    /// Single-select dropdown over a fixed option list.
    OneOfList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFormat {
    pub col: u32,
    pub format: NumberFormat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberFormat {
    Currency,
    /// `yyyy-mm-dd`.
    IsoDate,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry() {
        let l = WorklistLayout::default();
        assert_eq!(l.key_col(), 2); // column B
        assert_eq!(l.last_col(), 12); // column L
        assert_eq!(l.first_data_row(), 4);
    }

    #[test]
    fn operator_columns_start_after_core() {
        let l = WorklistLayout::default();
        // First operator column (Action Taken) sits right of the last
        // core column.
        assert_eq!(l.col(CORE_COLUMNS), l.col(CORE_COLUMNS - 1) + 1);
        assert_eq!(COLUMNS[CORE_COLUMNS], "Action Taken");
    }

    #[test]
    fn rules_only_target_operator_columns() {
        let l = WorklistLayout::default();
        let last_core = l.col(CORE_COLUMNS - 1);
        for rule in l.validation_rules() {
            assert!(rule.col > last_core);
        }
    }

    #[test]
    fn formats_target_amount_and_date() {
        let l = WorklistLayout::default();
        let formats = l.number_formats();
        assert_eq!(formats[0].col, 3); // Amount → C
        assert_eq!(formats[0].format, NumberFormat::Currency);
        assert_eq!(formats[1].col, 4); // Date → D
        assert_eq!(formats[1].format, NumberFormat::IsoDate);
    }

    #[test]
    fn pad_row_reserves_leading_columns() {
        let l = WorklistLayout::default();
        let padded = l.pad_row(vec![CellValue::text("Acme")]);
        assert_eq!(padded.len(), 2);
        assert_eq!(padded[0], CellValue::Text(String::new()));
        assert_eq!(padded[1], CellValue::text("Acme"));
    }
}
