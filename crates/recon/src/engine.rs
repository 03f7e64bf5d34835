//! Reconciliation: diff per-customer aggregates against the persisted
//! worklist, then apply updates and inserts.
//!
//! Two phases. `plan` does every read — key column, current core
//! columns, the header probe — and computes the diff; nothing is written
//! until `apply`, so a store failure during planning aborts with the
//! sheet untouched. Updates target exactly the six derived columns;
//! operator-owned columns are structurally outside every update range.

use std::collections::BTreeMap;

use duesheet_import::money::parse_money;
use duesheet_import::CustomerAggregate;
use serde::Serialize;

use crate::error::ReconError;
use crate::layout::{WorklistLayout, COLUMNS, CORE_COLUMNS};
use crate::store::{CellValue, WorksheetHandle, WorksheetStore};

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RowUpdate {
    pub customer: String,
    /// 1-based target row.
    pub row: u32,
    /// The six derived cells, in column order.
    pub values: Vec<CellValue>,
    /// The stored row already holds these values; apply skips the write.
    pub unchanged: bool,
}

#[derive(Debug)]
pub struct RowInsert {
    pub customer: String,
    /// Full 11-column block (core cells + fresh operator cells).
    pub values: Vec<CellValue>,
}

#[derive(Debug)]
pub struct SyncPlan {
    pub worksheet: WorksheetHandle,
    /// The tab has no header yet; apply writes it and the column layout.
    pub provision: bool,
    pub updates: Vec<RowUpdate>,
    pub inserts: Vec<RowInsert>,
    /// Last occupied row (or the header row on an empty sheet); inserts
    /// land directly below it.
    pub last_row: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub provisioned: bool,
    pub updated: usize,
    pub unchanged: usize,
    pub inserted: usize,
}

// ---------------------------------------------------------------------------
// Cell construction
// ---------------------------------------------------------------------------

fn core_values(agg: &CustomerAggregate) -> Vec<CellValue> {
    vec![
        CellValue::text(agg.customer.clone()),
        CellValue::Money(agg.amount_cents),
        CellValue::Date(agg.oldest_due),
        CellValue::Int(agg.days_outstanding),
        CellValue::text(agg.bucket.map(|b| b.label()).unwrap_or_default()),
        CellValue::text(agg.collection_item.map(|c| c.label()).unwrap_or_default()),
    ]
}

fn insert_values(agg: &CustomerAggregate) -> Vec<CellValue> {
    let mut v = core_values(agg);
    v.push(CellValue::Text(String::new())); // Action Taken
    v.push(CellValue::Bool(false)); // Slack Updated
    v.push(CellValue::Bool(false)); // No Work List
    v.push(CellValue::Text(String::new())); // Approver
    v.push(CellValue::Bool(false)); // Demand Letter
    v
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

pub fn plan(
    store: &mut dyn WorksheetStore,
    tab: &str,
    layout: &WorklistLayout,
    aggregates: &[CustomerAggregate],
) -> Result<SyncPlan, ReconError> {
    let unavailable = |e: crate::store::StoreError| ReconError::StoreUnavailable(e.to_string());

    let ws = store
        .ensure_worksheet(tab, layout.max_rows, layout.last_col())
        .map_err(unavailable)?;

    // All reads happen before any mutation.
    let header_cell = store
        .read_cell(&ws, layout.header_row, layout.key_col())
        .map_err(unavailable)?;
    let provision = match header_cell.trim() {
        "" => true,
        c if c == COLUMNS[0] => false,
        other => {
            return Err(ReconError::LayoutMismatch {
                found: other.to_string(),
            })
        }
    };

    let key_column = store.read_column(&ws, layout.key_col()).map_err(unavailable)?;
    let mut core_columns: Vec<Vec<String>> = Vec::with_capacity(CORE_COLUMNS - 1);
    for i in 1..CORE_COLUMNS {
        core_columns.push(store.read_column(&ws, layout.col(i)).map_err(unavailable)?);
    }

    // customer → row position: trimmed exact match, blanks skipped,
    // first occurrence wins.
    let mut by_key: BTreeMap<&str, u32> = BTreeMap::new();
    let mut last_row = layout.header_row;
    for (i, raw) in key_column.iter().enumerate() {
        let row = i as u32 + 1;
        if row < layout.first_data_row() {
            continue;
        }
        let key = raw.trim();
        if key.is_empty() {
            continue;
        }
        by_key.entry(key).or_insert(row);
        if row > last_row {
            last_row = row;
        }
    }

    let mut updates = Vec::new();
    let mut inserts = Vec::new();
    for agg in aggregates {
        let values = core_values(agg);
        match by_key.get(agg.customer.as_str()) {
            Some(&row) => {
                let unchanged = row_matches(&values, row, &key_column, &core_columns);
                updates.push(RowUpdate {
                    customer: agg.customer.clone(),
                    row,
                    values,
                    unchanged,
                });
            }
            None => inserts.push(RowInsert {
                customer: agg.customer.clone(),
                values: insert_values(agg),
            }),
        }
    }

    let needed = last_row + inserts.len() as u32;
    if needed > layout.max_rows {
        return Err(ReconError::CapacityExceeded {
            needed,
            max: layout.max_rows,
        });
    }

    Ok(SyncPlan {
        worksheet: ws,
        provision,
        updates,
        inserts,
        last_row,
    })
}

fn row_matches(
    planned: &[CellValue],
    row: u32,
    key_column: &[String],
    core_columns: &[Vec<String>],
) -> bool {
    let idx = (row - 1) as usize;
    planned.iter().enumerate().all(|(c, v)| {
        let stored = if c == 0 {
            key_column.get(idx).map(String::as_str).unwrap_or("")
        } else {
            core_columns[c - 1]
                .get(idx)
                .map(String::as_str)
                .unwrap_or("")
        };
        value_equal(v, stored)
    })
}

/// Value-level equality against what the backend returns. Amounts and
/// integers compare numerically so backend display formatting ("$1,500.00"
/// vs "1500.00") doesn't force spurious rewrites.
fn value_equal(planned: &CellValue, stored: &str) -> bool {
    let stored = stored.trim();
    match planned {
        CellValue::Text(s) => s.trim() == stored,
        CellValue::Money(cents) => parse_money(stored).map_or(false, |c| c == *cents),
        CellValue::Date(d) => stored == d.format("%Y-%m-%d").to_string(),
        CellValue::Int(n) => stored.parse::<i64>().map_or(false, |v| v == *n),
        CellValue::Bool(b) => stored.eq_ignore_ascii_case(if *b { "TRUE" } else { "FALSE" }),
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

pub fn apply(
    store: &mut dyn WorksheetStore,
    plan: &SyncPlan,
    layout: &WorklistLayout,
) -> Result<SyncReport, ReconError> {
    let ws = &plan.worksheet;

    if plan.provision {
        store
            .write_range(ws, layout.header_row, layout.first_col, &[layout.header_values()])
            .map_err(|e| ReconError::Provision(e.to_string()))?;
        store
            .apply_layout(ws, layout)
            .map_err(|e| ReconError::Provision(e.to_string()))?;
    }

    let mut updated = 0;
    let mut unchanged = 0;
    for update in &plan.updates {
        if update.unchanged {
            unchanged += 1;
            continue;
        }
        store
            .write_range(
                ws,
                update.row,
                layout.first_col,
                std::slice::from_ref(&update.values),
            )
            .map_err(|e| ReconError::PartialWrite {
                customers: vec![update.customer.clone()],
                detail: format!("update of row {} failed: {e}", update.row),
            })?;
        updated += 1;
    }

    let mut inserted = 0;
    if !plan.inserts.is_empty() {
        let rows: Vec<Vec<CellValue>> = plan
            .inserts
            .iter()
            .map(|i| layout.pad_row(i.values.clone()))
            .collect();
        store
            .append_rows(ws, plan.last_row, &rows)
            .map_err(|e| ReconError::PartialWrite {
                customers: plan.inserts.iter().map(|i| i.customer.clone()).collect(),
                detail: format!("append after row {} failed: {e}", plan.last_row),
            })?;
        inserted = plan.inserts.len();
    }

    Ok(SyncReport {
        provisioned: plan.provision,
        updated,
        unchanged,
        inserted,
    })
}

/// Plan and apply in one step.
pub fn sync(
    store: &mut dyn WorksheetStore,
    tab: &str,
    layout: &WorklistLayout,
    aggregates: &[CustomerAggregate],
) -> Result<SyncReport, ReconError> {
    let plan = plan(store, tab, layout, aggregates)?;
    apply(store, &plan, layout)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
