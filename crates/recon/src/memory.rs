//! In-memory worksheet store. Backs the engine's tests; holds rendered
//! strings exactly the way a remote backend would echo them back.

use std::collections::BTreeMap;

use crate::layout::WorklistLayout;
use crate::store::{CellValue, StoreError, WorksheetHandle, WorksheetStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: BTreeMap<String, Sheet>,
    next_sheet_id: i64,
    /// When set, every write fails with this message. Drives the
    /// partial-write paths in tests.
    pub fail_writes: Option<String>,
}

#[derive(Debug, Default)]
struct Sheet {
    rows: Vec<Vec<String>>,
    layouts_applied: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a cell without going through the trait (test assertions).
    pub fn cell(&self, title: &str, row: u32, col: u32) -> String {
        self.sheets
            .get(title)
            .and_then(|s| s.rows.get((row - 1) as usize))
            .and_then(|r| r.get((col - 1) as usize))
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a cell, growing the sheet as needed (test fixtures).
    pub fn set_cell(&mut self, title: &str, row: u32, col: u32, value: &str) {
        let sheet = self.sheets.entry(title.to_string()).or_default();
        sheet.set(row, col, value);
    }

    /// Number of rows with at least one non-blank cell.
    pub fn occupied_rows(&self, title: &str) -> usize {
        self.sheets.get(title).map_or(0, |s| {
            s.rows
                .iter()
                .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
                .count()
        })
    }

    pub fn layouts_applied(&self, title: &str) -> u32 {
        self.sheets.get(title).map_or(0, |s| s.layouts_applied)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        match &self.fail_writes {
            Some(msg) => Err(StoreError::Backend(msg.clone())),
            None => Ok(()),
        }
    }
}

impl Sheet {
    fn set(&mut self, row: u32, col: u32, value: &str) {
        let (r, c) = ((row - 1) as usize, (col - 1) as usize);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize_with(c + 1, String::new);
        }
        cells[c] = value.to_string();
    }
}

impl WorksheetStore for MemoryStore {
    fn ensure_worksheet(
        &mut self,
        title: &str,
        _min_rows: u32,
        _min_cols: u32,
    ) -> Result<WorksheetHandle, StoreError> {
        let created = !self.sheets.contains_key(title);
        if created {
            self.sheets.insert(title.to_string(), Sheet::default());
            self.next_sheet_id += 1;
        }
        Ok(WorksheetHandle {
            title: title.to_string(),
            sheet_id: self.next_sheet_id,
            created,
        })
    }

    fn read_column(&mut self, ws: &WorksheetHandle, col: u32) -> Result<Vec<String>, StoreError> {
        let sheet = self
            .sheets
            .get(&ws.title)
            .ok_or_else(|| StoreError::Unavailable(format!("no worksheet {:?}", ws.title)))?;
        Ok(sheet
            .rows
            .iter()
            .map(|r| r.get((col - 1) as usize).cloned().unwrap_or_default())
            .collect())
    }

    fn read_cell(&mut self, ws: &WorksheetHandle, row: u32, col: u32) -> Result<String, StoreError> {
        if !self.sheets.contains_key(&ws.title) {
            return Err(StoreError::Unavailable(format!("no worksheet {:?}", ws.title)));
        }
        Ok(self.cell(&ws.title, row, col))
    }

    fn write_range(
        &mut self,
        ws: &WorksheetHandle,
        row: u32,
        col: u32,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let sheet = self
            .sheets
            .get_mut(&ws.title)
            .ok_or_else(|| StoreError::Unavailable(format!("no worksheet {:?}", ws.title)))?;
        for (i, values) in rows.iter().enumerate() {
            for (j, value) in values.iter().enumerate() {
                sheet.set(row + i as u32, col + j as u32, &value.render());
            }
        }
        Ok(())
    }

    fn append_rows(
        &mut self,
        ws: &WorksheetHandle,
        after_row: u32,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        self.write_range(ws, after_row + 1, 1, rows)
    }

    fn apply_layout(
        &mut self,
        ws: &WorksheetHandle,
        _layout: &WorklistLayout,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let sheet = self
            .sheets
            .get_mut(&ws.title)
            .ok_or_else(|| StoreError::Unavailable(format!("no worksheet {:?}", ws.title)))?;
        sheet.layouts_applied += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read_back() {
        let mut store = MemoryStore::new();
        let ws = store.ensure_worksheet("Worklist", 100, 12).unwrap();
        assert!(ws.created);

        store
            .write_range(&ws, 3, 2, &[vec![CellValue::text("Customer"), CellValue::text("Amount")]])
            .unwrap();
        assert_eq!(store.read_cell(&ws, 3, 2).unwrap(), "Customer");
        assert_eq!(store.read_column(&ws, 3).unwrap(), vec!["", "", "Amount"]);
    }

    #[test]
    fn append_lands_below_given_row() {
        let mut store = MemoryStore::new();
        let ws = store.ensure_worksheet("Worklist", 100, 12).unwrap();
        store
            .append_rows(&ws, 4, &[vec![CellValue::text("x")], vec![CellValue::text("y")]])
            .unwrap();
        assert_eq!(store.cell("Worklist", 5, 1), "x");
        assert_eq!(store.cell("Worklist", 6, 1), "y");
    }

    #[test]
    fn poisoned_writes_fail() {
        let mut store = MemoryStore::new();
        let ws = store.ensure_worksheet("Worklist", 100, 12).unwrap();
        store.fail_writes = Some("quota".into());
        let err = store
            .write_range(&ws, 1, 1, &[vec![CellValue::text("x")]])
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn reopening_is_not_a_create() {
        let mut store = MemoryStore::new();
        assert!(store.ensure_worksheet("W", 10, 10).unwrap().created);
        assert!(!store.ensure_worksheet("W", 10, 10).unwrap().created);
    }
}
