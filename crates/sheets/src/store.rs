//! `WorksheetStore` over the Google Sheets v4 REST API.

use std::path::Path;

use serde_json::{json, Value};

use duesheet_recon::layout::{NumberFormat, ValidationRule, WorklistLayout};
use duesheet_recon::{CellValue, StoreError, WorksheetHandle, WorksheetStore};

use crate::client::SheetsClient;
use crate::credentials;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

// ── Store ───────────────────────────────────────────────────────────

pub struct SheetsStore {
    client: SheetsClient,
    spreadsheet_id: String,
}

impl SheetsStore {
    /// Connect with a credentials file: exchange the refresh token for an
    /// access token and persist the rotated credentials back.
    pub fn connect(spreadsheet_id: &str, credentials_path: &Path) -> Result<Self, StoreError> {
        let creds = credentials::load_credentials(credentials_path)?;
        let http = reqwest::blocking::Client::new();
        let refreshed = credentials::refresh_access_token(&creds, &http, credentials::TOKEN_URL)?;
        if let Err(e) = credentials::save_credentials(&refreshed, credentials_path) {
            eprintln!("warning: could not persist rotated credentials: {}", e);
        }
        Ok(Self::with_token(
            spreadsheet_id,
            &refreshed.access_token,
            SHEETS_API_BASE,
        ))
    }

    /// Wrap a ready access token. Tests point `base_url` at a mock server.
    pub fn with_token(spreadsheet_id: &str, access_token: &str, base_url: &str) -> Self {
        Self {
            client: SheetsClient::new(base_url.to_string(), access_token.to_string()),
            spreadsheet_id: spreadsheet_id.to_string(),
        }
    }

    fn values_path(&self, range: &str) -> String {
        format!("/v4/spreadsheets/{}/values/{}", self.spreadsheet_id, range)
    }

    fn batch_update_path(&self) -> String {
        format!("/v4/spreadsheets/{}:batchUpdate", self.spreadsheet_id)
    }

    fn block_range(&self, title: &str, r1: u32, c1: u32, r2: u32, c2: u32) -> String {
        format!(
            "'{}'!{}{}:{}{}",
            quote_title(title),
            col_letter(c1),
            r1,
            col_letter(c2),
            r2,
        )
    }

    fn column_range(&self, title: &str, col: u32) -> String {
        let letter = col_letter(col);
        format!("'{}'!{}:{}", quote_title(title), letter, letter)
    }
}

// ── Contract ────────────────────────────────────────────────────────

impl WorksheetStore for SheetsStore {
    fn ensure_worksheet(
        &mut self,
        title: &str,
        min_rows: u32,
        min_cols: u32,
    ) -> Result<WorksheetHandle, StoreError> {
        let meta = self.client.get(&format!(
            "/v4/spreadsheets/{}?fields=sheets.properties",
            self.spreadsheet_id,
        ))?;

        let existing = meta["sheets"].as_array().and_then(|sheets| {
            sheets.iter().find_map(|s| {
                let props = &s["properties"];
                if props["title"].as_str() == Some(title) {
                    props["sheetId"].as_i64()
                } else {
                    None
                }
            })
        });
        if let Some(sheet_id) = existing {
            return Ok(WorksheetHandle {
                title: title.to_string(),
                sheet_id,
                created: false,
            });
        }

        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": min_rows,
                            "columnCount": min_cols,
                        },
                    },
                },
            }],
        });
        let reply = self.client.post_json(&self.batch_update_path(), &body)?;
        let sheet_id = reply["replies"][0]["addSheet"]["properties"]["sheetId"]
            .as_i64()
            .unwrap_or(0);

        Ok(WorksheetHandle {
            title: title.to_string(),
            sheet_id,
            created: true,
        })
    }

    fn read_column(&mut self, ws: &WorksheetHandle, col: u32) -> Result<Vec<String>, StoreError> {
        let path = format!(
            "{}?majorDimension=COLUMNS",
            self.values_path(&self.column_range(&ws.title, col)),
        );
        let body = self.client.get(&path)?;
        Ok(body["values"][0]
            .as_array()
            .map(|cells| cells.iter().map(json_cell_to_string).collect())
            .unwrap_or_default())
    }

    fn read_cell(
        &mut self,
        ws: &WorksheetHandle,
        row: u32,
        col: u32,
    ) -> Result<String, StoreError> {
        let range = self.block_range(&ws.title, row, col, row, col);
        let body = self.client.get(&self.values_path(&range))?;
        Ok(json_cell_to_string(&body["values"][0][0]))
    }

    fn write_range(
        &mut self,
        ws: &WorksheetHandle,
        row: u32,
        col: u32,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        if width == 0 {
            return Ok(());
        }
        let range = self.block_range(
            &ws.title,
            row,
            col,
            row + rows.len() as u32 - 1,
            col + width - 1,
        );
        let values: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(CellValue::render).collect())
            .collect();
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        self.client.put_json(
            &format!("{}?valueInputOption=USER_ENTERED", self.values_path(&range)),
            &body,
        )?;
        Ok(())
    }

    fn append_rows(
        &mut self,
        ws: &WorksheetHandle,
        after_row: u32,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        // Deterministic placement: write the block directly below
        // after_row rather than relying on the append API's table
        // detection.
        self.write_range(ws, after_row + 1, 1, rows)
    }

    fn apply_layout(
        &mut self,
        ws: &WorksheetHandle,
        layout: &WorklistLayout,
    ) -> Result<(), StoreError> {
        let mut requests = Vec::new();

        for rule in layout.validation_rules() {
            let condition = match &rule.rule {
                ValidationRule::Checkbox => json!({ "type": "BOOLEAN" }),
                ValidationRule::OneOfList(options) => json!({
                    "type": "ONE_OF_LIST",
                    "values": options
                        .iter()
                        .map(|o| json!({ "userEnteredValue": o }))
                        .collect::<Vec<_>>(),
                }),
            };
            requests.push(json!({
                "setDataValidation": {
                    "range": grid_range(ws.sheet_id, layout, rule.col),
                    "rule": {
                        "condition": condition,
                        "showCustomUi": true,
                        "strict": false,
                    },
                },
            }));
        }

        for format in layout.number_formats() {
            let number_format = match format.format {
                NumberFormat::Currency => json!({ "type": "CURRENCY", "pattern": "$#,##0.00" }),
                NumberFormat::IsoDate => json!({ "type": "DATE", "pattern": "yyyy-mm-dd" }),
            };
            requests.push(json!({
                "repeatCell": {
                    "range": grid_range(ws.sheet_id, layout, format.col),
                    "cell": {
                        "userEnteredFormat": { "numberFormat": number_format },
                    },
                    "fields": "userEnteredFormat.numberFormat",
                },
            }));
        }

        self.client
            .post_json(&self.batch_update_path(), &json!({ "requests": requests }))?;
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// GridRange for one column's data rows: 0-based, end-exclusive.
fn grid_range(sheet_id: i64, layout: &WorklistLayout, col: u32) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": layout.first_data_row() - 1,
        "endRowIndex": layout.max_rows,
        "startColumnIndex": col - 1,
        "endColumnIndex": col,
    })
}

fn json_cell_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 sheet titles double embedded quotes.
fn quote_title(title: &str) -> String {
    title.replace('\'', "''")
}

/// 1-based column index → A1 letters (1 → A, 27 → AA).
fn col_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        letters.push(b'A' + ((col - 1) % 26) as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII by construction")
}

// ── Tests ───────────────────────────────────────────────────────────
