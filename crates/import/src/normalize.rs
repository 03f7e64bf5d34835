//! Schema normalizer: raw export text → canonical invoice rows.
//!
//! The aging exports arrive with an unknown header-row position, a
//! vendor-dependent delimiter, and half a dozen spellings for each column.
//! This module reduces all of that to rows with exactly the canonical
//! fields (customer, balance, due date, optionally invoice date), all
//! values kept as raw strings. Typing happens later, in `aging`.

use crate::error::ImportError;
use crate::model::RawInvoice;
use crate::profile::{HeaderRule, ImportProfile};

/// Subtotal / rubric marker the export emits between aging sections.
const OUT_OF_RANGE_MARKER: &str = "OUT OF RANGE";

/// Recognized field delimiters, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct NormalizeOutput {
    pub rows: Vec<RawInvoice>,
    pub rows_read: usize,
    pub marker_rows_dropped: usize,
    pub blank_rows_dropped: usize,
    /// Set when no recognized customer header existed and the normalizer
    /// fell back to any header containing "customer". Callers warn loudly.
    pub fallback_customer_header: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

pub fn normalize(text: &str, profile: &ImportProfile) -> Result<NormalizeOutput, ImportError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_idx = locate_header(&lines, &profile.header)?;
    let delimiter = match profile.delimiter.fixed() {
        Some(d) => d,
        None => sniff_delimiter(lines[header_idx]),
    };

    let body = lines[header_idx..].join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Csv(e.to_string()))?
        .iter()
        .map(normalize_header)
        .collect();

    // Resolve canonical field → source column. Later occurrences win, so
    // two headers mapping to the same canonical column keep the last one.
    let mut customer_idx: Option<usize> = None;
    let mut balance_idx: Option<usize> = None;
    let mut due_idx: Option<usize> = None;
    let mut invoice_idx: Option<usize> = None;
    for (i, h) in headers.iter().enumerate() {
        match h.as_str() {
            "open balance" | "amount" | "balance" => balance_idx = Some(i),
            "due date" | "duedate" | "invoice due date" => due_idx = Some(i),
            "invoice date" | "date" => {
                if profile.merge_invoice_date {
                    due_idx = Some(i);
                } else {
                    invoice_idx = Some(i);
                }
            }
            "customer full name" | "customer name" | "customer" => customer_idx = Some(i),
            _ => {}
        }
    }

    let balance_idx = balance_idx.ok_or(ImportError::MissingColumn { column: "balance" })?;
    let due_idx = due_idx.ok_or(ImportError::MissingColumn { column: "due_date" })?;

    let mut fallback_customer_header = None;
    let customer_idx = match customer_idx {
        Some(i) => i,
        None => {
            // Last-resort branch: any header containing the word. Brittle
            // by nature, so it is surfaced to the caller, never silent.
            let (i, h) = headers
                .iter()
                .enumerate()
                .find(|(_, h)| h.contains("customer"))
                .ok_or(ImportError::MissingColumn { column: "customer" })?;
            fallback_customer_header = Some(h.clone());
            i
        }
    };

    let mut out = NormalizeOutput {
        rows: Vec::new(),
        rows_read: 0,
        marker_rows_dropped: 0,
        blank_rows_dropped: 0,
        fallback_customer_header,
    };

    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        let line = header_idx as u64 + record.position().map_or(0, |p| p.line());
        out.rows_read += 1;

        if record.iter().all(|c| c.trim().is_empty()) {
            out.blank_rows_dropped += 1;
            continue;
        }

        let customer_raw = record.get(customer_idx).unwrap_or("");
        let due_raw = record.get(due_idx).unwrap_or("");
        if customer_raw.contains(OUT_OF_RANGE_MARKER) || due_raw.contains(OUT_OF_RANGE_MARKER) {
            out.marker_rows_dropped += 1;
            continue;
        }

        let customer = normalize_customer(customer_raw);
        if customer.is_empty() {
            return Err(ImportError::CustomerKeyMissing { line });
        }

        out.rows.push(RawInvoice {
            customer,
            balance: record.get(balance_idx).unwrap_or("").to_string(),
            due_date: due_raw.to_string(),
            invoice_date: invoice_idx.map(|i| record.get(i).unwrap_or("").to_string()),
            line,
        });
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Header location + delimiter sniffing
// ---------------------------------------------------------------------------

fn locate_header(lines: &[&str], rule: &HeaderRule) -> Result<usize, ImportError> {
    match rule {
        HeaderRule::Skip { lines: n } => {
            if lines.len() <= *n {
                return Err(ImportError::HeaderRowNotFound);
            }
            Ok(*n)
        }
        HeaderRule::Search => lines
            .iter()
            .position(|l| looks_like_header(l))
            .ok_or(ImportError::HeaderRowNotFound),
    }
}

/// A header line names both the customer and the due date, whatever the
/// delimiter. Title lines ("A/R Aging Detail") match neither.
fn looks_like_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    (lower.contains("due date") || lower.contains("duedate")) && lower.contains("customer")
}

/// Pick the most frequent candidate delimiter on the header line.
/// Ties resolve in candidate order; a line with none defaults to comma.
fn sniff_delimiter(header_line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0;
    for d in DELIMITER_CANDIDATES {
        let count = header_line.bytes().filter(|b| *b == d).count();
        if count > best_count {
            best = d;
            best_count = count;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

/// Trim, lowercase, and collapse whitespace runs (including non-breaking
/// spaces) to a single ASCII space.
fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        // is_whitespace() covers U+00A0 and friends
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }
    out
}

/// Derive the customer key: everything before the first `:` (QuickBooks
/// sub-customer suffix), a space inserted at each lowercase→uppercase
/// boundary (exports sometimes arrive with spaces stripped), trimmed.
/// Idempotent: a normalized name passes through unchanged.
pub fn normalize_customer(raw: &str) -> String {
    let base = raw.split(':').next().unwrap_or("");
    let mut out = String::with_capacity(base.len() + 4);
    let mut prev_lower = false;
    for ch in base.chars() {
        if prev_lower && ch.is_uppercase() {
            out.push(' ');
        }
        prev_lower = ch.is_lowercase();
        out.push(ch);
    }
    out.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DelimiterRule;

    fn default_profile() -> ImportProfile {
        ImportProfile::default()
    }

    #[test]
    fn customer_key_strips_sub_customer() {
        assert_eq!(normalize_customer("Acme:Sub1"), "Acme");
        assert_eq!(normalize_customer("Acme:Sub1:Deeper"), "Acme");
    }

    #[test]
    fn customer_key_repairs_camel_case() {
        assert_eq!(normalize_customer("JohnDoeLLC"), "John Doe LLC");
        assert_eq!(normalize_customer("acmeCorp"), "acme Corp");
    }

    #[test]
    fn customer_key_is_idempotent() {
        for name in ["John Doe LLC", "Acme", "Beta Corp", "  padded  "] {
            let once = normalize_customer(name);
            assert_eq!(normalize_customer(&once), once);
        }
    }

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header("  Due\u{a0}Date "), "due date");
        assert_eq!(normalize_header("Customer   Full\t Name"), "customer full name");
        assert_eq!(normalize_header("Open Balance"), "open balance");
    }

    #[test]
    fn sniffs_semicolon() {
        assert_eq!(sniff_delimiter("Customer;Due Date;Open Balance"), b';');
        assert_eq!(sniff_delimiter("Customer\tDue Date\tOpen Balance"), b'\t');
        assert_eq!(sniff_delimiter("Customer,Due Date,Open Balance"), b',');
        assert_eq!(sniff_delimiter("no delimiters here"), b',');
    }

    #[test]
    fn searches_past_title_line() {
        let csv = "\
A/R Aging Detail as of 03/01/2024
Customer,Due Date,Open Balance
Acme,01/01/2024,\"1,200.00\"
";
        let out = normalize(csv, &default_profile()).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].customer, "Acme");
        assert_eq!(out.rows[0].balance, "1,200.00");
        assert_eq!(out.rows[0].due_date, "01/01/2024");
    }

    #[test]
    fn skip_mode_takes_fixed_offset() {
        let csv = "\
ignored title that even says customer and due date later? no.
Customer,Due Date,Open Balance
Acme,01/01/2024,100.00
";
        let profile = ImportProfile {
            header: HeaderRule::Skip { lines: 1 },
            ..default_profile()
        };
        let out = normalize(csv, &profile).unwrap();
        assert_eq!(out.rows.len(), 1);
    }

    #[test]
    fn missing_balance_column_is_fatal() {
        let csv = "Customer,Due Date\nAcme,01/01/2024\n";
        let err = normalize(csv, &default_profile()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { column: "balance" }));
    }

    #[test]
    fn missing_due_date_column_is_fatal() {
        // skip mode: search would already fail to find a header line
        let csv = "Customer,Open Balance\nAcme,100.00\n";
        let profile = ImportProfile {
            header: HeaderRule::Skip { lines: 0 },
            ..default_profile()
        };
        let err = normalize(csv, &profile).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { column: "due_date" }));
    }

    #[test]
    fn no_header_anywhere() {
        let err = normalize("just,some,numbers\n1,2,3\n", &default_profile()).unwrap_err();
        assert!(matches!(err, ImportError::HeaderRowNotFound));
    }

    #[test]
    fn duplicate_canonical_columns_keep_last() {
        let csv = "Customer,Balance,Open Balance,Due Date\nAcme,1.00,2.00,01/01/2024\n";
        let out = normalize(csv, &default_profile()).unwrap();
        assert_eq!(out.rows[0].balance, "2.00");
    }

    #[test]
    fn merge_invoice_date_folds_into_due() {
        let csv = "Customer,Open Balance,Invoice Date\nAcme,1.00,01/05/2024\n";
        let profile = ImportProfile {
            merge_invoice_date: true,
            ..default_profile()
        };
        let out = normalize(csv, &profile).unwrap();
        assert_eq!(out.rows[0].due_date, "01/05/2024");
        assert!(out.rows[0].invoice_date.is_none());
    }

    #[test]
    fn invoice_date_kept_distinct_by_default() {
        let csv = "Customer,Open Balance,Due Date,Invoice Date\nAcme,1.00,02/01/2024,01/05/2024\n";
        let out = normalize(csv, &default_profile()).unwrap();
        assert_eq!(out.rows[0].due_date, "02/01/2024");
        assert_eq!(out.rows[0].invoice_date.as_deref(), Some("01/05/2024"));
    }

    #[test]
    fn out_of_range_rows_dropped() {
        let csv = "\
Customer,Due Date,Open Balance
Acme,01/01/2024,100.00
OUT OF RANGE,,950.00
Beta,OUT OF RANGE,50.00
";
        let out = normalize(csv, &default_profile()).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.marker_rows_dropped, 2);
    }

    #[test]
    fn blank_rows_dropped_silently() {
        let csv = "Customer,Due Date,Open Balance\nAcme,01/01/2024,100.00\n,,\n";
        let out = normalize(csv, &default_profile()).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.blank_rows_dropped, 1);
    }

    #[test]
    fn blank_customer_cell_is_fatal() {
        let csv = "Customer,Due Date,Open Balance\n,01/01/2024,100.00\n";
        let err = normalize(csv, &default_profile()).unwrap_err();
        assert!(matches!(err, ImportError::CustomerKeyMissing { .. }));
    }

    #[test]
    fn fallback_customer_column_is_surfaced() {
        let csv = "Customer (Projects),Due Date,Open Balance\nAcme,01/01/2024,100.00\n";
        let out = normalize(csv, &default_profile()).unwrap();
        assert_eq!(
            out.fallback_customer_header.as_deref(),
            Some("customer (projects)")
        );
        assert_eq!(out.rows[0].customer, "Acme");
    }

    #[test]
    fn semicolon_export_parses() {
        let csv = "Customer;Due Date;Open Balance\nAcme;01/01/2024;100,00\n";
        let profile = ImportProfile {
            delimiter: DelimiterRule::Semicolon,
            ..default_profile()
        };
        let out = normalize(csv, &profile).unwrap();
        assert_eq!(out.rows[0].balance, "100,00");
    }
}
