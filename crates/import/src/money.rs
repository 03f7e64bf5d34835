//! Amount parsing and rendering (string-to-cents, no f64).

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a balance cell to i64 minor units (cents).
///
/// Tolerates the QuickBooks export family's formatting: thousands-separator
/// commas, an optional leading `$`, surrounding whitespace. Handles
/// "1,234.56", "$1234.5", "1234", "-1,234.56". More than two decimal
/// places is an error, not a rounding.
pub fn parse_money(s: &str) -> Result<i64, String> {
    let s = s.trim().trim_start_matches('$');
    let s: String = s.chars().filter(|c| *c != ',').collect();
    let s = s.as_str();
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-').trim_start_matches('$');
    let (dollars, cents) = if let Some(dot) = s.find('.') {
        let d: i64 = s[..dot]
            .parse()
            .map_err(|e| format!("bad dollars: {}", e))?;
        let frac = &s[dot + 1..];
        let c: i64 = match frac.len() {
            0 => 0,
            1 => {
                frac.parse::<i64>()
                    .map_err(|e| format!("bad cents: {}", e))?
                    * 10
            }
            2 => frac.parse().map_err(|e| format!("bad cents: {}", e))?,
            _ => return Err(format!("too many decimal places: {}", s)),
        };
        (d, c)
    } else {
        (s.parse().map_err(|e| format!("bad amount: {}", e))?, 0)
    };
    let minor = dollars * 100 + cents;
    Ok(if negative { -minor } else { minor })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render cents as a plain decimal string ("1234.56", "-0.05").
pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
