//! Import profile — the read-mode configuration for one export family.
//!
//! The aging exports this tool ingests vary in ways that must be decided
//! up front, not guessed per file: where the header row sits, which
//! delimiter is used, how dates are formatted, and what to do with rows
//! that fall below the overdue threshold. Each deployment pins one
//! profile (TOML file or the built-in default) and the normalizer
//! consumes it as data.

use serde::Deserialize;

use crate::error::ImportError;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ImportProfile {
    #[serde(default)]
    pub header: HeaderRule,
    #[serde(default)]
    pub delimiter: DelimiterRule,
    #[serde(default)]
    pub date_format: DateFormat,
    /// Treat invoice-date headers as due-date headers during mapping.
    #[serde(default)]
    pub merge_invoice_date: bool,
    #[serde(default)]
    pub below_threshold: BelowThresholdPolicy,
}

impl Default for ImportProfile {
    fn default() -> Self {
        Self {
            header: HeaderRule::default(),
            delimiter: DelimiterRule::default(),
            date_format: DateFormat::default(),
            merge_invoice_date: false,
            below_threshold: BelowThresholdPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Header location
// ---------------------------------------------------------------------------

/// How to find the header row in a file that may open with a title line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HeaderRule {
    /// Scan forward for the first line containing both a customer-like
    /// and a due-date-like header token.
    Search,
    /// Unconditionally skip a fixed number of leading lines.
    Skip { lines: usize },
}

impl Default for HeaderRule {
    fn default() -> Self {
        Self::Search
    }
}

// ---------------------------------------------------------------------------
// Delimiter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterRule {
    /// Sample the header line and pick the most frequent candidate.
    Sniff,
    Comma,
    Semicolon,
    Tab,
}

impl Default for DelimiterRule {
    fn default() -> Self {
        Self::Sniff
    }
}

impl DelimiterRule {
    /// The fixed delimiter byte, or `None` for sniffing.
    pub fn fixed(&self) -> Option<u8> {
        match self {
            Self::Sniff => None,
            Self::Comma => Some(b','),
            Self::Semicolon => Some(b';'),
            Self::Tab => Some(b'\t'),
        }
    }
}

// ---------------------------------------------------------------------------
// Date format
// ---------------------------------------------------------------------------

/// Calendar-date format for due/invoice dates. Explicit per profile —
/// never guessed row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `MM/DD/YYYY` (the QuickBooks export family).
    MonthDayYear,
    /// `YYYY-MM-DD`.
    Iso,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::MonthDayYear
    }
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::MonthDayYear => "%m/%d/%Y",
            Self::Iso => "%Y-%m-%d",
        }
    }
}

// ---------------------------------------------------------------------------
// Below-threshold policy
// ---------------------------------------------------------------------------

/// What happens to rows whose days-overdue falls below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BelowThresholdPolicy {
    /// Exclude them from aggregation entirely.
    Drop,
    /// Keep them; their aggregate may end up with no bucket.
    IncludeUnbucketed,
}

impl Default for BelowThresholdPolicy {
    fn default() -> Self {
        Self::Drop
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ImportProfile {
    pub fn from_toml(input: &str) -> Result<Self, ImportError> {
        let profile: ImportProfile =
            toml::from_str(input).map_err(|e| ImportError::ProfileParse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ImportError> {
        if let HeaderRule::Skip { lines } = self.header {
            // A real title block is one or two lines; double digits means
            // the profile is pointing at the wrong export.
            if lines > 10 {
                return Err(ImportError::ProfileValidation(format!(
                    "header skip of {lines} lines is implausible (max 10)"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
