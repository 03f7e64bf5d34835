use std::fmt;

#[derive(Debug)]
pub enum ImportError {
    /// TOML parse / deserialization error in the import profile.
    ProfileParse(String),
    /// Profile validation error (implausible skip count, etc.).
    ProfileValidation(String),
    /// No line in the file looks like the aging export's header row.
    HeaderRowNotFound,
    /// A required canonical column is absent after synonym mapping.
    MissingColumn { column: &'static str },
    /// A data row has no resolvable customer value. Fatal: silently
    /// dropping a debtor record is unacceptable.
    CustomerKeyMissing { line: u64 },
    /// Malformed delimited text (unbalanced quotes, etc.).
    Csv(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileParse(msg) => write!(f, "profile parse error: {msg}"),
            Self::ProfileValidation(msg) => write!(f, "profile validation error: {msg}"),
            Self::HeaderRowNotFound => {
                write!(f, "no header row found (no line with both a customer and a due-date column)")
            }
            Self::MissingColumn { column } => {
                write!(f, "input is missing required column '{column}'")
            }
            Self::CustomerKeyMissing { line } => {
                write!(f, "line {line}: row has no customer value")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}
