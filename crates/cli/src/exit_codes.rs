//! CLI Exit Code Registry
//!
//! Single source of truth for all exit codes. Exit codes are part of the
//! shell contract — the cron wrapper and alerting scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                |
//! |---------|-----------|--------------------------------------------|
//! | 0       | Universal | Success                                    |
//! | 1       | Universal | General error (unspecified)                |
//! | 2       | Universal | CLI usage error (bad args, bad profile)    |
//! | 10-19   | input     | Input discovery and structure              |
//! | 20-29   | store     | Worklist store (Sheets backend)            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid profile.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (10-19)
// =============================================================================

/// No file matches the input glob. Nothing was processed.
pub const EXIT_NO_INPUT: u8 = 10;

/// The input file is structurally unusable: no header row, or a required
/// column is missing after synonym mapping.
pub const EXIT_BAD_INPUT: u8 = 11;

/// A data row has no resolvable customer key. The batch is refused
/// rather than silently dropping a debtor record.
pub const EXIT_CUSTOMER_KEY: u8 = 12;

// =============================================================================
// Store (20-29)
// =============================================================================

/// The store could not be read; no mutation was attempted.
pub const EXIT_STORE_UNAVAILABLE: u8 = 20;

/// A write failed partway through apply. The message names the affected
/// customers; re-running is safe.
pub const EXIT_PARTIAL_WRITE: u8 = 21;

/// Store credentials missing, unreadable, or rejected.
pub const EXIT_AUTH: u8 = 22;

/// The sync would run past the worksheet's row ceiling.
pub const EXIT_CAPACITY: u8 = 23;

/// The target tab's header cell holds foreign content.
pub const EXIT_LAYOUT_MISMATCH: u8 = 24;
