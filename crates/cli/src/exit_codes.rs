//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad args, unknown saved source, bad filter)  |
//! | 3    | Count export could not be read, downloaded or parsed      |
//! | 4    | System quantity or count target column not found          |
//! | 5    | Settings or saved-sources file invalid                    |
//! | 6    | Report output (JSON or xlsx) could not be written         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input acquisition or parsing failed (missing file, HTTP error,
/// unreadable spreadsheet, unknown sheet, empty input).
pub const EXIT_LOAD: u8 = 3;

/// A required role (system quantity, count target) has no matching column.
pub const EXIT_UNRESOLVED: u8 = 4;

/// Configuration error: settings.toml or sources.csv unreadable or invalid.
pub const EXIT_CONFIG: u8 = 5;

/// Output write failure (--output, --export, sources.csv save).
pub const EXIT_OUTPUT: u8 = 6;
