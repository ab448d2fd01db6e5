//! CLI Exit Code Registry
//!
//! Single source of truth for `tsukiai` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Every order matched an invoice                     |
//! | 1    | At least one order is UNMATCHED (like `diff(1)`)   |
//! | 2    | Usage error (bad arguments, conflicting options)   |
//! | 3    | Input could not be read or parsed                  |
//! | 4    | Input had the wrong shape (not a list of objects)  |
//! | 5    | Invalid config file                                |
//! | 6    | Input file exceeds the size cap                    |

use tsukiai_recon::ReconError;

/// Every order matched.
pub const EXIT_SUCCESS: u8 = 0;

/// Unmatched orders present. Not a failure of the tool itself.
pub const EXIT_UNMATCHED: u8 = 1;

/// Bad arguments or conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// File missing, unreadable, or not valid JSON/CSV.
pub const EXIT_INPUT: u8 = 3;

/// JSON parsed but `orders`/`invoices` are not lists of objects.
pub const EXIT_INPUT_TYPE: u8 = 4;

/// Config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Input file larger than the accepted maximum.
pub const EXIT_TOO_LARGE: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Envelope { .. } | ReconError::InputType { .. } => EXIT_INPUT_TYPE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Csv(_) | ReconError::Json(_) | ReconError::Io(_) => EXIT_INPUT,
    }
}
