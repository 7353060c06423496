//! Exit codes of the `facematch` binary.
//!
//! Comparison failures use `ComparisonError::exit_code` (1 invalid input,
//! 3 rejected, 4 no face, 5 unavailable). Clap usage errors exit with 2.

pub const SUCCESS: i32 = 0;
pub const IO_ERROR: i32 = 6; // Local image could not be read
