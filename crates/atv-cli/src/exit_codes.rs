//! Exit codes for `atv`. Part of the public contract.

pub const SUCCESS: i32 = 0;
/// The operation ran and its answer is negative (absent, not printable,
/// verification failed).
pub const NEGATIVE: i32 = 1;
/// Configuration, archive or initialization error.
pub const CONFIG_ERROR: i32 = 2;
