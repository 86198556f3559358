//! Exit code standardization for zombiedisk
//!
//! ## Exit Code Convention
//!
//! - `0` = Success, including the "no zombies" outcome
//! - `1` = Any failure during configuration, authentication, listing or processing
//!
//! Argument parsing errors are reported by clap, which exits with `2`.

use crate::error::Result;

/// Standard exit codes for zombiedisk
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Run failed
    pub const FAILURE: i32 = 1;
}

/// Map the result of a run to a process exit code
pub fn exit_code_for<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => codes::SUCCESS,
        Err(_) => codes::FAILURE,
    }
}
