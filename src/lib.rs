//! zombiedisk library
//!
//! Finds unattached ("zombie") Azure Managed Disks in a subscription and
//! estimates what they cost each month.

pub mod app;
pub mod azure;
pub mod config;
pub mod disks;
pub mod error;
pub mod error_helpers;
pub mod exit_codes;
pub mod hunt;
pub mod provider;
pub mod report;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use error::{Result, ZombieError};
pub use hunt::hunt;
pub use provider::{DiskSource, RawDisk};
pub use report::{Outcome, Report};
