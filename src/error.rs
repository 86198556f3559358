//! Error types for zombiedisk
//!
//! There are two error types: `ZombieError` (main error enum) and
//! `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `ZombieError`.
//! Nothing below the CLI boundary recovers from an error: a failed run returns
//! `Err` and `app::execute` turns it into a message on stderr and an exit code.
//!
//! ## When to Use Which Error
//!
//! - `Collaborator`: anything that goes wrong while talking to Azure
//!   - authenticating (every credential in the chain failed)
//!   - connecting (transport failure, unreachable endpoint)
//!   - enumerating (non-success response, malformed page)
//!   - Never retried; the run is aborted and no partial report is printed
//!
//! - `ConfigError`: configuration parsing and validation issues
//!   - Automatically converted to `ZombieError::Config` via `#[from]`
//!
//! - `Validation`: bad user input (subscription ID, rate, output format)

use std::fmt;
use thiserror::Error;

/// Which part of the conversation with the disk inventory failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorStage {
    Authenticate,
    Connect,
    Enumerate,
}

impl fmt::Display for CollaboratorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollaboratorStage::Authenticate => "authentication",
            CollaboratorStage::Connect => "connection",
            CollaboratorStage::Enumerate => "disk listing",
        };
        f.write_str(name)
    }
}

/// Main error type for zombiedisk
#[derive(Error, Debug)]
pub enum ZombieError {
    #[error("Azure {stage} failed: {message}")]
    Collaborator {
        stage: CollaboratorStage,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZombieError {
    /// True for failures of the external disk inventory (auth, network, listing)
    pub fn is_collaborator(&self) -> bool {
        matches!(self, ZombieError::Collaborator { .. })
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    ReadError { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ZombieError>;
