//! Helper functions for creating actionable error messages
//!
//! Collaborator errors are built here so every call site reports the same
//! shape, and the remediation tips printed on failure live in one place.

use crate::error::{CollaboratorStage, ZombieError};

/// Static guidance printed to stderr after a failed run
pub const REMEDIATION_TIPS: &str = concat!(
    "\nTips:\n",
    " - Ensure a credential in the default chain can authenticate:\n",
    "   * az login\n",
    "   * or set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET\n",
    "   * or run on a host with a Managed Identity assigned\n",
    " - Verify the subscription ID is correct.\n",
);

/// Create a collaborator error without an underlying source
pub fn collaborator_error(stage: CollaboratorStage, message: impl Into<String>) -> ZombieError {
    ZombieError::Collaborator {
        stage,
        message: message.into(),
        source: None,
    }
}

/// Create a collaborator error that keeps the underlying cause in the chain
pub fn collaborator_error_from<E>(
    stage: CollaboratorStage,
    message: impl Into<String>,
    source: E,
) -> ZombieError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ZombieError::Collaborator {
        stage,
        message: message.into(),
        source: Some(Box::new(source)),
    }
}

/// Classify a reqwest failure as a connection or listing problem
pub fn http_error(context: &str, err: reqwest::Error) -> ZombieError {
    let stage = if err.is_connect() || err.is_timeout() || err.is_request() {
        CollaboratorStage::Connect
    } else {
        CollaboratorStage::Enumerate
    };
    let message = format!("{}: {}", context, err);
    collaborator_error_from(stage, message, err)
}

/// Append numbered troubleshooting steps to a message
pub fn with_troubleshooting(message: impl Into<String>, steps: &[&str]) -> String {
    let mut message = message.into();
    if !steps.is_empty() {
        message.push_str("\n\nTroubleshooting:\n");
        for (i, step) in steps.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, step));
        }
    }
    message
}
