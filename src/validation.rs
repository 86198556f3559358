//! Input validation utilities
//!
//! Checks user input before any credential is resolved, so a typo fails
//! fast instead of surfacing as an opaque Azure error.

use crate::error::{Result, ZombieError};
use uuid::Uuid;

/// Validate an Azure subscription ID
///
/// Subscription IDs are GUIDs, e.g. `00000000-0000-0000-0000-000000000000`.
pub fn validate_subscription_id(subscription_id: &str) -> Result<()> {
    let trimmed = subscription_id.trim();
    if trimmed.is_empty() {
        return Err(ZombieError::Validation {
            field: "subscription_id".to_string(),
            reason: "Subscription ID cannot be empty".to_string(),
        });
    }

    // Uuid::parse_str also accepts the 32-digit simple form; ARM paths need hyphens
    if trimmed.len() != 36 || Uuid::parse_str(trimmed).is_err() {
        return Err(ZombieError::Validation {
            field: "subscription_id".to_string(),
            reason: format!(
                "Subscription ID must be a GUID like 00000000-0000-0000-0000-000000000000, got: {}",
                subscription_id
            ),
        });
    }

    Ok(())
}

/// Validate the price per GB-month
pub fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ZombieError::Validation {
            field: "rate".to_string(),
            reason: format!("Rate must be a positive number of dollars per GB-month, got: {}", rate),
        });
    }
    Ok(())
}
