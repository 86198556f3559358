//! Azure Resource Manager client
//!
//! - [`credential`] - default credential chain (environment, managed identity, CLI)
//! - [`disks`] - lazy pager over managed disks
//! - [`types`] - ARM and token endpoint wire types
//!
//! The client is built once per run from configuration and an explicit
//! credential; nothing here is global.

pub mod credential;
pub mod disks;
pub mod types;

pub use credential::{
    AccessToken, AzureCliCredential, DefaultCredentialChain, EnvironmentCredential,
    ManagedIdentityCredential, TokenCredential,
};
pub use disks::DiskPager;

use crate::config::AzureConfig;
use crate::error::{CollaboratorStage, Result};
use crate::error_helpers::collaborator_error_from;
use std::sync::Arc;

pub struct ArmClient {
    http: reqwest::Client,
    management_endpoint: String,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
}

impl ArmClient {
    pub fn new(config: &AzureConfig, credential: Arc<dyn TokenCredential>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("zombiedisk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                collaborator_error_from(CollaboratorStage::Connect, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            http,
            management_endpoint: config.management_endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            credential,
        })
    }

    pub fn disks_url(&self, subscription_id: &str) -> String {
        format!(
            "{}/subscriptions/{}/providers/Microsoft.Compute/disks?api-version={}",
            self.management_endpoint,
            subscription_id.trim(),
            self.api_version
        )
    }

    /// Every managed disk in the subscription; nothing is fetched until the
    /// first `next_disk` call
    pub fn list_disks(&self, subscription_id: &str) -> DiskPager {
        DiskPager::new(
            self.http.clone(),
            Arc::clone(&self.credential),
            self.management_endpoint.clone(),
            self.disks_url(subscription_id),
        )
    }
}
