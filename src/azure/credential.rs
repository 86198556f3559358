//! Default Azure credential chain
//!
//! Tries, in order: service principal from environment variables, managed
//! identity, then the Azure CLI login session. The first credential that
//! returns a token wins and is used alone from then on. A credential that is
//! fully configured but rejected ends the chain; if every credential is merely
//! unavailable, the individual failures are folded into one authentication
//! error.

use crate::azure::types::{
    parse_unix_seconds, AadErrorResponse, AadTokenResponse, CliTokenResponse,
    ManagedIdentityTokenResponse,
};
use crate::config::{AzureConfig, CredentialConfig};
use crate::error::{CollaboratorStage, Result};
use crate::error_helpers::{collaborator_error, collaborator_error_from};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Bearer token for Azure Resource Manager
#[derive(Clone)]
pub struct AccessToken {
    pub secret: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_on: Option<DateTime<Utc>>) -> Self {
        Self {
            secret: secret.into(),
            expires_on,
        }
    }

    /// Expired, or expiring within the next minute
    pub fn is_expired(&self) -> bool {
        match self.expires_on {
            Some(expires_on) => expires_on
                .checked_sub_signed(ChronoDuration::seconds(60))
                .map_or(true, |refresh_at| refresh_at <= Utc::now()),
            None => false,
        }
    }
}

// Never print the token itself
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Something that can hand out ARM tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in logs and aggregated errors
    fn name(&self) -> &'static str;

    /// Explicitly set up for this environment, so a failure is a real
    /// rejection rather than the source being unavailable
    fn is_configured(&self) -> bool {
        false
    }

    /// `resource` is the ARM audience, e.g. `https://management.azure.com`
    async fn get_token(&self, http: &reqwest::Client, resource: &str) -> Result<AccessToken>;
}

fn auth_error(message: impl Into<String>) -> crate::error::ZombieError {
    collaborator_error(CollaboratorStage::Authenticate, message)
}

fn auth_error_from(
    message: impl Into<String>,
    source: reqwest::Error,
) -> crate::error::ZombieError {
    collaborator_error_from(CollaboratorStage::Authenticate, message, source)
}

/// Service principal with a client secret
pub struct EnvironmentCredential {
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    authority_host: String,
}

impl EnvironmentCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authority_host: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            authority_host: authority_host.into(),
        }
    }

    /// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`;
    /// `AZURE_AUTHORITY_HOST` overrides the configured authority
    pub fn from_env(authority_host: &str) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            tenant_id: var("AZURE_TENANT_ID"),
            client_id: var("AZURE_CLIENT_ID"),
            client_secret: var("AZURE_CLIENT_SECRET"),
            authority_host: var("AZURE_AUTHORITY_HOST")
                .unwrap_or_else(|| authority_host.to_string()),
        }
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn is_configured(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    async fn get_token(&self, http: &reqwest::Client, resource: &str) -> Result<AccessToken> {
        let (Some(tenant_id), Some(client_id), Some(client_secret)) =
            (&self.tenant_id, &self.client_id, &self.client_secret)
        else {
            return Err(auth_error(
                "AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET are not all set",
            ));
        };

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            tenant_id
        );
        let scope = format!("{}/.default", resource.trim_end_matches('/'));
        debug!("Requesting client credentials token from {}", url);

        let response = http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| auth_error_from(format!("Failed to reach {}", url), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| auth_error_from("Failed to read token response", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<AadErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {}", e.error, desc),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(auth_error(format!(
                "Token request rejected (HTTP {}): {}",
                status.as_u16(),
                detail
            )));
        }

        let token: AadTokenResponse = serde_json::from_str(&body)
            .map_err(|e| auth_error(format!("Malformed token response: {}", e)))?;
        let expires_on = match token.expires_in {
            Some(secs) => Some(
                ChronoDuration::try_seconds(secs)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        auth_error(format!("Token response has out-of-range expires_in: {}", secs))
                    })?,
            ),
            None => None,
        };
        Ok(AccessToken::new(token.access_token, expires_on))
    }
}

enum ManagedIdentityEndpoint {
    /// Azure VM / VMSS instance metadata service
    Imds { url: String },
    /// App Service and Functions: `IDENTITY_ENDPOINT` + `IDENTITY_HEADER`
    AppService { url: String, header: String },
}

/// System- or user-assigned managed identity
pub struct ManagedIdentityCredential {
    endpoint: ManagedIdentityEndpoint,
    client_id: Option<String>,
    timeout: Duration,
}

impl ManagedIdentityCredential {
    pub fn imds(url: impl Into<String>, client_id: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: ManagedIdentityEndpoint::Imds { url: url.into() },
            client_id,
            timeout,
        }
    }

    pub fn app_service(
        url: impl Into<String>,
        header: impl Into<String>,
        client_id: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: ManagedIdentityEndpoint::AppService {
                url: url.into(),
                header: header.into(),
            },
            client_id,
            timeout,
        }
    }

    /// App Service endpoint when its variables are set, IMDS otherwise
    pub fn from_env(timeout: Duration) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let client_id = var("AZURE_CLIENT_ID");
        match (var("IDENTITY_ENDPOINT"), var("IDENTITY_HEADER")) {
            (Some(url), Some(header)) => Self::app_service(url, header, client_id, timeout),
            _ => Self::imds(IMDS_ENDPOINT, client_id, timeout),
        }
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        "managed identity"
    }

    // IMDS is tried on the off chance we run on a VM; App Service sets its
    // endpoint explicitly
    fn is_configured(&self) -> bool {
        matches!(self.endpoint, ManagedIdentityEndpoint::AppService { .. })
    }

    async fn get_token(&self, http: &reqwest::Client, resource: &str) -> Result<AccessToken> {
        let resource = format!("{}/", resource.trim_end_matches('/'));
        let mut query: Vec<(&str, &str)> = vec![("resource", resource.as_str())];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.as_str()));
        }

        let (url, request) = match &self.endpoint {
            ManagedIdentityEndpoint::Imds { url } => {
                query.push(("api-version", IMDS_API_VERSION));
                (url, http.get(url).header("Metadata", "true"))
            }
            ManagedIdentityEndpoint::AppService { url, header } => {
                query.push(("api-version", APP_SERVICE_API_VERSION));
                (url, http.get(url).header("X-IDENTITY-HEADER", header.as_str()))
            }
        };

        let response = request
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| auth_error_from(format!("Managed identity endpoint {} unavailable", url), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| auth_error_from("Failed to read managed identity response", e))?;
        if !status.is_success() {
            return Err(auth_error(format!(
                "Managed identity token request failed (HTTP {}): {}",
                status.as_u16(),
                body
            )));
        }

        let token: ManagedIdentityTokenResponse = serde_json::from_str(&body)
            .map_err(|e| auth_error(format!("Malformed managed identity response: {}", e)))?;
        let expires_on = token.expires_on.as_ref().and_then(parse_unix_seconds);
        Ok(AccessToken::new(token.access_token, expires_on))
    }
}

/// Token from the signed-in Azure CLI (`az login`)
pub struct AzureCliCredential;

impl AzureCliCredential {
    pub fn parse_output(stdout: &str) -> Result<AccessToken> {
        let token: CliTokenResponse = serde_json::from_str(stdout)
            .map_err(|e| auth_error(format!("Unexpected output from az: {}", e)))?;
        let expires_on = token
            .expires_on
            .and_then(|secs| parse_unix_seconds(&serde_json::Value::from(secs)));
        Ok(AccessToken::new(token.access_token, expires_on))
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &'static str {
        "azure cli"
    }

    async fn get_token(&self, _http: &reqwest::Client, resource: &str) -> Result<AccessToken> {
        let az = which::which("az")
            .map_err(|_| auth_error("Azure CLI (az) not found on PATH"))?;
        let resource = format!("{}/", resource.trim_end_matches('/'));

        let mut cmd = tokio::process::Command::new(az);
        cmd.args(["account", "get-access-token", "--output", "json", "--resource"]);
        cmd.arg(&resource);
        debug!("Executing: {:?}", cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| auth_error(format!("Failed to execute az: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(auth_error(format!(
                "az account get-access-token failed: {}",
                stderr.trim()
            )));
        }

        Self::parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Ordered list of credentials; first success wins
pub struct DefaultCredentialChain {
    sources: Vec<Box<dyn TokenCredential>>,
    /// Index of the source that authenticated first
    selected: OnceLock<usize>,
}

impl DefaultCredentialChain {
    pub fn new(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self {
            sources,
            selected: OnceLock::new(),
        }
    }

    /// Build the standard chain, minus whatever the config excludes
    pub fn from_config(credential: &CredentialConfig, azure: &AzureConfig) -> Self {
        let mut sources: Vec<Box<dyn TokenCredential>> = Vec::new();
        if !credential.exclude_environment {
            sources.push(Box::new(EnvironmentCredential::from_env(&azure.authority_host)));
        }
        if !credential.exclude_managed_identity {
            sources.push(Box::new(ManagedIdentityCredential::from_env(
                Duration::from_secs(credential.imds_timeout_secs),
            )));
        }
        if !credential.exclude_azure_cli {
            sources.push(Box::new(AzureCliCredential));
        }
        Self::new(sources)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl TokenCredential for DefaultCredentialChain {
    fn name(&self) -> &'static str {
        "default chain"
    }

    async fn get_token(&self, http: &reqwest::Client, resource: &str) -> Result<AccessToken> {
        if self.sources.is_empty() {
            return Err(auth_error(
                "Every credential source is excluded in the configuration",
            ));
        }

        if let Some(source) = self.selected.get().and_then(|&i| self.sources.get(i)) {
            debug!("Refreshing token with {} credential", source.name());
            return source.get_token(http, resource).await;
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for (index, source) in self.sources.iter().enumerate() {
            match source.get_token(http, resource).await {
                Ok(token) => {
                    debug!("Authenticated with {} credential", source.name());
                    let _ = self.selected.set(index);
                    return Ok(token);
                }
                Err(e) if source.is_configured() => {
                    warn!("{} credential is configured but was rejected", source.name());
                    return Err(e);
                }
                Err(e) => {
                    warn!("{} credential unavailable: {}", source.name(), e);
                    failures.push(format!("  - {}: {}", source.name(), e));
                }
            }
        }

        Err(auth_error(format!(
            "No credential in the default chain could authenticate:\n{}",
            failures.join("\n")
        )))
    }
}
