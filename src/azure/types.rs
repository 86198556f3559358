//! Wire types for Azure Resource Manager and token endpoints

use crate::provider::RawDisk;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// One page of `Microsoft.Compute/disks` results
#[derive(Debug, Deserialize)]
pub struct DiskListPage {
    #[serde(default)]
    pub value: Vec<ArmDisk>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArmDisk {
    pub id: Option<String>,
    pub name: Option<String>,
    pub properties: Option<ArmDiskProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmDiskProperties {
    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: Option<i64>,
    pub disk_state: Option<String>,
}

impl From<ArmDisk> for RawDisk {
    fn from(disk: ArmDisk) -> Self {
        let (disk_size_gb, disk_state) = match disk.properties {
            Some(p) => (p.disk_size_gb, p.disk_state),
            None => (None, None),
        };
        RawDisk {
            id: disk.id,
            name: disk.name,
            disk_size_gb,
            disk_state,
        }
    }
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ArmErrorResponse {
    pub error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ArmErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Microsoft identity platform token response (client credentials grant)
#[derive(Debug, Deserialize)]
pub struct AadTokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// Entra ID error response, e.g. `{"error": "invalid_client", "error_description": "..."}`
#[derive(Debug, Deserialize)]
pub struct AadErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

/// Managed identity token response (IMDS and App Service)
///
/// `expires_on` is unix seconds, sent as a string by most endpoints.
#[derive(Debug, Deserialize)]
pub struct ManagedIdentityTokenResponse {
    pub access_token: String,
    pub expires_on: Option<serde_json::Value>,
}

/// `az account get-access-token --output json`
#[derive(Debug, Deserialize)]
pub struct CliTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Unix seconds; only emitted by Azure CLI 2.54 and later
    pub expires_on: Option<i64>,
}

/// Parse unix seconds sent either as a JSON number or a numeric string
pub fn parse_unix_seconds(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Utc.timestamp_opt(secs, 0).single()
}
