//! Normalized disk records
//!
//! Converts a provider `RawDisk` into a `DiskRecord` with every field filled
//! in. Absent or nonsensical values degrade to safe defaults instead of
//! failing: name "Unnamed", size 0, resource group "Unknown".

use crate::provider::RawDisk;
use serde::Serialize;
use std::fmt;

pub const UNNAMED: &str = "Unnamed";
pub const UNKNOWN_RESOURCE_GROUP: &str = "Unknown";

/// Attachment state reported by the provider
///
/// Parsing is an exact, case-sensitive match on the provider literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttachmentState {
    Attached,
    Unattached,
    Reserved,
    ActiveSAS,
    /// Any other literal the provider sends (e.g. `ActiveUpload`, `unattached`)
    Other(String),
    /// The provider omitted the state
    Missing,
}

impl AttachmentState {
    pub fn parse(state: Option<&str>) -> Self {
        match state {
            None => AttachmentState::Missing,
            Some("Attached") => AttachmentState::Attached,
            Some("Unattached") => AttachmentState::Unattached,
            Some("Reserved") => AttachmentState::Reserved,
            Some("ActiveSAS") => AttachmentState::ActiveSAS,
            Some(other) => AttachmentState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AttachmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentState::Attached => f.write_str("Attached"),
            AttachmentState::Unattached => f.write_str("Unattached"),
            AttachmentState::Reserved => f.write_str("Reserved"),
            AttachmentState::ActiveSAS => f.write_str("ActiveSAS"),
            AttachmentState::Other(s) => f.write_str(s),
            AttachmentState::Missing => f.write_str("<none>"),
        }
    }
}

/// A disk with every field resolved; immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskRecord {
    name: String,
    size_gb: u64,
    resource_group: String,
    attachment_state: AttachmentState,
}

impl DiskRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_gb(&self) -> u64 {
        self.size_gb
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn attachment_state(&self) -> &AttachmentState {
        &self.attachment_state
    }
}

/// Build a `DiskRecord` from a provider descriptor
pub fn normalize(raw: &RawDisk) -> DiskRecord {
    let name = match raw.name.as_deref() {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNNAMED.to_string(),
    };
    // Negative sizes are provider garbage; treat them like an absent size
    let size_gb = raw
        .disk_size_gb
        .and_then(|s| u64::try_from(s).ok())
        .unwrap_or(0);

    DiskRecord {
        name,
        size_gb,
        resource_group: extract_resource_group(raw.id.as_deref().unwrap_or("")),
        attachment_state: AttachmentState::parse(raw.disk_state.as_deref()),
    }
}

/// Extract the resource group from an Azure resource ID
///
/// `/subscriptions/<sub>/resourceGroups/<rg>/providers/Microsoft.Compute/disks/<name>`
/// yields `<rg>`. The `resourceGroups` segment matches case-insensitively.
/// Empty IDs, IDs without that segment, or IDs where it is the last segment
/// yield "Unknown".
pub fn extract_resource_group(resource_id: &str) -> String {
    let trimmed = resource_id.trim_matches('/');
    if trimmed.is_empty() {
        return UNKNOWN_RESOURCE_GROUP.to_string();
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    parts
        .windows(2)
        .find(|pair| pair[0].eq_ignore_ascii_case("resourcegroups"))
        .map(|pair| pair[1].to_string())
        .unwrap_or_else(|| UNKNOWN_RESOURCE_GROUP.to_string())
}
