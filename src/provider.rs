//! Provider-agnostic view of a disk inventory
//!
//! The pipeline never talks to Azure directly. It pulls `RawDisk` records one
//! at a time from a `DiskSource`, which lets the core run against the ARM
//! pager in production and an in-memory list in tests.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Disk descriptor as reported by the provider; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDisk {
    /// Hierarchical resource identifier, e.g. `/subscriptions/.../resourceGroups/rg/...`
    pub id: Option<String>,
    pub name: Option<String>,
    pub disk_size_gb: Option<i64>,
    /// Provider literal such as `Attached` or `Unattached`
    pub disk_state: Option<String>,
}

impl RawDisk {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        disk_size_gb: i64,
        disk_state: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            disk_size_gb: Some(disk_size_gb),
            disk_state: Some(disk_state.into()),
        }
    }
}

/// A finite, non-restartable sequence of disks
///
/// `next_disk` returns `Ok(None)` once the listing is exhausted. Any error is
/// final: callers abort the run instead of asking again.
#[async_trait]
pub trait DiskSource: Send {
    /// Provider name used in log lines (e.g. "azure")
    fn name(&self) -> &'static str;

    async fn next_disk(&mut self) -> Result<Option<RawDisk>>;
}

/// In-memory source over already-fetched results
///
/// Each item is handed out once, errors included, in order.
pub struct StaticDiskSource {
    items: std::vec::IntoIter<Result<RawDisk>>,
}

impl StaticDiskSource {
    pub fn new(disks: Vec<RawDisk>) -> Self {
        Self::from_results(disks.into_iter().map(Ok).collect())
    }

    pub fn from_results(items: Vec<Result<RawDisk>>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

#[async_trait]
impl DiskSource for StaticDiskSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn next_disk(&mut self) -> Result<Option<RawDisk>> {
        self.items.next().transpose()
    }
}
