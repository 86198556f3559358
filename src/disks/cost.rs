//! Monthly cost estimation

use crate::disks::record::DiskRecord;

/// A zombie disk priced at the run's rate
///
/// Only the rate is stored; the monthly cost is derived on every call so it
/// can never drift from `size_gb`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostedDisk {
    disk: DiskRecord,
    rate_per_gb_month: f64,
}

impl CostedDisk {
    pub fn new(disk: DiskRecord, rate_per_gb_month: f64) -> Self {
        Self {
            disk,
            rate_per_gb_month,
        }
    }

    pub fn disk(&self) -> &DiskRecord {
        &self.disk
    }

    pub fn rate_per_gb_month(&self) -> f64 {
        self.rate_per_gb_month
    }

    /// Unrounded; round only when displaying
    pub fn monthly_cost(&self) -> f64 {
        estimate_monthly_cost(self.disk.size_gb(), self.rate_per_gb_month)
    }
}

pub fn estimate_monthly_cost(size_gb: u64, rate_per_gb_month: f64) -> f64 {
    size_gb as f64 * rate_per_gb_month
}
