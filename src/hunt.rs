//! The zombie hunt pipeline
//!
//! source → normalize → filter → cost → aggregate. Disks are pulled one at a
//! time and fully processed before the next is requested. The first error
//! from the source aborts the run; nothing collected so far is reported.

use crate::disks::{is_zombie, normalize, CostedDisk};
use crate::error::Result;
use crate::provider::DiskSource;
use crate::report::{aggregate, Outcome};
use tracing::{debug, info};

pub async fn hunt<S>(source: &mut S, rate_per_gb_month: f64) -> Result<Outcome>
where
    S: DiskSource + ?Sized,
{
    let mut seen = 0usize;
    let mut zombies = Vec::new();

    while let Some(raw) = source.next_disk().await? {
        seen += 1;
        let record = normalize(&raw);
        if !is_zombie(&record) {
            continue;
        }
        debug!(
            "Zombie: {} ({} GB) in {}",
            record.name(),
            record.size_gb(),
            record.resource_group()
        );
        zombies.push(CostedDisk::new(record, rate_per_gb_month));
    }

    info!(
        "Scanned {} disks from {}, {} unattached",
        seen,
        source.name(),
        zombies.len()
    );
    Ok(aggregate(zombies, rate_per_gb_month))
}
