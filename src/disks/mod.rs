//! Disk classification and costing
//!
//! - [`record`] - normalizing provider descriptors, resource group extraction
//! - [`filter`] - deciding which disks are zombies
//! - [`cost`] - pricing a disk at a per-GB monthly rate

pub mod cost;
pub mod filter;
pub mod record;

pub use cost::{estimate_monthly_cost, CostedDisk};
pub use filter::{is_zombie, zombies};
pub use record::{extract_resource_group, normalize, AttachmentState, DiskRecord};
