//! Zombie classification

use crate::disks::record::{AttachmentState, DiskRecord};

/// A disk is a zombie only when the provider says exactly `Unattached`
///
/// `Reserved`, `ActiveSAS`, unknown literals and a missing state all count
/// as in use.
pub fn is_zombie(record: &DiskRecord) -> bool {
    *record.attachment_state() == AttachmentState::Unattached
}

/// Keep the zombies, preserving input order
pub fn zombies<I>(records: I) -> impl Iterator<Item = DiskRecord>
where
    I: IntoIterator<Item = DiskRecord>,
{
    records.into_iter().filter(is_zombie)
}
