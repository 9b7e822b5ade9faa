//! Rules for copying project state onto the owning client.

use crate::types::Timestamp;

/// Whether `candidate` should replace a client's stored `last_contacted`.
///
/// The merge is monotonic: an empty value is always filled, otherwise only a
/// strictly newer instant wins.
pub fn advances_last_contacted(current: Option<Timestamp>, candidate: Timestamp) -> bool {
    match current {
        None => true,
        Some(current) => candidate > current,
    }
}
