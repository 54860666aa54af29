pub(crate) mod logging;
mod status;

use std::time::{SystemTime, UNIX_EPOCH};

pub use status::{Code, Result, Status};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Smallest key strictly greater than `key` in byte-lexicographic order.
#[inline]
pub fn key_successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0);
    next
}
