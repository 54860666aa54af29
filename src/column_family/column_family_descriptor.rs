use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Descriptor of a Column Family
///
/// Column families are declared when a table is created and stay fixed for
/// the table's lifetime. Each family is configured independently:
/// - `ttl`: cells older than this are invisible to reads and dropped by
///   compaction (None = never expire)
/// - `max_versions`: number of timestamped versions kept per column
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use cellbase::ColumnFamilyDescriptor;
///
/// let cf1 = ColumnFamilyDescriptor::new("cf1").with_ttl(Duration::from_secs(10));
/// let cf2 = ColumnFamilyDescriptor::new("cf2").with_max_versions(3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyDescriptor {
    /// Name of the column family
    pub name: String,

    /// Time-to-live of cells in this family
    /// Default: None
    pub ttl: Option<Duration>,

    /// Versions retained per column
    /// Default: 1
    pub max_versions: u32,
}

impl ColumnFamilyDescriptor {
    /// Create a descriptor with default options
    pub fn new<S: Into<String>>(name: S) -> Self {
        ColumnFamilyDescriptor {
            name: name.into(),
            ttl: None,
            max_versions: 1,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions.max(1);
        self
    }

    /// Whether a cell written at `timestamp` has expired as of `now` (both
    /// in milliseconds).
    #[inline]
    pub fn is_expired(&self, timestamp: u64, now: u64) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_sub(timestamp) > ttl.as_millis() as u64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cf = ColumnFamilyDescriptor::new("cf1");
        assert_eq!(cf.ttl, None);
        assert_eq!(cf.max_versions, 1);
        assert!(!cf.is_expired(0, u64::MAX));
    }

    #[test]
    fn test_ttl_expiry() {
        let cf = ColumnFamilyDescriptor::new("cf1").with_ttl(Duration::from_secs(10));
        let now = 100_000;
        assert!(!cf.is_expired(now - 10_000, now));
        assert!(cf.is_expired(now - 10_001, now));
        // Cells from the future are never expired
        assert!(!cf.is_expired(now + 5, now));
    }

    #[test]
    fn test_max_versions_at_least_one() {
        let cf = ColumnFamilyDescriptor::new("cf1").with_max_versions(0);
        assert_eq!(cf.max_versions, 1);
    }
}
