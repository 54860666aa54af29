use std::{cmp::Reverse, fmt};

use bytes::Bytes;

/// The unit of storage: (row, family, qualifier, timestamp) -> value
#[derive(Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: Bytes,
    pub family: Bytes,
    pub qualifier: Bytes,
    pub timestamp: u64,
    pub value: Bytes,
}

impl Cell {
    pub fn new(
        row: impl Into<Bytes>,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
        value: impl Into<Bytes>,
    ) -> Self {
        Cell {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            value: value.into(),
        }
    }

    /// Whether this cell addresses `family:qualifier`
    #[inline]
    pub fn is_column(&self, family: &[u8], qualifier: &[u8]) -> bool {
        self.family.as_ref() == family && self.qualifier.as_ref() == qualifier
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}/{}={}",
            String::from_utf8_lossy(&self.row),
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier),
            self.timestamp,
            String::from_utf8_lossy(&self.value),
        )
    }
}

/// Key of a cell version inside the MemTable.
///
/// Field order gives the store's sort order: row, family, qualifier, then
/// newest timestamp first, then newest sequence first. Two writes to the same
/// (row, family, qualifier, timestamp) therefore sit side by side with the
/// later write in front.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CellKey {
    pub(crate) row: Bytes,
    pub(crate) family: Bytes,
    pub(crate) qualifier: Bytes,
    pub(crate) timestamp: Reverse<u64>,
    pub(crate) sequence: Reverse<u64>,
}

impl CellKey {
    pub(crate) fn new(
        row: Bytes,
        family: Bytes,
        qualifier: Bytes,
        timestamp: u64,
        sequence: u64,
    ) -> Self {
        CellKey {
            row,
            family,
            qualifier,
            timestamp: Reverse(timestamp),
            sequence: Reverse(sequence),
        }
    }

    /// Smallest possible key for `row`
    pub(crate) fn row_start(row: Bytes) -> Self {
        CellKey::new(row, Bytes::new(), Bytes::new(), u64::MAX, u64::MAX)
    }

    #[inline]
    pub(crate) fn timestamp(&self) -> u64 {
        self.timestamp.0
    }

    #[inline]
    pub(crate) fn sequence(&self) -> u64 {
        self.sequence.0
    }
}

/// What a delete marker covers within its row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    /// Every cell of the row
    Row,
    /// Every cell of one family
    Family(Bytes),
    /// Every version of one column
    Column(Bytes, Bytes),
}

impl DeleteScope {
    #[inline]
    pub fn covers(&self, family: &[u8], qualifier: &[u8]) -> bool {
        match self {
            DeleteScope::Row => true,
            DeleteScope::Family(f) => f.as_ref() == family,
            DeleteScope::Column(f, q) => f.as_ref() == family && q.as_ref() == qualifier,
        }
    }
}

/// Delete marker: hides every covered cell with timestamp <= `timestamp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tombstone {
    pub scope: DeleteScope,
    pub timestamp: u64,
}

/// Key of a tombstone: row, then the sequence of the Delete that wrote it,
/// then its position inside that Delete.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TombstoneKey {
    pub(crate) row: Bytes,
    pub(crate) sequence: u64,
    pub(crate) index: u32,
}
