use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use crossbeam_skiplist::SkipMap;

use crate::memtable::{
    cell::{Cell, CellKey, Tombstone, TombstoneKey},
    visibility::ReadPoint,
};

/// A cell together with the sequence of the write that produced it
#[derive(Debug, Clone)]
pub(crate) struct VersionedCell {
    pub(crate) sequence: u64,
    pub(crate) cell: Cell,
}

/// In-memory, multi-version Cell Store of one table.
///
/// Cells and tombstones live in two lock-free skiplists. Entries are never
/// updated in place: every write adds new versions tagged with its sequence
/// number, and readers pick the versions visible at their snapshot sequence.
/// Old versions and tombstones are only removed by compaction, which builds
/// a fresh MemTable.
pub struct MemTable {
    cells: SkipMap<CellKey, Bytes>,
    tombstones: SkipMap<TombstoneKey, Tombstone>,
    approximate_memory: AtomicUsize,
}

impl MemTable {
    pub fn new() -> Self {
        MemTable {
            cells: SkipMap::new(),
            tombstones: SkipMap::new(),
            approximate_memory: AtomicUsize::new(0),
        }
    }

    pub(crate) fn add(&self, sequence: u64, cell: Cell) {
        let mem_usage =
            cell.row.len() + cell.family.len() + cell.qualifier.len() + cell.value.len() + 16;
        self.approximate_memory
            .fetch_add(mem_usage, Ordering::Relaxed);

        let key = CellKey::new(
            cell.row,
            cell.family,
            cell.qualifier,
            cell.timestamp,
            sequence,
        );
        self.cells.insert(key, cell.value);
    }

    pub(crate) fn add_tombstone(
        &self,
        sequence: u64,
        index: u32,
        row: Bytes,
        tombstone: Tombstone,
    ) {
        self.approximate_memory
            .fetch_add(row.len() + 24, Ordering::Relaxed);

        let key = TombstoneKey {
            row,
            sequence,
            index,
        };
        self.tombstones.insert(key, tombstone);
    }

    /// First row key >= `start` that has at least one stored cell version
    pub(crate) fn first_row_from(&self, start: &[u8]) -> Option<Bytes> {
        let start_key = CellKey::row_start(Bytes::copy_from_slice(start));
        self.cells
            .range(start_key..)
            .next()
            .map(|entry| entry.key().row.clone())
    }

    /// Tombstones of `row` written at or before `sequence`
    pub(crate) fn row_tombstones(&self, row: &Bytes, sequence: u64) -> Vec<(u64, Tombstone)> {
        let start = TombstoneKey {
            row: row.clone(),
            sequence: 0,
            index: 0,
        };
        let end = TombstoneKey {
            row: row.clone(),
            sequence,
            index: u32::MAX,
        };
        self.tombstones
            .range(start..=end)
            .map(|entry| (entry.key().sequence, entry.value().clone()))
            .collect()
    }

    /// Resolve the cells of `row` visible at `point`.
    ///
    /// Returned in family, qualifier, newest-timestamp-first order. A version
    /// is visible when its write is within the snapshot, it is the latest
    /// write at its timestamp, no tombstone covers it, its family's TTL has
    /// not expired it, and it is within the version limit.
    pub(crate) fn read_row(&self, row: &Bytes, point: &ReadPoint<'_>) -> Vec<VersionedCell> {
        let tombstones = self.row_tombstones(row, point.sequence);
        let mut result = Vec::new();

        // State of the column currently being walked
        let mut column: Option<(Bytes, Bytes)> = None;
        let mut deleted_up_to: Option<u64> = None;
        let mut last_timestamp: Option<u64> = None;
        let mut versions = 0u32;
        let mut version_limit = 0u32;
        let mut current_family = None;

        for entry in self.cells.range(CellKey::row_start(row.clone())..) {
            let key = entry.key();
            if key.row != *row {
                break;
            }
            if key.sequence() > point.sequence {
                continue;
            }

            let same_column = matches!(
                &column,
                Some((f, q)) if *f == key.family && *q == key.qualifier
            );
            if !same_column {
                column = Some((key.family.clone(), key.qualifier.clone()));
                deleted_up_to = tombstones
                    .iter()
                    .filter(|(_, t)| t.scope.covers(&key.family, &key.qualifier))
                    .map(|(_, t)| t.timestamp)
                    .max();
                last_timestamp = None;
                versions = 0;
                current_family = point.schema.family(&key.family);
                version_limit = current_family
                    .map(|cf| cf.max_versions.min(point.max_versions))
                    .unwrap_or(0);
            }

            // Unknown family or not projected
            let Some(family) = current_family else {
                continue;
            };
            if !point.columns.selects(&key.family, &key.qualifier) {
                continue;
            }

            let timestamp = key.timestamp();
            // Older write at the same timestamp was overwritten
            if last_timestamp == Some(timestamp) {
                continue;
            }
            last_timestamp = Some(timestamp);

            if deleted_up_to.is_some_and(|ts| timestamp <= ts) {
                continue;
            }
            if family.is_expired(timestamp, point.now) {
                continue;
            }
            if versions >= version_limit {
                continue;
            }
            versions += 1;

            result.push(VersionedCell {
                sequence: key.sequence(),
                cell: Cell {
                    row: key.row.clone(),
                    family: key.family.clone(),
                    qualifier: key.qualifier.clone(),
                    timestamp,
                    value: entry.value().clone(),
                },
            });
        }

        result
    }

    pub fn approximate_memory_usage(&self) -> usize {
        self.approximate_memory.load(Ordering::Relaxed)
    }

    /// Number of stored cell versions, visible or not
    pub fn num_entries(&self) -> usize {
        self.cells.len()
    }

    pub fn num_tombstones(&self) -> usize {
        self.tombstones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.tombstones.is_empty()
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
