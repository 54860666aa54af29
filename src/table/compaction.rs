use std::{collections::BTreeMap, sync::Arc, time::Instant};

use crate::{
    memtable::{Cell, ColumnSelection, MemTable, ReadPoint},
    table::TableInner,
    util::{Result, key_successor, logging::log_info, now_millis},
    wal::LogRecord,
};

/// Outcome of compacting one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionSummary {
    /// Cell versions and tombstones before compaction
    pub entries_before: usize,
    /// Cell versions after compaction; no tombstone survives
    pub entries_after: usize,
    pub rows: usize,
}

impl TableInner {
    /// Rebuild the MemTable from what a read at the latest sequence sees.
    ///
    /// Dropped along the way: cells hidden by tombstones, the tombstones
    /// themselves, expired cells, versions beyond each family's limit and
    /// values overwritten at the same timestamp. Surviving cells keep their
    /// original sequence so that snapshots taken before the compaction read
    /// the same data from the new generation.
    ///
    /// Open scanners keep the previous generation alive until they close.
    pub(crate) fn compact(&self) -> Result<CompactionSummary> {
        let start = Instant::now();
        let mut current = self.mem_lock().write();

        // No mutation is in flight while the write lock is held
        let sequence = self.last_sequence();
        let columns = ColumnSelection::all();
        let point = ReadPoint {
            sequence,
            now: now_millis(),
            max_versions: u32::MAX,
            columns: &columns,
            schema: self.descriptor(),
        };

        let fresh = MemTable::new();
        let mut records = Vec::new();
        let mut rows = 0usize;

        let mut next = current.first_row_from(b"");
        while let Some(row) = next {
            let visible = current.read_row(&row, &point);
            if !visible.is_empty() {
                rows += 1;
            }

            // Group by the write that produced the cells, oldest first
            let mut by_sequence: BTreeMap<u64, Vec<Cell>> = BTreeMap::new();
            for versioned in visible {
                fresh.add(versioned.sequence, versioned.cell.clone());
                by_sequence
                    .entry(versioned.sequence)
                    .or_default()
                    .push(versioned.cell);
            }
            if self.log().is_some() {
                records.extend(by_sequence.into_iter().map(|(sequence, cells)| {
                    LogRecord::Put {
                        sequence,
                        row: row.clone(),
                        cells,
                    }
                }));
            }

            next = current.first_row_from(&key_successor(&row));
        }

        if let Some(log) = self.log() {
            log.rewrite(&records)?;
        }

        let summary = CompactionSummary {
            entries_before: current.num_entries() + current.num_tombstones(),
            entries_after: fresh.num_entries(),
            rows,
        };
        *current = Arc::new(fresh);
        drop(current);

        let elapsed = start.elapsed().as_micros() as u64;
        self.stats().record_compaction(
            summary.entries_before as u64,
            summary.entries_after as u64,
            elapsed,
        );
        log_info!(
            component = "compaction",
            event = "table_compacted",
            table = %self.name(),
            entries_before = summary.entries_before,
            entries_after = summary.entries_after,
            rows = summary.rows,
            elapsed_micros = elapsed,
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use bytes::Bytes;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        column_family::{ColumnFamilyDescriptor, TableDescriptor},
        mutation::{Delete, Put},
        scan::{Get, Scan},
        statistics::Statistics,
    };

    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("t")
            .with_family(ColumnFamilyDescriptor::new("info").with_max_versions(2))
            .with_family(
                ColumnFamilyDescriptor::new("tmp").with_ttl(Duration::from_secs(60)),
            )
    }

    #[test]
    fn test_compaction_drops_invisible_entries() {
        let table = Arc::new(TableInner::new(descriptor(), Arc::new(Statistics::new())));
        for ts in 1..=4 {
            table
                .apply_put(&Put::new("row1").add_column_at("info", "name", ts, format!("v{ts}")))
                .unwrap();
        }
        table
            .apply_put(&Put::new("row2").add_column_at("info", "name", 1, "gone"))
            .unwrap();
        table.apply_delete(&Delete::new("row2")).unwrap();
        // expired long ago
        table
            .apply_put(&Put::new("row3").add_column_at("tmp", "x", 1, "old"))
            .unwrap();

        let summary = table.compact().unwrap();
        assert_eq!(summary.entries_before, 7);
        assert_eq!(summary.entries_after, 2);
        assert_eq!(summary.rows, 1);

        let row = table
            .get(&Get::new("row1").with_max_versions(10))
            .unwrap();
        let values: Vec<_> = row.cells().iter().map(|c| c.value.clone()).collect();
        assert_eq!(values, vec![Bytes::from("v4"), Bytes::from("v3")]);
    }

    #[test]
    fn test_open_scanner_keeps_old_generation() {
        let table = Arc::new(TableInner::new(descriptor(), Arc::new(Statistics::new())));
        table
            .apply_put(&Put::new("row1").add_column("info", "name", "Sara"))
            .unwrap();
        table.apply_delete(&Delete::new("row1")).unwrap();
        table
            .apply_put(&Put::new("row2").add_column("info", "name", "Bob"))
            .unwrap();

        let scanner = table.scan(Scan::new()).unwrap();
        table.compact().unwrap();
        table
            .apply_put(&Put::new("row3").add_column("info", "name", "Eve"))
            .unwrap();

        let rows: Vec<_> = scanner.map(|r| r.unwrap().row().clone()).collect();
        assert_eq!(rows, vec![Bytes::from("row2")]);
        assert_eq!(table.active_scanners(), 0);
    }

    #[test]
    fn test_compaction_rewrites_log() {
        let dir = TempDir::new().unwrap();
        let stats = Arc::new(Statistics::new());
        {
            let table =
                TableInner::create_logged(descriptor(), dir.path(), false, stats.clone()).unwrap();
            for i in 0..10 {
                table
                    .apply_put(&Put::new("row1").add_column("info", "name", format!("v{i}")))
                    .unwrap();
            }
            table.compact().unwrap();
            table
                .apply_put(&Put::new("row2").add_column("info", "name", "after"))
                .unwrap();
        }

        let (table, summary) =
            TableInner::recover(descriptor(), true, dir.path(), false, stats).unwrap();
        // two surviving versions of row1 plus the later put
        assert_eq!(summary.records, 3);
        assert_eq!(summary.max_sequence, 11);

        let row = table.get(&Get::new("row1")).unwrap();
        assert_eq!(row.value(b"info", b"name"), Some(&Bytes::from("v9")));
        let row = table.get(&Get::new("row2")).unwrap();
        assert_eq!(row.value(b"info", b"name"), Some(&Bytes::from("after")));
    }
}
