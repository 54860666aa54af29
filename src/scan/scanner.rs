use std::sync::Arc;

use bytes::Bytes;

use crate::{
    column_family::TableDescriptor,
    filter::Filter,
    memtable::{ColumnSelection, MemTable, ReadPoint},
    scan::{RowResult, Scan},
    statistics::Statistics,
    table::TableInner,
    util::{Result, Status, key_successor, logging::log_debug},
};

/// A consistent view of one table: a MemTable generation plus the sequence
/// and wall clock the read started at.
pub(crate) struct ReadSnapshot {
    pub(crate) mem: Arc<MemTable>,
    pub(crate) sequence: u64,
    pub(crate) now: u64,
}

impl ReadSnapshot {
    /// Visible cells of `row` after projection and filtering. None when the
    /// filter drops the row or nothing is left of it.
    pub(crate) fn read_row(
        &self,
        schema: &TableDescriptor,
        row: &Bytes,
        columns: &ColumnSelection,
        max_versions: u32,
        filter: Option<&Filter>,
        stats: &Statistics,
    ) -> Option<RowResult> {
        let point = ReadPoint {
            sequence: self.sequence,
            now: self.now,
            max_versions,
            columns,
            schema,
        };
        let cells: Vec<_> = self
            .mem
            .read_row(row, &point)
            .into_iter()
            .map(|v| v.cell)
            .collect();
        if cells.is_empty() {
            return None;
        }

        let read = cells.len() as u64;
        let cells = match filter {
            None => cells,
            Some(filter) => match filter.apply(row, cells) {
                Some(kept) => kept,
                None => {
                    stats.record_row_filtered(read);
                    return None;
                },
            },
        };

        stats.record_row(cells.len() as u64, read - cells.len() as u64);
        Some(RowResult::new(row.clone(), cells))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    NotStarted,
    /// Last row visited; the next one is strictly after it
    Positioned(Bytes),
    /// A filter hint: the next candidate row is at or after this key
    SeekTo(Bytes),
    Exhausted,
}

/// Forward-only cursor over the rows of a scan.
///
/// The scanner reads from the table generation and sequence it was opened
/// at; writes and compactions after that are invisible to it. Dropping the
/// scanner releases the snapshot. If the table is dropped while the scan is
/// open, the next call yields `StorageUnavailable` and the scan ends.
pub struct Scanner {
    table: Arc<TableInner>,
    snapshot: ReadSnapshot,
    scan: Scan,
    state: ScanState,
    rows_returned: usize,
}

impl Scanner {
    pub(crate) fn new(table: Arc<TableInner>, snapshot: ReadSnapshot, scan: Scan) -> Self {
        log_debug!(
            component = "scan",
            event = "scan_opened",
            table = %table.name(),
            sequence = snapshot.sequence,
        );
        Scanner {
            table,
            snapshot,
            scan,
            state: ScanState::NotStarted,
            rows_returned: 0,
        }
    }

    /// Rows handed out so far
    pub fn rows_returned(&self) -> usize {
        self.rows_returned
    }

    /// Snapshot sequence the scan reads at
    pub fn sequence(&self) -> u64 {
        self.snapshot.sequence
    }

    fn limit_reached(&self) -> bool {
        self.scan
            .limit()
            .is_some_and(|limit| self.rows_returned >= limit)
    }

    /// Next stored row at or after the cursor
    fn next_candidate(&self) -> Option<Bytes> {
        let mem = &self.snapshot.mem;
        match &self.state {
            ScanState::NotStarted => {
                let start = self.scan.start_row().map(|s| &s[..]).unwrap_or_default();
                mem.first_row_from(start)
            },
            ScanState::Positioned(row) => mem.first_row_from(&key_successor(row)),
            ScanState::SeekTo(key) => mem.first_row_from(key),
            ScanState::Exhausted => None,
        }
    }

    fn advance(&mut self) -> Option<Result<RowResult>> {
        loop {
            if self.state == ScanState::Exhausted || self.limit_reached() {
                self.state = ScanState::Exhausted;
                return None;
            }

            if self.table.is_dropped() {
                self.state = ScanState::Exhausted;
                return Some(Err(Status::storage_unavailable(format!(
                    "table '{}' was dropped during the scan",
                    self.table.name()
                ))));
            }

            let Some(row) = self.next_candidate() else {
                self.state = ScanState::Exhausted;
                return None;
            };
            if self.scan.is_past_stop(&row) {
                self.state = ScanState::Exhausted;
                return None;
            }

            if let Some(filter) = self.scan.filter() {
                if filter.rejects_row_key(&row) {
                    self.table.stats().record_row_filtered(0);
                    if filter.filter_all_remaining(&row) {
                        self.state = ScanState::Exhausted;
                        return None;
                    }
                    self.state = match filter.next_row_hint(&row) {
                        Some(hint) => {
                            self.table.stats().record_seek_hint();
                            log_debug!(
                                component = "scan",
                                event = "seek_hint",
                                table = %self.table.name(),
                                row = ?row,
                                hint = ?hint,
                            );
                            ScanState::SeekTo(hint)
                        },
                        None => ScanState::Positioned(row),
                    };
                    continue;
                }
            }

            let result = self.snapshot.read_row(
                self.table.descriptor(),
                &row,
                self.scan.columns(),
                self.scan.max_versions(),
                self.scan.filter(),
                self.table.stats(),
            );
            self.state = ScanState::Positioned(row);

            if let Some(result) = result {
                self.rows_returned += 1;
                return Some(Ok(result));
            }
        }
    }
}

impl Iterator for Scanner {
    type Item = Result<RowResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.table.scanner_closed();
        log_debug!(
            component = "scan",
            event = "scan_closed",
            table = %self.table.name(),
            rows_returned = self.rows_returned,
        );
    }
}
