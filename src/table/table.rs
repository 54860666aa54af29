use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use bytes::Bytes;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::{
    column_family::TableDescriptor,
    filter::Filter,
    memtable::{Cell, ColumnSelection, DeleteScope, MemTable},
    mutation::{Delete, Put, RowLocks, SequenceTracker, TimestampOracle},
    scan::{Get, ReadSnapshot, RowResult, Scan, Scanner},
    statistics::Statistics,
    table::{
        CompactionSummary,
        log::{ReplaySummary, TableLog},
    },
    util::{Result, Status, now_millis},
    wal::LogRecord,
};

/// Runtime state of one table.
///
/// The current MemTable generation sits behind a RwLock: mutations hold the
/// read side for their whole duration, compaction takes the write side to
/// swap in a rebuilt generation. Readers only hold the lock long enough to
/// clone the generation and fix their snapshot sequence.
pub(crate) struct TableInner {
    descriptor: TableDescriptor,
    mem: RwLock<Arc<MemTable>>,
    sequences: SequenceTracker,
    clock: TimestampOracle,
    row_locks: RowLocks,
    log: Option<TableLog>,
    enabled: AtomicBool,
    dropped: AtomicBool,
    active_scanners: AtomicUsize,
    stats: Arc<Statistics>,
}

impl TableInner {
    /// Fresh in-memory table
    pub(crate) fn new(descriptor: TableDescriptor, stats: Arc<Statistics>) -> Self {
        Self::with_parts(descriptor, MemTable::new(), 0, None, true, stats)
    }

    /// Fresh table backed by an empty log in `dir`
    pub(crate) fn create_logged(
        descriptor: TableDescriptor,
        dir: &Path,
        sync_writes: bool,
        stats: Arc<Statistics>,
    ) -> Result<Self> {
        let log = TableLog::create(dir, &descriptor.name, sync_writes)?;
        Ok(Self::with_parts(
            descriptor,
            MemTable::new(),
            0,
            Some(log),
            true,
            stats,
        ))
    }

    /// Rebuild a table from its log in `dir`
    pub(crate) fn recover(
        descriptor: TableDescriptor,
        enabled: bool,
        dir: &Path,
        sync_writes: bool,
        stats: Arc<Statistics>,
    ) -> Result<(Self, ReplaySummary)> {
        let mem = MemTable::new();
        let (log, summary) = TableLog::recover(dir, &descriptor.name, sync_writes, &mem, &stats)?;
        let table = Self::with_parts(
            descriptor,
            mem,
            summary.max_sequence,
            Some(log),
            enabled,
            stats,
        );
        table.clock.observe(summary.max_timestamp);
        Ok((table, summary))
    }

    fn with_parts(
        descriptor: TableDescriptor,
        mem: MemTable,
        last_sequence: u64,
        log: Option<TableLog>,
        enabled: bool,
        stats: Arc<Statistics>,
    ) -> Self {
        TableInner {
            descriptor,
            mem: RwLock::new(Arc::new(mem)),
            sequences: SequenceTracker::new(last_sequence),
            clock: TimestampOracle::new(),
            row_locks: RowLocks::new(),
            log,
            enabled: AtomicBool::new(enabled),
            dropped: AtomicBool::new(false),
            active_scanners: AtomicUsize::new(0),
            stats,
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[inline]
    pub(crate) fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    #[inline]
    pub(crate) fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub(crate) fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::Acquire)
    }

    /// Mark the table dropped, wait for in-flight mutations and delete its
    /// log.
    pub(crate) fn mark_dropped(&self) -> Result<()> {
        self.dropped.store(true, Ordering::Release);
        let _quiesce = self.mem.write();
        match &self.log {
            Some(log) => log.remove(),
            None => Ok(()),
        }
    }

    pub(crate) fn active_scanners(&self) -> usize {
        self.active_scanners.load(Ordering::Acquire)
    }

    pub(crate) fn scanner_closed(&self) {
        self.active_scanners.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn last_sequence(&self) -> u64 {
        self.sequences.visible()
    }

    pub(crate) fn memtable(&self) -> Arc<MemTable> {
        self.mem.read().clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.is_dropped() {
            return Err(Status::table_not_found(self.name()));
        }
        if !self.is_enabled() {
            return Err(Status::table_disabled(self.name()));
        }
        Ok(())
    }

    /// Hold the current generation for one mutation. A drop that finished
    /// while this call waited for the lock is seen here.
    fn begin_mutation(&self) -> Result<RwLockReadGuard<'_, Arc<MemTable>>> {
        let mem = self.mem.read();
        if self.is_dropped() {
            return Err(Status::table_not_found(self.name()));
        }
        Ok(mem)
    }

    fn check_family(&self, family: &[u8]) -> Result<()> {
        if self.descriptor.family(family).is_none() {
            return Err(Status::invalid_argument(format!(
                "table '{}' has no column family '{}'",
                self.name(),
                String::from_utf8_lossy(family)
            )));
        }
        Ok(())
    }

    fn check_selection(&self, columns: &ColumnSelection) -> Result<()> {
        columns.families().try_for_each(|f| self.check_family(f))
    }

    fn snapshot(&self) -> ReadSnapshot {
        let mem = self.mem.read();
        ReadSnapshot {
            mem: mem.clone(),
            sequence: self.sequences.visible(),
            now: now_millis(),
        }
    }

    pub(crate) fn apply_put(&self, put: &Put) -> Result<()> {
        self.check_available()?;
        if put.is_empty() {
            return Err(Status::invalid_argument("put has no columns"));
        }
        for column in put.columns() {
            self.check_family(&column.family)?;
        }

        let mem = self.begin_mutation()?;
        let _row = self.row_locks.lock(put.row());
        let default_ts = if put.needs_timestamp() {
            self.clock.next()
        } else {
            0
        };
        let ticket = self.sequences.allocate();
        let cells = put.to_cells(default_ts);

        if let Some(log) = &self.log {
            let record = LogRecord::Put {
                sequence: ticket.sequence(),
                row: put.row().clone(),
                cells: cells.clone(),
            };
            if let Err(e) = log.append(&record, &self.stats) {
                self.stats.record_error();
                return Err(e);
            }
        }

        let n = cells.len() as u64;
        for cell in cells {
            mem.add(ticket.sequence(), cell);
        }
        drop(ticket);

        self.stats.record_put(n, put.approximate_size() as u64);
        Ok(())
    }

    pub(crate) fn apply_delete(&self, delete: &Delete) -> Result<()> {
        self.check_available()?;
        for scope in delete.scopes() {
            match &scope {
                DeleteScope::Row => {},
                DeleteScope::Family(f) | DeleteScope::Column(f, _) => self.check_family(f)?,
            }
        }

        let mem = self.begin_mutation()?;
        let _row = self.row_locks.lock(delete.row());
        let default_ts = match delete.timestamp() {
            Some(ts) => ts,
            None => self.clock.next(),
        };
        let ticket = self.sequences.allocate();
        let tombstones = delete.to_tombstones(default_ts);

        if let Some(log) = &self.log {
            let record = LogRecord::Delete {
                sequence: ticket.sequence(),
                row: delete.row().clone(),
                tombstones: tombstones.clone(),
            };
            if let Err(e) = log.append(&record, &self.stats) {
                self.stats.record_error();
                return Err(e);
            }
        }

        for (index, tombstone) in tombstones.into_iter().enumerate() {
            mem.add_tombstone(ticket.sequence(), index as u32, delete.row().clone(), tombstone);
        }
        drop(ticket);

        self.stats.record_delete();
        Ok(())
    }

    pub(crate) fn get(&self, get: &Get) -> Result<RowResult> {
        self.check_available()?;
        self.check_selection(get.columns())?;
        self.stats.record_get();

        if get.filter().is_some_and(|f| f.rejects_row_key(get.row())) {
            return Ok(RowResult::empty(get.row().clone()));
        }

        let snapshot = self.snapshot();
        let result = snapshot.read_row(
            &self.descriptor,
            get.row(),
            get.columns(),
            get.max_versions(),
            get.filter(),
            &self.stats,
        );
        Ok(result.unwrap_or_else(|| RowResult::empty(get.row().clone())))
    }

    pub(crate) fn scan(self: &Arc<Self>, scan: Scan) -> Result<Scanner> {
        self.check_available()?;
        scan.validate()?;
        self.check_selection(scan.columns())?;
        self.stats.record_scan();

        let snapshot = self.snapshot();
        self.active_scanners.fetch_add(1, Ordering::AcqRel);
        Ok(Scanner::new(Arc::clone(self), snapshot, scan))
    }

    pub(crate) fn mem_lock(&self) -> &RwLock<Arc<MemTable>> {
        &self.mem
    }

    pub(crate) fn log(&self) -> Option<&TableLog> {
        self.log.as_ref()
    }
}

/// Handle to one table of a store.
///
/// Cheap to clone; every clone talks to the same table. A handle outlives
/// a drop of its table, after which every operation fails with
/// `TableNotFound`.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    pub(crate) fn from_inner(inner: Arc<TableInner>) -> Self {
        Table { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        self.inner.descriptor()
    }

    pub fn put(&self, put: &Put) -> Result<()> {
        self.inner.apply_put(put)
    }

    /// Apply Puts in order, stopping at the first failure. Puts applied
    /// before the failure stay applied.
    pub fn put_all(&self, puts: &[Put]) -> Result<()> {
        puts.iter().try_for_each(|put| self.inner.apply_put(put))
    }

    pub fn delete(&self, delete: &Delete) -> Result<()> {
        self.inner.apply_delete(delete)
    }

    pub fn get(&self, get: &Get) -> Result<RowResult> {
        self.inner.get(get)
    }

    /// Visible cells of `row`, optionally filtered
    pub fn get_row(&self, row: &[u8], filter: Option<Filter>) -> Result<Vec<Cell>> {
        let mut get = Get::new(Bytes::copy_from_slice(row));
        if let Some(filter) = filter {
            get = get.with_filter(filter);
        }
        Ok(self.inner.get(&get)?.into_cells())
    }

    pub fn scan(&self, scan: Scan) -> Result<Scanner> {
        self.inner.scan(scan)
    }

    /// Rebuild the table keeping only what reads can still see
    pub fn compact(&self) -> Result<CompactionSummary> {
        self.inner.compact()
    }

    /// Scanners currently open on the table
    pub fn active_scanners(&self) -> usize {
        self.inner.active_scanners()
    }

    /// Cell versions and tombstones currently stored, including ones only
    /// compaction will remove
    pub fn num_entries(&self) -> usize {
        let mem = self.inner.memtable();
        mem.num_entries() + mem.num_tombstones()
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name())
            .field("sequence", &self.inner.last_sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{column_family::ColumnFamilyDescriptor, util::Code};

    fn table() -> Arc<TableInner> {
        let descriptor = TableDescriptor::new("people")
            .with_family(ColumnFamilyDescriptor::new("info"))
            .with_family(ColumnFamilyDescriptor::new("data").with_max_versions(3));
        Arc::new(TableInner::new(descriptor, Arc::new(Statistics::new())))
    }

    #[test]
    fn test_put_get_round_trip() {
        let t = table();
        t.apply_put(&Put::new("row1").add_column("info", "name", "Sara"))
            .unwrap();

        let row = t.get(&Get::new("row1")).unwrap();
        assert_eq!(row.value(b"info", b"name"), Some(&Bytes::from("Sara")));
        assert!(t.get(&Get::new("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_same_timestamp_last_writer_wins() {
        let t = table();
        for value in ["first", "second"] {
            t.apply_put(&Put::new("row1").add_column_at("info", "name", 5, value))
                .unwrap();
        }
        let row = t.get(&Get::new("row1").with_max_versions(5)).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row.value(b"info", b"name"), Some(&Bytes::from("second")));
    }

    #[test]
    fn test_implicit_timestamps_keep_versions_apart() {
        let t = table();
        for i in 0..3 {
            t.apply_put(&Put::new("row1").add_column("data", "v", format!("{i}")))
                .unwrap();
        }
        let row = t.get(&Get::new("row1").with_max_versions(3)).unwrap();
        let values: Vec<_> = row.cells().iter().map(|c| c.value.clone()).collect();
        assert_eq!(values, vec![
            Bytes::from("2"),
            Bytes::from("1"),
            Bytes::from("0")
        ]);
    }

    #[test]
    fn test_unknown_family_rejected() {
        let t = table();
        let err = t
            .apply_put(&Put::new("row1").add_column("nope", "q", "v"))
            .unwrap_err();
        assert_eq!(err.code(), &Code::InvalidArgument);

        let err = t.apply_delete(&Delete::new("row1").add_family("nope")).unwrap_err();
        assert_eq!(err.code(), &Code::InvalidArgument);

        let err = t.get(&Get::new("row1").add_family("nope")).unwrap_err();
        assert_eq!(err.code(), &Code::InvalidArgument);

        let err = t.apply_put(&Put::new("row1")).unwrap_err();
        assert_eq!(err.code(), &Code::InvalidArgument);
    }

    #[test]
    fn test_family_delete_keeps_other_families() {
        let t = table();
        t.apply_put(
            &Put::new("row1")
                .add_column("info", "name", "Sara")
                .add_column("data", "zip", "10001"),
        )
        .unwrap();
        t.apply_delete(&Delete::new("row1").add_family("info"))
            .unwrap();

        let row = t.get(&Get::new("row1")).unwrap();
        assert_eq!(row.value(b"info", b"name"), None);
        assert_eq!(row.value(b"data", b"zip"), Some(&Bytes::from("10001")));
    }

    #[test]
    fn test_disabled_and_dropped() {
        let t = table();
        t.set_enabled(false);
        let err = t.get(&Get::new("row1")).unwrap_err();
        assert_eq!(err.code(), &Code::TableDisabled);

        t.set_enabled(true);
        t.mark_dropped().unwrap();
        let err = t
            .apply_put(&Put::new("row1").add_column("info", "name", "x"))
            .unwrap_err();
        assert!(err.is_table_not_found());
    }

    #[test]
    fn test_mutation_waiting_on_drop_fails() {
        let t = table();

        // Hold the generation the way a drop does while it quiesces
        let quiesce = t.mem.write();
        let writer = {
            let t = t.clone();
            std::thread::spawn(move || {
                let put = t.apply_put(&Put::new("row1").add_column("info", "name", "x"));
                let delete = t.apply_delete(&Delete::new("row1"));
                (put, delete)
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        t.dropped.store(true, Ordering::Release);
        drop(quiesce);

        let (put, delete) = writer.join().unwrap();
        assert!(put.unwrap_err().is_table_not_found());
        assert!(delete.unwrap_err().is_table_not_found());
        assert_eq!(t.memtable().num_entries(), 0);
    }

    #[test]
    fn test_get_with_row_filter() {
        let t = table();
        t.apply_put(&Put::new("row1").add_column("info", "name", "Sara"))
            .unwrap();

        let get = Get::new("row1").with_filter(Filter::prefix("other"));
        assert!(t.get(&get).unwrap().is_empty());

        let get = Get::new("row1").with_filter(Filter::key_only());
        let row = t.get(&get).unwrap();
        assert_eq!(row.len(), 1);
        assert!(row.cells()[0].value.is_empty());
    }

    #[test]
    fn test_scanner_counts() {
        let t = table();
        let handle = Table::from_inner(t.clone());
        let scanner = handle.scan(Scan::new()).unwrap();
        assert_eq!(handle.active_scanners(), 1);
        drop(scanner);
        assert_eq!(handle.active_scanners(), 0);
    }
}
