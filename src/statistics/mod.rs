use std::sync::atomic::{AtomicU64, Ordering};

/// Store-wide statistics
///
/// Thread-safe counters for every store operation, shared by all tables.
/// Uses atomic counters for lock-free updates.
#[derive(Debug, Default)]
pub struct Statistics {
    // Mutations
    pub num_puts: AtomicU64,
    pub num_cells_written: AtomicU64,
    pub num_deletes: AtomicU64,
    pub bytes_written: AtomicU64,

    // Reads
    pub num_gets: AtomicU64,
    pub num_scans: AtomicU64,
    pub rows_returned: AtomicU64,
    pub cells_returned: AtomicU64,
    pub cells_filtered: AtomicU64,
    pub rows_filtered: AtomicU64,
    pub rows_skipped_by_hint: AtomicU64,

    // Log operations
    pub log_writes: AtomicU64,
    pub log_syncs: AtomicU64,
    pub log_bytes_written: AtomicU64,
    pub log_records_replayed: AtomicU64,

    // Compaction statistics
    pub num_compactions: AtomicU64,
    pub compaction_cells_read: AtomicU64,
    pub compaction_cells_written: AtomicU64,
    pub compaction_time_micros: AtomicU64,

    // Error counts
    pub num_errors: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    #[inline]
    pub fn record_put(&self, cells: u64, bytes: u64) {
        self.num_puts.fetch_add(1, Ordering::Relaxed);
        self.num_cells_written.fetch_add(cells, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delete(&self) {
        self.num_deletes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_get(&self) {
        self.num_gets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_scan(&self) {
        self.num_scans.fetch_add(1, Ordering::Relaxed);
    }

    /// A row handed to the caller, and how many of its cells the filter
    /// removed
    #[inline]
    pub fn record_row(&self, cells_returned: u64, cells_filtered: u64) {
        self.rows_returned.fetch_add(1, Ordering::Relaxed);
        self.cells_returned
            .fetch_add(cells_returned, Ordering::Relaxed);
        self.cells_filtered
            .fetch_add(cells_filtered, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_row_filtered(&self, cells_filtered: u64) {
        self.rows_filtered.fetch_add(1, Ordering::Relaxed);
        self.cells_filtered
            .fetch_add(cells_filtered, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_seek_hint(&self) {
        self.rows_skipped_by_hint.fetch_add(1, Ordering::Relaxed);
    }

    // Log tracking
    #[inline]
    pub fn record_log_write(&self, bytes: u64) {
        self.log_writes.fetch_add(1, Ordering::Relaxed);
        self.log_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_log_sync(&self) {
        self.log_syncs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_replayed(&self, records: u64) {
        self.log_records_replayed
            .fetch_add(records, Ordering::Relaxed);
    }

    // Compaction tracking
    #[inline]
    pub fn record_compaction(&self, cells_read: u64, cells_written: u64, time_micros: u64) {
        self.num_compactions.fetch_add(1, Ordering::Relaxed);
        self.compaction_cells_read
            .fetch_add(cells_read, Ordering::Relaxed);
        self.compaction_cells_written
            .fetch_add(cells_written, Ordering::Relaxed);
        self.compaction_time_micros
            .fetch_add(time_micros, Ordering::Relaxed);
    }

    // Error tracking
    #[inline]
    pub fn record_error(&self) {
        self.num_errors.fetch_add(1, Ordering::Relaxed);
    }

    // Getters (snapshot values)
    pub fn num_puts(&self) -> u64 {
        self.num_puts.load(Ordering::Relaxed)
    }

    pub fn num_deletes(&self) -> u64 {
        self.num_deletes.load(Ordering::Relaxed)
    }

    pub fn num_gets(&self) -> u64 {
        self.num_gets.load(Ordering::Relaxed)
    }

    pub fn num_scans(&self) -> u64 {
        self.num_scans.load(Ordering::Relaxed)
    }

    pub fn rows_returned(&self) -> u64 {
        self.rows_returned.load(Ordering::Relaxed)
    }

    pub fn cells_returned(&self) -> u64 {
        self.cells_returned.load(Ordering::Relaxed)
    }

    pub fn num_compactions(&self) -> u64 {
        self.num_compactions.load(Ordering::Relaxed)
    }

    /// Share of read cells the filters removed
    pub fn filter_selectivity(&self) -> f64 {
        let filtered = self.cells_filtered.load(Ordering::Relaxed) as f64;
        let total = filtered + self.cells_returned.load(Ordering::Relaxed) as f64;
        if total > 0.0 { filtered / total } else { 0.0 }
    }

    pub fn avg_compaction_time_ms(&self) -> f64 {
        let total_time = self.compaction_time_micros.load(Ordering::Relaxed) as f64;
        let num_compactions = self.num_compactions.load(Ordering::Relaxed) as f64;
        if num_compactions > 0.0 {
            total_time / num_compactions / 1000.0
        } else {
            0.0
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&self) {
        for counter in [
            &self.num_puts,
            &self.num_cells_written,
            &self.num_deletes,
            &self.bytes_written,
            &self.num_gets,
            &self.num_scans,
            &self.rows_returned,
            &self.cells_returned,
            &self.cells_filtered,
            &self.rows_filtered,
            &self.rows_skipped_by_hint,
            &self.log_writes,
            &self.log_syncs,
            &self.log_bytes_written,
            &self.log_records_replayed,
            &self.num_compactions,
            &self.compaction_cells_read,
            &self.compaction_cells_written,
            &self.compaction_time_micros,
            &self.num_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get a formatted statistics report
    pub fn report(&self) -> String {
        format!(
            "Store Statistics:\n\
            \n\
            Mutations:\n\
            - Puts:          {}\n\
            - Cells written: {}\n\
            - Deletes:       {}\n\
            - Bytes written: {} ({:.2} MB)\n\
            \n\
            Reads:\n\
            - Gets:          {}\n\
            - Scans:         {}\n\
            - Rows returned: {}\n\
            - Cells returned: {}\n\
            - Cells filtered: {} ({:.1}%)\n\
            - Rows filtered: {}\n\
            - Seek hints:    {}\n\
            \n\
            Log:\n\
            - Writes:        {}\n\
            - Syncs:         {}\n\
            - Bytes written: {} ({:.2} MB)\n\
            - Replayed:      {}\n\
            \n\
            Compaction:\n\
            - Runs:          {}\n\
            - Avg time:      {:.2} ms\n\
            - Cells read:    {}\n\
            - Cells written: {}\n\
            \n\
            Errors:          {}",
            self.num_puts(),
            self.num_cells_written.load(Ordering::Relaxed),
            self.num_deletes(),
            self.bytes_written.load(Ordering::Relaxed),
            self.bytes_written.load(Ordering::Relaxed) as f64 / 1024.0 / 1024.0,
            self.num_gets(),
            self.num_scans(),
            self.rows_returned(),
            self.cells_returned(),
            self.cells_filtered.load(Ordering::Relaxed),
            self.filter_selectivity() * 100.0,
            self.rows_filtered.load(Ordering::Relaxed),
            self.rows_skipped_by_hint.load(Ordering::Relaxed),
            self.log_writes.load(Ordering::Relaxed),
            self.log_syncs.load(Ordering::Relaxed),
            self.log_bytes_written.load(Ordering::Relaxed),
            self.log_bytes_written.load(Ordering::Relaxed) as f64 / 1024.0 / 1024.0,
            self.log_records_replayed.load(Ordering::Relaxed),
            self.num_compactions(),
            self.avg_compaction_time_ms(),
            self.compaction_cells_read.load(Ordering::Relaxed),
            self.compaction_cells_written.load(Ordering::Relaxed),
            self.num_errors.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_mutations() {
        let stats = Statistics::new();
        stats.record_put(3, 120);
        stats.record_put(1, 10);
        stats.record_delete();

        assert_eq!(stats.num_puts(), 2);
        assert_eq!(stats.num_cells_written.load(Ordering::Relaxed), 4);
        assert_eq!(stats.num_deletes(), 1);
    }

    #[test]
    fn test_filter_selectivity() {
        let stats = Statistics::new();
        assert_eq!(stats.filter_selectivity(), 0.0);

        stats.record_row(1, 3);
        assert_eq!(stats.rows_returned(), 1);
        assert!((stats.filter_selectivity() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let stats = Statistics::new();
        stats.record_scan();
        stats.record_compaction(10, 4, 2_000);
        assert_eq!(stats.avg_compaction_time_ms(), 2.0);

        stats.reset();
        assert_eq!(stats.num_scans(), 0);
        assert_eq!(stats.num_compactions(), 0);
    }

    #[test]
    fn test_report() {
        let stats = Statistics::new();
        stats.record_log_write(64);
        stats.record_log_sync();
        let report = stats.report();
        assert!(report.contains("Store Statistics"));
        assert!(report.contains("Syncs:         1"));
    }
}
