use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::{
    memtable::MemTable,
    statistics::Statistics,
    util::{Result, Status, logging::log_info},
    wal::{LogRecord, Reader, Writer},
};

/// What replaying a table log found
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReplaySummary {
    pub(crate) records: u64,
    pub(crate) max_sequence: u64,
    pub(crate) max_timestamp: u64,
    pub(crate) torn: bool,
}

/// The mutation log of one table: `<dir>/<table>.log`
pub(crate) struct TableLog {
    path: PathBuf,
    writer: Mutex<Writer>,
    sync_writes: bool,
}

impl TableLog {
    pub(crate) fn path_for(dir: &Path, table: &str) -> PathBuf {
        dir.join(format!("{table}.log"))
    }

    /// Start an empty log, discarding any leftover file
    pub(crate) fn create(dir: &Path, table: &str, sync_writes: bool) -> Result<Self> {
        let path = Self::path_for(dir, table);
        let writer = Writer::create(&path)?;
        Ok(TableLog {
            path,
            writer: Mutex::new(writer),
            sync_writes,
        })
    }

    /// Replay an existing log into `mem`, then reopen it for appending.
    ///
    /// A missing file is an empty log. A torn trailing frame is cut off so
    /// that new records start on a frame boundary.
    pub(crate) fn recover(
        dir: &Path,
        table: &str,
        sync_writes: bool,
        mem: &MemTable,
        stats: &Statistics,
    ) -> Result<(Self, ReplaySummary)> {
        let path = Self::path_for(dir, table);
        let mut summary = ReplaySummary::default();

        if path.exists() {
            let mut reader = Reader::new(&path)?;
            while let Some(record) = reader.read_record()? {
                summary.records += 1;
                summary.max_sequence = summary.max_sequence.max(record.sequence());
                summary.max_timestamp = summary.max_timestamp.max(record.max_timestamp());
                apply_record(mem, record);
            }

            if reader.is_torn() {
                summary.torn = true;
                let file = OpenOptions::new().write(true).open(&path)?;
                file.set_len(reader.valid_len())?;
                file.sync_all()?;
            }
            stats.record_replayed(summary.records);
        }

        log_info!(
            component = "wal",
            event = "log_replayed",
            table,
            records = summary.records,
            max_sequence = summary.max_sequence,
            torn = summary.torn,
        );

        let writer = Writer::open(&path)?;
        Ok((
            TableLog {
                path,
                writer: Mutex::new(writer),
                sync_writes,
            },
            summary,
        ))
    }

    pub(crate) fn append(&self, record: &LogRecord, stats: &Statistics) -> Result<()> {
        let mut writer = self.writer.lock();
        let written = writer.add_record(record)?;
        stats.record_log_write(written as u64);
        if self.sync_writes {
            writer.sync()?;
            stats.record_log_sync();
        }
        Ok(())
    }

    /// Replace the log's content with `records`.
    ///
    /// The new log is written to a temporary file and renamed over the old
    /// one, so a crash leaves either the old or the new log in place.
    pub(crate) fn rewrite(&self, records: &[LogRecord]) -> Result<()> {
        let mut writer = self.writer.lock();

        let tmp = self.path.with_extension("log.tmp");
        {
            let mut tmp_writer = Writer::create(&tmp)?;
            for record in records {
                tmp_writer.add_record(record)?;
            }
            tmp_writer.sync()?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            Status::storage_unavailable(format!("Failed to install compacted log: {e}"))
        })?;

        *writer = Writer::open(&self.path)?;
        Ok(())
    }

    /// Delete the log file
    pub(crate) fn remove(&self) -> Result<()> {
        let _writer = self.writer.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Apply a logged mutation to a MemTable
pub(crate) fn apply_record(mem: &MemTable, record: LogRecord) {
    match record {
        LogRecord::Put {
            sequence, cells, ..
        } => {
            for cell in cells {
                mem.add(sequence, cell);
            }
        },
        LogRecord::Delete {
            sequence,
            row,
            tombstones,
        } => {
            for (index, tombstone) in tombstones.into_iter().enumerate() {
                mem.add_tombstone(sequence, index as u32, row.clone(), tombstone);
            }
        },
    }
}
