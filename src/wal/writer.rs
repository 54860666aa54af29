use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
};

use crate::{
    util::{Result, Status},
    wal::{
        log_format::{HEADER_SIZE, MAX_PAYLOAD, calculate_checksum, encode_header},
        record::LogRecord,
    },
};

/// Appends framed records to a table log
pub struct Writer {
    file: File,
    /// Current position in the file
    offset: u64,
}

impl Writer {
    /// Open `path` for appending, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Status::storage_unavailable(format!("Failed to open log file: {e}")))?;
        let offset = file
            .metadata()
            .map_err(|e| Status::storage_unavailable(format!("Failed to stat log file: {e}")))?
            .len();

        Ok(Writer { file, offset })
    }

    /// Create `path`, discarding anything already there
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Status::storage_unavailable(format!("Failed to create log file: {e}")))?;

        Ok(Writer { file, offset: 0 })
    }

    pub fn add_record(&mut self, record: &LogRecord) -> Result<usize> {
        self.add_payload(&record.encode())
    }

    /// Append one frame; returns the number of bytes written
    pub fn add_payload(&mut self, payload: &[u8]) -> Result<usize> {
        if payload.len() > MAX_PAYLOAD {
            return Err(Status::invalid_argument("Record too large"));
        }

        let header = encode_header(calculate_checksum(payload), payload.len() as u32);
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header);
        frame.extend_from_slice(payload);

        // One write per frame so a crash tears at most the last frame
        self.file
            .write_all(&frame)
            .map_err(|e| Status::storage_unavailable(format!("Write record failed: {e}")))?;

        self.offset += frame.len() as u64;
        Ok(frame.len())
    }

    /// Sync the file to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_data()
            .map_err(|e| Status::storage_unavailable(format!("Sync failed: {e}")))
    }

    /// Get current file offset
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
