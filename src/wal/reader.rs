use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read},
    path::Path,
};

use bytes::Bytes;

use crate::{
    util::{Result, Status, logging::log_warn},
    wal::{
        log_format::{HEADER_SIZE, calculate_checksum, decode_header},
        record::LogRecord,
    },
};

/// Reads the frames of a table log in order.
///
/// A frame cut short at the end of the file is a torn write: reading stops
/// there and `valid_len` tells how much of the file is intact. A damaged
/// length field or a complete frame with a bad checksum is corruption, so
/// intact frames after it are never mistaken for a torn tail.
pub struct Reader {
    reader: BufReader<File>,
    file_len: u64,
    /// End of the last intact frame
    offset: u64,
    torn: bool,
}

impl Reader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Status::storage_unavailable(format!("Failed to open log file: {e}")))?;
        let file_len = file
            .metadata()
            .map_err(|e| Status::storage_unavailable(format!("Failed to stat log file: {e}")))?
            .len();

        Ok(Reader {
            reader: BufReader::new(file),
            file_len,
            offset: 0,
            torn: false,
        })
    }

    pub fn read_record(&mut self) -> Result<Option<LogRecord>> {
        match self.read_payload()? {
            Some(payload) => LogRecord::decode(payload).map(Some),
            None => Ok(None),
        }
    }

    pub fn read_payload(&mut self) -> Result<Option<Bytes>> {
        if self.torn {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_SIZE];
        let n = self.fill(&mut header)?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_SIZE {
            return Ok(self.tear(n));
        }

        let (checksum, length) = decode_header(&header).map_err(|e| {
            Status::corruption(format!(
                "{} at offset {}",
                e.message().unwrap_or("Bad frame header"),
                self.offset
            ))
        })?;
        let available = self
            .file_len
            .saturating_sub(self.offset + HEADER_SIZE as u64);
        if u64::from(length) > available {
            return Ok(self.tear(HEADER_SIZE + available as usize));
        }

        let mut payload = vec![0u8; length as usize];
        let n = self.fill(&mut payload)?;
        if n < payload.len() {
            return Ok(self.tear(HEADER_SIZE + n));
        }

        let actual = calculate_checksum(&payload);
        if actual != checksum {
            return Err(Status::corruption(format!(
                "Checksum mismatch at offset {}: expected {checksum}, got {actual}",
                self.offset
            )));
        }

        self.offset += (HEADER_SIZE + payload.len()) as u64;
        Ok(Some(Bytes::from(payload)))
    }

    fn tear(&mut self, partial: usize) -> Option<Bytes> {
        log_warn!(
            component = "wal",
            event = "torn_record_ignored",
            offset = self.offset,
            partial,
        );
        self.torn = true;
        None
    }

    /// Read until `buf` is full or the file ends; returns bytes read
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => {
                    return Err(Status::storage_unavailable(format!("Read log failed: {e}")));
                },
            }
        }
        Ok(filled)
    }

    /// Length of the intact prefix of the file read so far
    pub fn valid_len(&self) -> u64 {
        self.offset
    }

    /// Whether reading stopped at a torn trailing frame
    pub fn is_torn(&self) -> bool {
        self.torn
    }
}
