use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    memtable::{Cell, DeleteScope, Tombstone},
    util::{Result, Status},
};

const TAG_PUT: u8 = 1;
const TAG_DELETE: u8 = 2;

const SCOPE_ROW: u8 = 0;
const SCOPE_FAMILY: u8 = 1;
const SCOPE_COLUMN: u8 = 2;

/// A mutation as stored in the table log, with every timestamp resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Put {
        sequence: u64,
        row: Bytes,
        cells: Vec<Cell>,
    },
    Delete {
        sequence: u64,
        row: Bytes,
        tombstones: Vec<Tombstone>,
    },
}

impl LogRecord {
    pub fn sequence(&self) -> u64 {
        match self {
            LogRecord::Put { sequence, .. } | LogRecord::Delete { sequence, .. } => *sequence,
        }
    }

    /// Largest timestamp carried by the record
    pub fn max_timestamp(&self) -> u64 {
        match self {
            LogRecord::Put { cells, .. } => cells.iter().map(|c| c.timestamp).max(),
            LogRecord::Delete { tombstones, .. } => tombstones.iter().map(|t| t.timestamp).max(),
        }
        .unwrap_or(0)
    }

    /// Payload layout:
    ///
    /// ```text
    /// Put:    tag(1) seq(8) row cell_count(4) [family qualifier ts(8) value]*
    /// Delete: tag(1) seq(8) row scope_count(4) [scope_tag(1) names.. ts(8)]*
    /// ```
    ///
    /// Byte strings are a u32 length followed by the bytes; integers are
    /// little endian.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        match self {
            LogRecord::Put {
                sequence,
                row,
                cells,
            } => {
                buf.put_u8(TAG_PUT);
                buf.put_u64_le(*sequence);
                put_bytes(&mut buf, row);
                buf.put_u32_le(cells.len() as u32);
                for cell in cells {
                    put_bytes(&mut buf, &cell.family);
                    put_bytes(&mut buf, &cell.qualifier);
                    buf.put_u64_le(cell.timestamp);
                    put_bytes(&mut buf, &cell.value);
                }
            },
            LogRecord::Delete {
                sequence,
                row,
                tombstones,
            } => {
                buf.put_u8(TAG_DELETE);
                buf.put_u64_le(*sequence);
                put_bytes(&mut buf, row);
                buf.put_u32_le(tombstones.len() as u32);
                for tombstone in tombstones {
                    match &tombstone.scope {
                        DeleteScope::Row => buf.put_u8(SCOPE_ROW),
                        DeleteScope::Family(f) => {
                            buf.put_u8(SCOPE_FAMILY);
                            put_bytes(&mut buf, f);
                        },
                        DeleteScope::Column(f, q) => {
                            buf.put_u8(SCOPE_COLUMN);
                            put_bytes(&mut buf, f);
                            put_bytes(&mut buf, q);
                        },
                    }
                    buf.put_u64_le(tombstone.timestamp);
                }
            },
        }
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<LogRecord> {
        let buf = &mut payload;
        let tag = get_u8(buf)?;
        let sequence = get_u64(buf)?;
        let row = get_bytes(buf)?;
        let count = get_u32(buf)? as usize;

        let record = match tag {
            TAG_PUT => {
                let mut cells = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let family = get_bytes(buf)?;
                    let qualifier = get_bytes(buf)?;
                    let timestamp = get_u64(buf)?;
                    let value = get_bytes(buf)?;
                    cells.push(Cell {
                        row: row.clone(),
                        family,
                        qualifier,
                        timestamp,
                        value,
                    });
                }
                LogRecord::Put {
                    sequence,
                    row,
                    cells,
                }
            },
            TAG_DELETE => {
                let mut tombstones = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let scope = match get_u8(buf)? {
                        SCOPE_ROW => DeleteScope::Row,
                        SCOPE_FAMILY => DeleteScope::Family(get_bytes(buf)?),
                        SCOPE_COLUMN => {
                            let family = get_bytes(buf)?;
                            DeleteScope::Column(family, get_bytes(buf)?)
                        },
                        other => {
                            return Err(Status::corruption(format!(
                                "unknown delete scope tag {other}"
                            )));
                        },
                    };
                    let timestamp = get_u64(buf)?;
                    tombstones.push(Tombstone { scope, timestamp });
                }
                LogRecord::Delete {
                    sequence,
                    row,
                    tombstones,
                }
            },
            other => {
                return Err(Status::corruption(format!("unknown record tag {other}")));
            },
        };

        if buf.has_remaining() {
            return Err(Status::corruption(format!(
                "{} trailing bytes after record",
                buf.remaining()
            )));
        }
        Ok(record)
    }
}

fn put_bytes(buf: &mut BytesMut, data: &[u8]) {
    buf.put_u32_le(data.len() as u32);
    buf.put_slice(data);
}

fn need(buf: &Bytes, n: usize) -> Result<()> {
    if buf.remaining() < n {
        return Err(Status::corruption(format!(
            "record truncated: need {n} bytes, {} left",
            buf.remaining()
        )));
    }
    Ok(())
}

fn get_u8(buf: &mut Bytes) -> Result<u8> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut Bytes) -> Result<u32> {
    need(buf, 4)?;
    Ok(buf.get_u32_le())
}

fn get_u64(buf: &mut Bytes) -> Result<u64> {
    need(buf, 8)?;
    Ok(buf.get_u64_le())
}

fn get_bytes(buf: &mut Bytes) -> Result<Bytes> {
    let len = get_u32(buf)? as usize;
    need(buf, len)?;
    Ok(buf.split_to(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_record() {
        let record = LogRecord::Put {
            sequence: 7,
            row: Bytes::from("row1"),
            cells: vec![
                Cell::new("row1", "info", "name", 10, "Sara"),
                Cell::new("row1", "info", "", 11, ""),
            ],
        };
        let decoded = LogRecord::decode(record.encode()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.sequence(), 7);
        assert_eq!(decoded.max_timestamp(), 11);
    }

    #[test]
    fn test_delete_record() {
        let record = LogRecord::Delete {
            sequence: 3,
            row: Bytes::from("row1"),
            tombstones: vec![
                Tombstone {
                    scope: DeleteScope::Row,
                    timestamp: 1,
                },
                Tombstone {
                    scope: DeleteScope::Column(Bytes::from("f"), Bytes::from("q")),
                    timestamp: 2,
                },
            ],
        };
        assert_eq!(LogRecord::decode(record.encode()).unwrap(), record);
    }

    #[test]
    fn test_truncated_payload_is_corruption() {
        let record = LogRecord::Put {
            sequence: 1,
            row: Bytes::from("row1"),
            cells: vec![Cell::new("row1", "info", "name", 10, "Sara")],
        };
        let encoded = record.encode();
        let err = LogRecord::decode(encoded.slice(..encoded.len() - 2)).unwrap_err();
        assert!(err.is_corruption());

        let err = LogRecord::decode(Bytes::from_static(&[9, 0, 0])).unwrap_err();
        assert!(err.is_corruption());
    }
}
