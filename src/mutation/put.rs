use bytes::Bytes;

use crate::memtable::Cell;

/// One column write inside a Put
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    pub family: Bytes,
    pub qualifier: Bytes,
    /// Explicit timestamp; None takes the Put's timestamp
    pub timestamp: Option<u64>,
    pub value: Bytes,
}

/// A set of cell writes to one row.
///
/// The cells of a Put become visible to readers together. A Put without an
/// explicit timestamp is stamped by the table when it is applied.
///
/// ```ignore
/// let put = Put::new("row1")
///     .add_column("info", "name", "Sara")
///     .add_column("info", "sex", "female");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    row: Bytes,
    timestamp: Option<u64>,
    columns: Vec<ColumnValue>,
    /// Approximate payload size in bytes
    data_size: usize,
}

impl Put {
    pub fn new(row: impl Into<Bytes>) -> Self {
        let row = row.into();
        Put {
            data_size: row.len(),
            row,
            timestamp: None,
            columns: Vec::new(),
        }
    }

    /// Write `family:qualifier = value`. An empty qualifier addresses the
    /// family itself.
    pub fn add_column(
        self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Self {
        self.push(family.into(), qualifier.into(), None, value.into())
    }

    /// Write one column at an explicit timestamp
    pub fn add_column_at(
        self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
        value: impl Into<Bytes>,
    ) -> Self {
        self.push(family.into(), qualifier.into(), Some(timestamp), value.into())
    }

    /// Timestamp for every column without one of its own
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    fn push(mut self, family: Bytes, qualifier: Bytes, timestamp: Option<u64>, value: Bytes) -> Self {
        self.data_size += family.len() + qualifier.len() + value.len() + 8;
        self.columns.push(ColumnValue {
            family,
            qualifier,
            timestamp,
            value,
        });
        self
    }

    #[inline]
    pub fn row(&self) -> &Bytes {
        &self.row
    }

    #[inline]
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnValue] {
        &self.columns
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn approximate_size(&self) -> usize {
        self.data_size
    }

    /// Every column needs a timestamp of its own or a Put-level one
    pub(crate) fn needs_timestamp(&self) -> bool {
        self.timestamp.is_none() && self.columns.iter().any(|c| c.timestamp.is_none())
    }

    /// Resolve the Put into cells, stamping columns without a timestamp
    /// with `default_ts`.
    pub(crate) fn to_cells(&self, default_ts: u64) -> Vec<Cell> {
        let put_ts = self.timestamp.unwrap_or(default_ts);
        self.columns
            .iter()
            .map(|c| Cell {
                row: self.row.clone(),
                family: c.family.clone(),
                qualifier: c.qualifier.clone(),
                timestamp: c.timestamp.unwrap_or(put_ts),
                value: c.value.clone(),
            })
            .collect()
    }
}
