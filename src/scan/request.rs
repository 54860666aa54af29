use bytes::Bytes;

use crate::{
    filter::Filter,
    memtable::ColumnSelection,
    util::{Result, Status},
};

/// Single-row read.
///
/// ```ignore
/// let get = Get::new("row1")
///     .add_family("info")
///     .with_filter(Filter::column_count(2));
/// ```
#[derive(Debug, Clone)]
pub struct Get {
    row: Bytes,
    columns: ColumnSelection,
    max_versions: u32,
    filter: Option<Filter>,
}

impl Get {
    pub fn new(row: impl Into<Bytes>) -> Self {
        Get {
            row: row.into(),
            columns: ColumnSelection::all(),
            max_versions: 1,
            filter: None,
        }
    }

    pub fn add_family(mut self, family: impl Into<Bytes>) -> Self {
        self.columns.add_family(family);
        self
    }

    pub fn add_column(mut self, family: impl Into<Bytes>, qualifier: impl Into<Bytes>) -> Self {
        self.columns.add_column(family, qualifier);
        self
    }

    /// Versions per column, still capped by each family's own limit
    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions.max(1);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn columns(&self) -> &ColumnSelection {
        &self.columns
    }

    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }
}

/// Range read over rows in key order.
///
/// The start row is inclusive, the stop row exclusive; either may be left
/// open.
#[derive(Debug, Clone)]
pub struct Scan {
    start_row: Option<Bytes>,
    stop_row: Option<Bytes>,
    columns: ColumnSelection,
    max_versions: u32,
    limit: Option<usize>,
    filter: Option<Filter>,
}

impl Default for Scan {
    fn default() -> Self {
        Scan {
            start_row: None,
            stop_row: None,
            columns: ColumnSelection::all(),
            max_versions: 1,
            limit: None,
            filter: None,
        }
    }
}

impl Scan {
    pub fn new() -> Self {
        Scan::default()
    }

    /// Scan of `[start, stop)`; fails if start orders after stop
    pub fn range(start: impl Into<Bytes>, stop: impl Into<Bytes>) -> Result<Self> {
        let scan = Scan::new().with_start_row(start).with_stop_row(stop);
        scan.validate()?;
        Ok(scan)
    }

    pub fn with_start_row(mut self, start: impl Into<Bytes>) -> Self {
        self.start_row = Some(start.into());
        self
    }

    /// Exclusive upper bound; an empty stop row leaves the scan unbounded
    pub fn with_stop_row(mut self, stop: impl Into<Bytes>) -> Self {
        let stop = stop.into();
        self.stop_row = (!stop.is_empty()).then_some(stop);
        self
    }

    pub fn add_family(mut self, family: impl Into<Bytes>) -> Self {
        self.columns.add_family(family);
        self
    }

    pub fn add_column(mut self, family: impl Into<Bytes>, qualifier: impl Into<Bytes>) -> Self {
        self.columns.add_column(family, qualifier);
        self
    }

    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions.max(1);
        self
    }

    /// Stop after this many rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn start_row(&self) -> Option<&Bytes> {
        self.start_row.as_ref()
    }

    pub fn stop_row(&self) -> Option<&Bytes> {
        self.stop_row.as_ref()
    }

    pub fn columns(&self) -> &ColumnSelection {
        &self.columns
    }

    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(stop)) = (&self.start_row, &self.stop_row) {
            if start > stop {
                return Err(Status::malformed_key_range(format!(
                    "scan start row {:?} is after stop row {:?}",
                    String::from_utf8_lossy(start),
                    String::from_utf8_lossy(stop),
                )));
            }
        }
        Ok(())
    }

    /// Whether `row` is at or past the stop row
    #[inline]
    pub(crate) fn is_past_stop(&self, row: &[u8]) -> bool {
        self.stop_row
            .as_ref()
            .is_some_and(|stop| row >= stop.as_ref())
    }
}
