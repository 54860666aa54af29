use std::cmp::Ordering;

use bytes::Bytes;

use crate::util::{Result, Status, key_successor};

/// A range of row keys. An empty start means "from the first row", an empty
/// stop means "to the last row".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRange {
    start: Bytes,
    start_inclusive: bool,
    stop: Bytes,
    stop_inclusive: bool,
}

impl RowRange {
    pub fn new(
        start: impl Into<Bytes>,
        start_inclusive: bool,
        stop: impl Into<Bytes>,
        stop_inclusive: bool,
    ) -> Result<Self> {
        let range = RowRange {
            start: start.into(),
            start_inclusive,
            stop: stop.into(),
            stop_inclusive,
        };
        if !range.stop.is_empty() && range.start > range.stop {
            return Err(Status::malformed_key_range(format!(
                "row range start {:?} is after stop {:?}",
                range.start, range.stop
            )));
        }
        Ok(range)
    }

    pub fn start(&self) -> &Bytes {
        &self.start
    }

    pub fn stop(&self) -> &Bytes {
        &self.stop
    }

    pub fn contains(&self, row: &[u8]) -> bool {
        let after_start = match row.cmp(self.start.as_ref()) {
            Ordering::Greater => true,
            Ordering::Equal => self.start_inclusive || self.start.is_empty(),
            Ordering::Less => false,
        };
        after_start && !self.ends_before(row)
    }

    /// The range ends before `row`
    fn ends_before(&self, row: &[u8]) -> bool {
        if self.stop.is_empty() {
            return false;
        }
        match row.cmp(self.stop.as_ref()) {
            Ordering::Greater => true,
            Ordering::Equal => !self.stop_inclusive,
            Ordering::Less => false,
        }
    }

    /// First key of the range
    fn first_key(&self) -> Bytes {
        if self.start_inclusive || self.start.is_empty() {
            self.start.clone()
        } else {
            Bytes::from(key_successor(&self.start))
        }
    }

    /// Compare the start bounds of two ranges; the lower bound first
    fn cmp_start(&self, other: &RowRange) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.start_inclusive.cmp(&self.start_inclusive))
    }

    /// Compare the stop bounds of two ranges; unbounded is largest
    fn cmp_stop(&self, other: &RowRange) -> Ordering {
        match (self.stop.is_empty(), other.stop.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .stop
                .cmp(&other.stop)
                .then_with(|| self.stop_inclusive.cmp(&other.stop_inclusive)),
        }
    }

    /// Whether `next` (starting at or after self) overlaps or touches self
    fn joins(&self, next: &RowRange) -> bool {
        if self.stop.is_empty() {
            return true;
        }
        match next.start.cmp(&self.stop) {
            Ordering::Less => true,
            Ordering::Equal => self.stop_inclusive || next.start_inclusive,
            Ordering::Greater => false,
        }
    }
}

/// Set of row ranges, sorted and merged so that they are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRowRangeFilter {
    ranges: Vec<RowRange>,
}

impl MultiRowRangeFilter {
    pub fn new(mut ranges: Vec<RowRange>) -> Result<Self> {
        if ranges.is_empty() {
            return Err(Status::empty_filter_config(
                "multi row range filter needs at least one range",
            ));
        }

        ranges.sort_by(|a, b| a.cmp_start(b));

        let mut merged: Vec<RowRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if last.joins(&range) => {
                    if range.cmp_stop(last) == Ordering::Greater {
                        last.stop = range.stop;
                        last.stop_inclusive = range.stop_inclusive;
                    }
                },
                _ => merged.push(range),
            }
        }

        Ok(MultiRowRangeFilter { ranges: merged })
    }

    /// The normalized, disjoint ranges in key order
    pub fn ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    /// Index of the first range whose stop bound is not before `row`
    fn candidate(&self, row: &[u8]) -> usize {
        self.ranges.partition_point(|r| r.ends_before(row))
    }

    pub fn contains(&self, row: &[u8]) -> bool {
        self.ranges
            .get(self.candidate(row))
            .is_some_and(|r| r.contains(row))
    }

    /// Start of the next range after a rejected `row`
    pub(crate) fn seek_hint(&self, row: &[u8]) -> Option<Bytes> {
        let range = self.ranges.get(self.candidate(row))?;
        let first = range.first_key();
        (first.as_ref() > row).then_some(first)
    }

    /// `row` is beyond every range
    pub(crate) fn is_exhausted_after(&self, row: &[u8]) -> bool {
        self.ranges
            .last()
            .is_some_and(|last| !last.stop.is_empty() && row >= last.stop.as_ref())
    }
}
