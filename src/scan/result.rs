use bytes::Bytes;

use crate::memtable::Cell;

/// The surviving cells of one row, in family, qualifier, newest-first order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    row: Bytes,
    cells: Vec<Cell>,
}

impl RowResult {
    pub fn new(row: Bytes, cells: Vec<Cell>) -> Self {
        RowResult { row, cells }
    }

    pub fn empty(row: Bytes) -> Self {
        RowResult {
            row,
            cells: Vec::new(),
        }
    }

    #[inline]
    pub fn row(&self) -> &Bytes {
        &self.row
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// Latest value of `family:qualifier`
    pub fn value(&self, family: &[u8], qualifier: &[u8]) -> Option<&Bytes> {
        self.cells
            .iter()
            .find(|c| c.is_column(family, qualifier))
            .map(|c| &c.value)
    }

    /// Every returned version of `family:qualifier`, newest first
    pub fn versions<'a>(
        &'a self,
        family: &'a [u8],
        qualifier: &'a [u8],
    ) -> impl Iterator<Item = &'a Cell> + 'a {
        self.cells
            .iter()
            .filter(move |c| c.is_column(family, qualifier))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
