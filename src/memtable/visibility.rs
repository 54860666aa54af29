use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use crate::column_family::TableDescriptor;

/// Projection of a read onto a subset of families and columns.
///
/// An empty selection reads every column. Selecting a whole family wins over
/// selecting single columns of the same family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    families: BTreeMap<Bytes, Option<BTreeSet<Bytes>>>,
}

impl ColumnSelection {
    pub fn all() -> Self {
        ColumnSelection::default()
    }

    pub fn add_family(&mut self, family: impl Into<Bytes>) {
        self.families.insert(family.into(), None);
    }

    pub fn add_column(&mut self, family: impl Into<Bytes>, qualifier: impl Into<Bytes>) {
        let entry = self
            .families
            .entry(family.into())
            .or_insert_with(|| Some(BTreeSet::new()));
        if let Some(qualifiers) = entry {
            qualifiers.insert(qualifier.into());
        }
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        self.families.is_empty()
    }

    pub fn selects(&self, family: &[u8], qualifier: &[u8]) -> bool {
        if self.families.is_empty() {
            return true;
        }
        match self.families.get(family) {
            Some(None) => true,
            Some(Some(qualifiers)) => qualifiers.contains(qualifier),
            None => false,
        }
    }

    /// Families named by the selection
    pub fn families(&self) -> impl std::iter::Iterator<Item = &Bytes> {
        self.families.keys()
    }
}

/// Everything a read needs to decide which stored versions it sees.
pub(crate) struct ReadPoint<'a> {
    /// Only writes with sequence <= this are visible
    pub(crate) sequence: u64,
    /// Wall-clock time the read started at, for TTL
    pub(crate) now: u64,
    /// Versions returned per column (further capped by each family)
    pub(crate) max_versions: u32,
    pub(crate) columns: &'a ColumnSelection,
    pub(crate) schema: &'a TableDescriptor,
}
