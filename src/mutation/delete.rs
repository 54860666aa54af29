use bytes::Bytes;

use crate::memtable::{DeleteScope, Tombstone};

/// Delete of a whole row, some families or some columns.
///
/// A Delete without any family or column removes the whole row. Every cell
/// in scope with timestamp <= the Delete's timestamp is hidden; without an
/// explicit timestamp the table stamps the Delete with "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    row: Bytes,
    timestamp: Option<u64>,
    scopes: Vec<DeleteScope>,
}

impl Delete {
    pub fn new(row: impl Into<Bytes>) -> Self {
        Delete {
            row: row.into(),
            timestamp: None,
            scopes: Vec::new(),
        }
    }

    pub fn add_family(mut self, family: impl Into<Bytes>) -> Self {
        self.scopes.push(DeleteScope::Family(family.into()));
        self
    }

    pub fn add_column(mut self, family: impl Into<Bytes>, qualifier: impl Into<Bytes>) -> Self {
        self.scopes
            .push(DeleteScope::Column(family.into(), qualifier.into()));
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
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

    /// Scopes of the delete; a bare row delete has the single scope `Row`
    pub fn scopes(&self) -> Vec<DeleteScope> {
        if self.scopes.is_empty() {
            vec![DeleteScope::Row]
        } else {
            self.scopes.clone()
        }
    }

    pub(crate) fn from_scope(row: impl Into<Bytes>, scope: DeleteScope) -> Self {
        let delete = Delete::new(row);
        match scope {
            DeleteScope::Row => delete,
            DeleteScope::Family(f) => delete.add_family(f),
            DeleteScope::Column(f, q) => delete.add_column(f, q),
        }
    }

    pub(crate) fn to_tombstones(&self, default_ts: u64) -> Vec<Tombstone> {
        let timestamp = self.timestamp.unwrap_or(default_ts);
        self.scopes()
            .into_iter()
            .map(|scope| Tombstone { scope, timestamp })
            .collect()
    }
}
