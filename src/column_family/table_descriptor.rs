use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    column_family::ColumnFamilyDescriptor,
    util::{Result, Status},
};

/// Schema of a table: its name and its fixed set of column families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub families: Vec<ColumnFamilyDescriptor>,
}

impl TableDescriptor {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TableDescriptor {
            name: name.into(),
            families: Vec::new(),
        }
    }

    pub fn with_family(mut self, family: ColumnFamilyDescriptor) -> Self {
        self.families.push(family);
        self
    }

    /// Look up a family by name
    pub fn family(&self, name: &[u8]) -> Option<&ColumnFamilyDescriptor> {
        self.families.iter().find(|cf| cf.name.as_bytes() == name)
    }

    /// Check the descriptor can back a table.
    ///
    /// Table names are used as log file names, so they are restricted to
    /// ASCII alphanumerics, `_`, `-` and `.`.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_table_name(&self.name) {
            return Err(Status::invalid_argument(format!(
                "invalid table name '{}'",
                self.name
            )));
        }

        if self.families.is_empty() {
            return Err(Status::invalid_argument(format!(
                "table '{}' must declare at least one column family",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for cf in &self.families {
            if cf.name.is_empty() {
                return Err(Status::invalid_argument("column family name is empty"));
            }
            if !seen.insert(cf.name.as_str()) {
                return Err(Status::invalid_argument(format!(
                    "column family '{}' declared twice",
                    cf.name
                )));
            }
        }

        Ok(())
    }
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
