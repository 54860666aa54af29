use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    column_family::TableDescriptor,
    util::{Result, Status},
};

pub(crate) const CATALOG_FILE: &str = "CATALOG";
const CATALOG_VERSION: u32 = 1;

/// One table as recorded in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CatalogEntry {
    pub(crate) descriptor: TableDescriptor,
    pub(crate) enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    version: u32,
    tables: Vec<CatalogEntry>,
}

/// The JSON list of tables of a log-backed store: `<dir>/CATALOG`
pub(crate) struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub(crate) fn new(dir: &Path) -> Self {
        Catalog {
            path: dir.join(CATALOG_FILE),
        }
    }

    /// Tables recorded in the catalog; none if it does not exist yet
    pub(crate) fn load(&self) -> Result<Vec<CatalogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path)?;
        let file: CatalogFile = serde_json::from_slice(&data)?;
        if file.version != CATALOG_VERSION {
            return Err(Status::corruption(format!(
                "unsupported catalog version {}",
                file.version
            )));
        }
        Ok(file.tables)
    }

    /// Replace the catalog with `tables`, atomically
    pub(crate) fn save(&self, tables: Vec<CatalogEntry>) -> Result<()> {
        let file = CatalogFile {
            version: CATALOG_VERSION,
            tables,
        };
        let data = serde_json::to_vec_pretty(&file)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(&data)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
