use std::{collections::BTreeMap, fs, path::PathBuf, sync::Arc};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use crate::{
    column_family::TableDescriptor,
    filter::Filter,
    memtable::{Cell, DeleteScope},
    mutation::{Delete, Put},
    scan::{Get, RowResult, Scan, Scanner},
    statistics::Statistics,
    store::{
        StoreOptions,
        catalog::{Catalog, CatalogEntry},
    },
    table::{CompactionSummary, Table, TableInner},
    util::{
        Result, Status,
        logging::{log_debug, log_info, log_warn},
    },
};

/// A row-oriented column-family store.
///
/// The store is an explicit handle: open it, share it by reference (it is
/// `Send + Sync`) and drop it when done. Every table operation takes the
/// table name and fails with `TableNotFound` for a table that does not
/// exist.
///
/// ```ignore
/// let store = Store::open(StoreOptions::at("/tmp/people"))?;
/// store.create_table(TableDescriptor::new("people").with_family(ColumnFamilyDescriptor::new("info")))?;
/// store.put("people", &Put::new("row1").add_column("info", "name", "Sara"))?;
/// for row in store.scan("people", Scan::new().with_filter(Filter::prefix("row1")))? {
///     println!("{:?}", row?);
/// }
/// ```
pub struct Store {
    options: StoreOptions,
    tables: RwLock<BTreeMap<String, Arc<TableInner>>>,
    catalog: Option<Catalog>,
    /// Serializes admin operations so catalog rewrites apply in order
    admin: Mutex<()>,
    statistics: Arc<Statistics>,
}

impl Store {
    /// In-memory store
    pub fn new() -> Self {
        Store {
            options: StoreOptions::in_memory(),
            tables: RwLock::new(BTreeMap::new()),
            catalog: None,
            admin: Mutex::new(()),
            statistics: Arc::new(Statistics::new()),
        }
    }

    /// Open a store. With a path, the catalog is loaded and every table is
    /// rebuilt from its log.
    pub fn open(options: StoreOptions) -> Result<Self> {
        let Some(dir) = options.path.clone() else {
            let mut store = Store::new();
            store.options = options;
            return Ok(store);
        };

        if !dir.exists() {
            if !options.create_if_missing {
                return Err(Status::storage_unavailable(format!(
                    "store directory {} does not exist",
                    dir.display()
                )));
            }
            fs::create_dir_all(&dir).map_err(|e| {
                Status::storage_unavailable(format!("Failed to create directory: {e}"))
            })?;
        }

        let statistics = Arc::new(Statistics::new());
        let catalog = Catalog::new(&dir);
        let mut tables = BTreeMap::new();
        let mut records = 0;

        for entry in catalog.load()? {
            let (table, summary) = TableInner::recover(
                entry.descriptor,
                entry.enabled,
                &dir,
                options.sync_writes,
                statistics.clone(),
            )?;
            records += summary.records;
            tables.insert(table.name().to_string(), Arc::new(table));
        }

        log_info!(
            component = "store",
            event = "store_opened",
            path = %dir.display(),
            tables = tables.len(),
            records_replayed = records,
        );

        Ok(Store {
            options,
            tables: RwLock::new(tables),
            catalog: Some(catalog),
            admin: Mutex::new(()),
            statistics,
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.options.path.as_ref()
    }

    /// Store-wide statistics
    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    fn lookup(&self, name: &str) -> Result<Arc<TableInner>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Status::table_not_found(name))
    }

    /// Rewrite the catalog from the current table set
    fn save_catalog(&self) -> Result<()> {
        let Some(catalog) = &self.catalog else {
            return Ok(());
        };
        let entries = self
            .tables
            .read()
            .values()
            .map(|t| CatalogEntry {
                descriptor: t.descriptor().clone(),
                enabled: t.is_enabled(),
            })
            .collect();
        catalog.save(entries)
    }

    // Admin operations

    pub fn create_table(&self, descriptor: TableDescriptor) -> Result<()> {
        descriptor.validate()?;
        let _admin = self.admin.lock();

        if self.tables.read().contains_key(&descriptor.name) {
            return Err(Status::table_exists(&descriptor.name));
        }

        let name = descriptor.name.clone();
        let families = descriptor.families.len();
        let table = match &self.options.path {
            Some(dir) => TableInner::create_logged(
                descriptor,
                dir,
                self.options.sync_writes,
                self.statistics.clone(),
            )?,
            None => TableInner::new(descriptor, self.statistics.clone()),
        };
        let table = Arc::new(table);
        self.tables.write().insert(name.clone(), table.clone());

        if let Err(e) = self.save_catalog() {
            self.tables.write().remove(&name);
            if let Err(cleanup) = table.mark_dropped() {
                log_warn!(
                    component = "store",
                    event = "table_cleanup_failed",
                    table = %name,
                    error = %cleanup,
                );
            }
            return Err(e);
        }

        log_info!(
            component = "store",
            event = "table_created",
            table = %name,
            families,
        );
        Ok(())
    }

    /// Drop a table and all its data. An enabled table is disabled first.
    /// Open scanners of the table fail on their next step.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let _admin = self.admin.lock();
        let table = self.lookup(name)?;

        let was_enabled = table.is_enabled();
        if was_enabled {
            table.set_enabled(false);
            log_debug!(component = "store", event = "table_disabled", table = %name);
        }

        self.tables.write().remove(name);
        if let Err(e) = self.save_catalog() {
            self.tables.write().insert(name.to_string(), table.clone());
            table.set_enabled(was_enabled);
            return Err(e);
        }
        table.mark_dropped()?;

        log_info!(component = "store", event = "table_dropped", table = %name);
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn enable_table(&self, name: &str) -> Result<()> {
        self.set_table_enabled(name, true)
    }

    /// Reads and writes of a disabled table fail with `TableDisabled`
    pub fn disable_table(&self, name: &str) -> Result<()> {
        self.set_table_enabled(name, false)
    }

    fn set_table_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let _admin = self.admin.lock();
        let table = self.lookup(name)?;
        if table.is_enabled() == enabled {
            return Ok(());
        }

        table.set_enabled(enabled);
        if let Err(e) = self.save_catalog() {
            table.set_enabled(!enabled);
            return Err(e);
        }

        log_info!(
            component = "store",
            event = if enabled { "table_enabled" } else { "table_disabled" },
            table = %name,
        );
        Ok(())
    }

    pub fn is_table_enabled(&self, name: &str) -> Result<bool> {
        Ok(self.lookup(name)?.is_enabled())
    }

    /// Names of all tables, sorted
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    pub fn describe_table(&self, name: &str) -> Result<TableDescriptor> {
        Ok(self.lookup(name)?.descriptor().clone())
    }

    /// Handle to a table
    pub fn table(&self, name: &str) -> Result<Table> {
        Ok(Table::from_inner(self.lookup(name)?))
    }

    // Data operations

    pub fn put(&self, table: &str, put: &Put) -> Result<()> {
        self.lookup(table)?.apply_put(put)
    }

    /// Write a single cell
    pub fn put_cell(
        &self,
        table: &str,
        row: impl Into<Bytes>,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
        timestamp: Option<u64>,
    ) -> Result<()> {
        let mut put = Put::new(row).add_column(family, qualifier, value);
        if let Some(ts) = timestamp {
            put = put.with_timestamp(ts);
        }
        self.put(table, &put)
    }

    /// Apply Puts in order, stopping at the first failure. There is no
    /// rollback: Puts applied before the failing one stay applied.
    pub fn put_all(&self, table: &str, puts: &[Put]) -> Result<()> {
        let table = self.lookup(table)?;
        puts.iter().try_for_each(|put| table.apply_put(put))
    }

    pub fn delete(&self, table: &str, delete: &Delete) -> Result<()> {
        self.lookup(table)?.apply_delete(delete)
    }

    /// Delete a row, a family of a row or a column of a row as of now
    pub fn delete_scope(
        &self,
        table: &str,
        row: impl Into<Bytes>,
        scope: DeleteScope,
    ) -> Result<()> {
        self.delete(table, &Delete::from_scope(row, scope))
    }

    pub fn get(&self, table: &str, get: &Get) -> Result<RowResult> {
        self.lookup(table)?.get(get)
    }

    /// Visible cells of one row, optionally filtered; empty if the row does
    /// not exist
    pub fn get_row(
        &self,
        table: &str,
        row: impl Into<Bytes>,
        filter: Option<Filter>,
    ) -> Result<Vec<Cell>> {
        let mut get = Get::new(row);
        if let Some(filter) = filter {
            get = get.with_filter(filter);
        }
        Ok(self.get(table, &get)?.into_cells())
    }

    pub fn scan(&self, table: &str, scan: Scan) -> Result<Scanner> {
        self.lookup(table)?.scan(scan)
    }

    /// Scan `[start, stop)` with an optional filter
    pub fn scan_range(
        &self,
        table: &str,
        start: Option<Bytes>,
        stop: Option<Bytes>,
        filter: Option<Filter>,
    ) -> Result<Scanner> {
        let mut scan = Scan::new();
        if let Some(start) = start {
            scan = scan.with_start_row(start);
        }
        if let Some(stop) = stop {
            scan = scan.with_stop_row(stop);
        }
        if let Some(filter) = filter {
            scan = scan.with_filter(filter);
        }
        self.scan(table, scan)
    }

    // Maintenance

    pub fn compact(&self, table: &str) -> Result<CompactionSummary> {
        self.lookup(table)?.compact()
    }

    /// Compact every table, in parallel
    pub fn compact_all(&self) -> Result<Vec<(String, CompactionSummary)>> {
        let tables: Vec<Arc<TableInner>> = self.tables.read().values().cloned().collect();

        tables
            .par_iter()
            .map(|table| -> Result<(String, CompactionSummary)> {
                Ok((table.name().to_string(), table.compact()?))
            })
            .collect()
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        log_info!(
            component = "store",
            event = "store_closed",
            tables = self.tables.read().len(),
        );
    }
}
