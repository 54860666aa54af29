//! cellbase: a row-oriented column-family key-value store with a
//! composable server-side filter and scan engine.

pub mod column_family;
pub mod filter;
pub mod memtable;
pub mod mutation;
pub mod scan;
pub mod statistics;
pub mod store;
pub mod table;
pub mod util;
pub mod wal;

pub use column_family::{ColumnFamilyDescriptor, TableDescriptor};
pub use filter::{
    CompareOp, Comparator, Filter, FilterList, FuzzyRule, Operator, ReturnCode, RowRange,
    SingleColumnValueFilter,
};
pub use memtable::{Cell, DeleteScope};
pub use mutation::{Delete, Put};
pub use scan::{Get, RowResult, Scan, Scanner};
pub use statistics::Statistics;
pub use store::{Store, StoreOptions};
pub use table::{CompactionSummary, Table};
pub use util::{Code, Result, Status};
