/// Column Family module for cellbase
///
/// A table groups its columns into a fixed set of column families. Each family
/// has independent configuration (time-to-live, retained versions), and every
/// cell address names its family:
///
/// ```text
/// Table("myTable")
///  ├─→ ColumnFamily("cf1")   ttl = 10s
///  │    ├─→ cf1:name
///  │    └─→ cf1:sex
///  └─→ ColumnFamily("cf2")   max_versions = 3
///       └─→ cf2:mam
/// ```
pub mod column_family_descriptor;
pub mod table_descriptor;

pub use column_family_descriptor::ColumnFamilyDescriptor;
pub use table_descriptor::TableDescriptor;
