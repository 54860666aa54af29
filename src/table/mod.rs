/// Per-table runtime
///
/// A table owns its Cell Store (a copy-on-write `MemTable` generation),
/// its sequence tracker, clock and row locks, and optionally its mutation
/// log. `Table` is the public handle; `TableInner` is shared with the store
/// and with open scanners.
pub mod compaction;
pub(crate) mod log;
#[allow(clippy::module_inception)]
pub mod table;

pub use compaction::CompactionSummary;
pub use table::Table;
pub(crate) use table::TableInner;
