pub mod cell;
#[allow(clippy::module_inception)]
pub mod memtable;
pub mod visibility;

pub use cell::{Cell, DeleteScope, Tombstone};
pub use memtable::MemTable;
pub use visibility::ColumnSelection;
pub(crate) use visibility::ReadPoint;
