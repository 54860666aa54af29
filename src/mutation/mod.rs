/// Mutation Log
///
/// Client-side mutation builders (`Put`, `Delete`) and the machinery a table
/// uses to apply them:
///
/// - `RowLocks`: striped locks making writes to one row mutually exclusive
/// - `SequenceTracker`: hands out sequence numbers and publishes them in
///   order, so a reader's snapshot never contains half of a mutation
/// - `TimestampOracle`: assigns per-table, strictly increasing implicit
///   timestamps
pub mod clock;
pub mod delete;
pub mod put;
pub mod row_lock;
pub mod sequence;

pub use clock::TimestampOracle;
pub use delete::Delete;
pub use put::Put;
pub use row_lock::RowLocks;
pub use sequence::{SequenceTicket, SequenceTracker};
