/// Scan Executor
///
/// `Get` and `Scan` describe a read; `Scanner` walks the table's rows in key
/// order and hands out one `RowResult` per surviving row.
///
/// For each candidate row the scanner:
///
/// ```text
/// 1. stops at the stop row or when the limit is reached
/// 2. asks the filter whether the row key alone rejects the row, and if so
///    whether every later row is rejected too (end of scan) or where the
///    next possible match starts (seek)
/// 3. resolves the visible cells at the scan's snapshot
/// 4. runs the filter over the cells and drops rows left empty
/// ```
pub mod request;
pub mod result;
pub mod scanner;

pub use request::{Get, Scan};
pub use result::RowResult;
pub(crate) use scanner::ReadSnapshot;
pub use scanner::Scanner;
