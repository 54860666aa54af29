/// Store
///
/// The caller-facing handle: table administration and the data operations,
/// addressed by table name.
///
/// # Layout of a log-backed store
///
/// ```text
/// <dir>/CATALOG        JSON list of table descriptors and their state
/// <dir>/<table>.log    mutation log of each table
/// ```
pub(crate) mod catalog;
pub mod options;
#[allow(clippy::module_inception)]
pub mod store;

pub use options::StoreOptions;
pub use store::Store;
