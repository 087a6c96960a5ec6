/// Executor module - runs commands through a driver connection
///
/// Structure:
/// - connection: per-call connection scope, released on every exit path
/// - rows: single-pass streaming cursor handed to `stream` callers
/// - query: `QueryExecutor`, the public command surface

mod connection;
pub mod rows;
pub mod query;

pub use rows::{MappedRows, Rows};
pub use query::QueryExecutor;
