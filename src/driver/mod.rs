/// Driver seam - the connection/command primitives the executor runs on
///
/// Lifetimes nest the way the resources do: a command borrows its
/// connection and a cursor borrows its command, so neither can outlive
/// what it reads from.
///
/// Backends:
/// - sqlite: rusqlite-backed driver (feature `sqlite`)

#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::core::{CommandKind, Parameter, ProviderResult, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;

/// Opens connections from a connection string.
pub trait Driver {
    fn connect(&self, connection_string: &str) -> ProviderResult<Box<dyn Connection>>;
}

pub trait Connection {
    fn prepare<'c>(&'c self, sql: &str, kind: CommandKind) -> ProviderResult<Box<dyn Command + 'c>>;

    /// Closes the connection; dropping it without calling this still frees
    /// the handle but loses any close error.
    fn close(self: Box<Self>) -> ProviderResult<()>;
}

pub trait Command {
    fn bind(&mut self, parameter: Parameter) -> ProviderResult<()>;

    /// Runs the command to completion and returns the affected row count,
    /// or -1 when the statement is not an INSERT/UPDATE/DELETE.
    fn execute(&mut self) -> ProviderResult<i64>;

    fn query<'s>(&'s mut self) -> ProviderResult<Box<dyn Cursor + 's>>;

    /// Bound parameters with the values the engine wrote back. Output values
    /// are final only after the last cursor over this command is exhausted
    /// and dropped.
    fn parameters(&self) -> &[Parameter];
}

/// Forward-only row source.
pub trait Cursor {
    fn columns(&self) -> &[String];

    /// Next row's values, `None` once the result set is exhausted.
    fn advance(&mut self) -> ProviderResult<Option<Vec<Value>>>;
}
