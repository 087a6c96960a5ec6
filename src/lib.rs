// sqlsource - parameterized SQL command execution
// Streams rows over a live connection, or buffers them into detached records
// together with returned output parameters.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

// Values, records, parameters, errors, provider type mapping
pub mod core;

// Connection/command/cursor primitives and the bundled SQLite backend
pub mod driver;

// QueryExecutor: streaming, scalar, non-query and buffered execution
pub mod executor;

// Connection configuration (file + environment)
pub mod config;

// Re-export commonly used types for convenience
pub use core::{
    CommandKind, DataRecord, DataSourceError, DetachedRecord, Direction, FromValue, Parameter,
    Params, ProviderError, ProviderType, Result, RowView, ScalarType, Value,
};
pub use config::ExecutorConfig;
pub use driver::{Command, Connection, Cursor, Driver};
pub use executor::{QueryExecutor, Rows};

#[cfg(feature = "sqlite")]
pub use driver::SqliteDriver;
