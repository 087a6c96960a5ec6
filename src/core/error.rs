use thiserror::Error;

/// Failure raised by the underlying database driver.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("Not supported by provider: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Engine(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Cannot convert {found} to {target}")]
    InvalidCast { target: &'static str, found: String },
    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),
    #[error("No provider type mapping for '{0}'")]
    Lookup(&'static str),
    #[error("Field ordinal {ordinal} out of range (field count {count})")]
    OrdinalOutOfRange { ordinal: usize, count: usize },
    #[error("Field '{0}' not found")]
    FieldNotFound(String),
    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DataSourceError>;

impl DataSourceError {
    /// Wraps a driver failure with the name of the executor operation that hit it.
    pub fn provider(operation: &'static str) -> impl FnOnce(ProviderError) -> Self {
        move |source| Self::Provider { operation, source }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
