use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

use crate::core::Result;

/// Default config file, read when present
pub const DEFAULT_CONFIG_FILE: &str = "./sqlsource.toml";

/// Environment prefix: `SQLSOURCE_CONNECTION_STRING` sets `connection_string`
pub const ENV_PREFIX: &str = "SQLSOURCE";

/// Executor configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub connection_string: String,
}

impl ExecutorConfig {
    /// Load configuration with priority: ENV > config file.
    ///
    /// An explicit `path` must exist; otherwise `./sqlsource.toml` is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
