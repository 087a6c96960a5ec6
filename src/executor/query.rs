/// Command execution surface
///
/// Every operation validates its input before touching the driver, then
/// runs against a connection opened for that call alone and released on
/// every exit path.

use log::debug;
use std::collections::HashMap;

use super::connection::with_connection;
use super::rows::Rows;
use crate::core::{
    CommandKind, DataSourceError, DetachedRecord, Direction, FromValue, Parameter, Params,
    ProviderType, Result, Value,
};
use crate::driver::{Command, Driver};

#[cfg(feature = "sqlite")]
use crate::driver::SqliteDriver;

/// Executes parameterized SQL against connections opened from one
/// connection string.
///
/// Holds no connection between calls, so a shared executor can be used
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct QueryExecutor<D> {
    driver: D,
    connection_string: String,
}

#[cfg(feature = "sqlite")]
impl QueryExecutor<SqliteDriver> {
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        Self::with_driver(SqliteDriver, connection_string)
    }

    pub fn from_config(config: &crate::config::ExecutorConfig) -> Result<Self> {
        Self::new(config.connection_string.clone())
    }
}

impl<D: Driver> QueryExecutor<D> {
    pub fn with_driver(driver: D, connection_string: impl Into<String>) -> Result<Self> {
        let connection_string = connection_string.into();
        if connection_string.trim().is_empty() {
            return Err(DataSourceError::validation(
                "connection string must not be empty or whitespace",
            ));
        }
        Ok(Self {
            driver,
            connection_string,
        })
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Streams the result set row by row through `consume`.
    ///
    /// The command executes when this is called; the connection stays open
    /// while `consume` runs and is released when it returns, whether it
    /// drained the rows, stopped early or failed.
    pub fn stream<F, R>(
        &self,
        sql: &str,
        parameters: Option<&Params>,
        kind: CommandKind,
        consume: F,
    ) -> Result<R>
    where
        F: FnOnce(&mut Rows<'_>) -> Result<R>,
    {
        const OPERATION: &str = "stream";
        validate_sql(sql)?;

        self.run(OPERATION, sql, kind, input_parameters(parameters), |command| {
            let cursor = command.query().map_err(DataSourceError::provider(OPERATION))?;
            let mut rows = Rows::new(cursor, OPERATION);
            let result = consume(&mut rows);
            debug!("{OPERATION}: {} rows read", rows.fetched());
            result
        })
    }

    /// First column of the first row; `T::default()` when there are no rows.
    pub fn execute_scalar<T>(&self, sql: &str, parameters: Option<&Params>) -> Result<T>
    where
        T: FromValue + Default,
    {
        const OPERATION: &str = "execute_scalar";
        validate_sql(sql)?;

        let first = self.run(OPERATION, sql, CommandKind::Text, input_parameters(parameters), |command| {
            let mut cursor = command.query().map_err(DataSourceError::provider(OPERATION))?;
            let row = cursor.advance().map_err(DataSourceError::provider(OPERATION))?;
            Ok(row.and_then(|values| values.into_iter().next()))
        })?;

        first.map_or_else(|| Ok(T::default()), T::from_value)
    }

    /// Rows affected by INSERT/UPDATE/DELETE, or -1 for any other statement.
    pub fn execute_non_query(
        &self,
        sql: &str,
        parameters: Option<&Params>,
        kind: CommandKind,
    ) -> Result<i64> {
        const OPERATION: &str = "execute_non_query";
        validate_sql(sql)?;

        self.run(OPERATION, sql, kind, input_parameters(parameters), |command| {
            command.execute().map_err(DataSourceError::provider(OPERATION))
        })
    }

    /// Reads the whole result set into detached records, then writes the
    /// returned value of every entry of `outputs` back into it.
    ///
    /// Each output is registered as a return-value parameter whose provider
    /// type comes from the type of its current value. The set of names in
    /// `outputs` is left unchanged; only values are replaced.
    pub fn execute_buffered(
        &self,
        sql: &str,
        parameters: Option<&Params>,
        kind: CommandKind,
        outputs: &mut HashMap<String, Value>,
    ) -> Result<Vec<DetachedRecord>> {
        const OPERATION: &str = "execute_buffered";
        validate_sql(sql)?;

        let mut bound: Vec<Parameter> = input_parameters(parameters).collect();
        for (name, value) in outputs.iter() {
            if parameters.is_some_and(|p| p.contains(name)) {
                return Err(DataSourceError::validation(format!(
                    "output parameter '{name}' is also supplied as an input parameter"
                )));
            }
            let provider_type = ProviderType::for_value(value)?;
            bound.push(Parameter::output(name.clone(), provider_type, Direction::ReturnValue));
        }

        self.run(OPERATION, sql, kind, bound, |command| {
            let records = {
                let cursor = command.query().map_err(DataSourceError::provider(OPERATION))?;
                let mut rows = Rows::new(cursor, OPERATION);
                let mut records = Vec::new();
                while let Some(row) = rows.next()? {
                    records.push(DetachedRecord::from_record(row)?);
                }
                records
            };
            debug!("{OPERATION}: {} rows buffered", records.len());

            // Names are snapshotted before any value is replaced.
            let returned = command.parameters();
            let names: Vec<String> = outputs.keys().cloned().collect();
            for name in names {
                let value = returned
                    .iter()
                    .find(|p| p.name == name)
                    .map_or(Value::Null, |p| p.value.clone());
                outputs.insert(name, value);
            }
            Ok(records)
        })
    }

    /// Executes with caller-built parameters and returns those the engine
    /// writes back (output, input-output and return value).
    pub fn execute_with_parameters(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        kind: CommandKind,
    ) -> Result<Vec<Parameter>> {
        const OPERATION: &str = "execute_with_parameters";
        validate_sql(sql)?;

        self.run(OPERATION, sql, kind, parameters, |command| {
            command.execute().map_err(DataSourceError::provider(OPERATION))?;
            Ok(command
                .parameters()
                .iter()
                .filter(|p| p.direction.is_returned())
                .cloned()
                .collect())
        })
    }

    /// Opens a connection, prepares and binds one command, runs `body` on it
    /// and releases both before returning.
    fn run<I, F, R>(
        &self,
        operation: &'static str,
        sql: &str,
        kind: CommandKind,
        parameters: I,
        body: F,
    ) -> Result<R>
    where
        I: IntoIterator<Item = Parameter>,
        F: FnOnce(&mut dyn Command) -> Result<R>,
    {
        with_connection(&self.driver, &self.connection_string, operation, |connection| {
            let mut command = connection
                .prepare(sql, kind)
                .map_err(DataSourceError::provider(operation))?;
            for parameter in parameters {
                command
                    .bind(parameter)
                    .map_err(DataSourceError::provider(operation))?;
            }
            debug!("{operation}: executing {kind:?} command");
            body(command.as_mut())
        })
    }
}

fn validate_sql(sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Err(DataSourceError::validation("sql must not be empty or whitespace"));
    }
    Ok(())
}

fn input_parameters(parameters: Option<&Params>) -> impl Iterator<Item = Parameter> + '_ {
    parameters.into_iter().flat_map(|p| p.to_parameters())
}
