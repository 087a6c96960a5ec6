// Scripted in-memory driver: serves canned rows, writes canned output values
// once a result set is exhausted, and records every connection and command.
#![allow(dead_code)]

use sqlsource::core::{ProviderError, ProviderResult};
use sqlsource::{Command, CommandKind, Connection, Cursor, Driver, Parameter, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub affected: i64,
    /// Values the engine assigns to non-input parameters, by name
    pub returned: HashMap<String, Value>,
    pub fail_connect: bool,
    /// `close` reports a failure after counting the close
    pub fail_close: bool,
    /// `advance` fails once this many rows have been served
    pub fail_after_rows: Option<usize>,
}

impl Script {
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
            ..Self::default()
        }
    }

    pub fn numbers(count: i32) -> Self {
        Self::rows(&["n"], (1..=count).map(|n| vec![Value::Integer(n)]).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub kind: CommandKind,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub opened: usize,
    pub closed: usize,
    pub dropped: usize,
    pub rows_served: usize,
    pub commands: Vec<Recorded>,
}

impl Ledger {
    /// Connections opened but not yet dropped.
    pub const fn live(&self) -> usize {
        self.opened - self.dropped
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    script: Script,
    ledger: Arc<Mutex<Ledger>>,
}

impl ScriptedDriver {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            ledger: Arc::default(),
        }
    }

    pub fn ledger(&self) -> Ledger {
        self.ledger.lock().unwrap().clone()
    }
}

impl Driver for ScriptedDriver {
    fn connect(&self, _connection_string: &str) -> ProviderResult<Box<dyn Connection>> {
        if self.script.fail_connect {
            return Err(ProviderError::Engine("network-related error: server not found".to_string()));
        }
        self.ledger.lock().unwrap().opened += 1;
        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            ledger: Arc::clone(&self.ledger),
        }))
    }
}

struct ScriptedConnection {
    script: Script,
    ledger: Arc<Mutex<Ledger>>,
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.ledger.lock().unwrap().dropped += 1;
    }
}

impl Connection for ScriptedConnection {
    fn prepare<'c>(&'c self, sql: &str, kind: CommandKind) -> ProviderResult<Box<dyn Command + 'c>> {
        Ok(Box::new(ScriptedCommand {
            connection: self,
            sql: sql.to_string(),
            kind,
            parameters: Vec::new(),
        }))
    }

    fn close(self: Box<Self>) -> ProviderResult<()> {
        self.ledger.lock().unwrap().closed += 1;
        if self.script.fail_close {
            return Err(ProviderError::Engine("connection already broken".to_string()));
        }
        Ok(())
    }
}

struct ScriptedCommand<'c> {
    connection: &'c ScriptedConnection,
    sql: String,
    kind: CommandKind,
    parameters: Vec<Parameter>,
}

impl ScriptedCommand<'_> {
    fn write_outputs(&mut self) {
        let returned = &self.connection.script.returned;
        for parameter in &mut self.parameters {
            if parameter.direction.is_returned() {
                if let Some(value) = returned.get(&parameter.name) {
                    parameter.value = value.clone();
                }
            }
        }
    }
}

impl Drop for ScriptedCommand<'_> {
    fn drop(&mut self) {
        self.connection.ledger.lock().unwrap().commands.push(Recorded {
            sql: self.sql.clone(),
            kind: self.kind,
            parameters: self.parameters.clone(),
        });
    }
}

impl Command for ScriptedCommand<'_> {
    fn bind(&mut self, parameter: Parameter) -> ProviderResult<()> {
        self.parameters.push(parameter);
        Ok(())
    }

    fn execute(&mut self) -> ProviderResult<i64> {
        self.write_outputs();
        Ok(self.connection.script.affected)
    }

    fn query<'s>(&'s mut self) -> ProviderResult<Box<dyn Cursor + 's>> {
        Ok(Box::new(ScriptedCursor {
            command: self,
            position: 0,
        }))
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

struct ScriptedCursor<'s, 'c> {
    command: &'s mut ScriptedCommand<'c>,
    position: usize,
}

impl Cursor for ScriptedCursor<'_, '_> {
    fn columns(&self) -> &[String] {
        &self.command.connection.script.columns
    }

    fn advance(&mut self) -> ProviderResult<Option<Vec<Value>>> {
        let script = &self.command.connection.script;
        if script.fail_after_rows == Some(self.position) {
            return Err(ProviderError::Engine("transport-level error: connection reset".to_string()));
        }

        match script.rows.get(self.position) {
            Some(row) => {
                self.position += 1;
                self.command.connection.ledger.lock().unwrap().rows_served += 1;
                Ok(Some(row.clone()))
            }
            None => {
                self.command.write_outputs();
                Ok(None)
            }
        }
    }
}
