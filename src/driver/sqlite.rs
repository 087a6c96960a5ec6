/// SQLite backend on top of rusqlite
///
/// SQLite has no stored procedures and no output parameters: procedure
/// commands are rejected, output and return-value parameters read back as
/// NULL and input-output parameters keep their bound value.

use log::debug;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use super::{Command, Connection, Cursor, Driver};
use crate::core::value::parse_datetime;
use crate::core::{CommandKind, Direction, Parameter, ProviderError, ProviderResult, Value};

const PARAMETER_PREFIXES: [char; 3] = ['@', ':', '$'];

/// Connection strings are SQLite paths, `:memory:` or `file:` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn connect(&self, connection_string: &str) -> ProviderResult<Box<dyn Connection>> {
        let path = connection_string.trim();
        let inner = rusqlite::Connection::open(path)?;
        debug!("sqlite: opened '{path}'");
        Ok(Box::new(SqliteConnection { inner }))
    }
}

struct SqliteConnection {
    inner: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn prepare<'c>(&'c self, sql: &str, kind: CommandKind) -> ProviderResult<Box<dyn Command + 'c>> {
        if kind == CommandKind::StoredProcedure {
            return Err(ProviderError::Unsupported(format!(
                "stored procedure '{sql}': SQLite has no stored procedures"
            )));
        }

        let statement = self.inner.prepare(sql)?;
        // A WITH prefix may lead into a SELECT; sqlite3_stmt_readonly settles it.
        let modifies_data = is_data_modification(sql) && !statement.readonly();
        Ok(Box::new(SqliteCommand {
            connection: &self.inner,
            statement,
            modifies_data,
            parameters: Vec::new(),
        }))
    }

    fn close(self: Box<Self>) -> ProviderResult<()> {
        self.inner.close().map_err(|(_, e)| ProviderError::from(e))
    }
}

struct SqliteCommand<'c> {
    connection: &'c rusqlite::Connection,
    statement: rusqlite::Statement<'c>,
    modifies_data: bool,
    parameters: Vec<Parameter>,
}

impl SqliteCommand<'_> {
    /// Placeholder index for `name`, trying each SQLite prefix when the
    /// name carries none.
    fn placeholder_index(&self, name: &str) -> ProviderResult<usize> {
        let found = if name.starts_with(PARAMETER_PREFIXES) {
            self.statement.parameter_index(name)?
        } else {
            let mut found = None;
            for prefix in PARAMETER_PREFIXES {
                found = self.statement.parameter_index(&format!("{prefix}{name}"))?;
                if found.is_some() {
                    break;
                }
            }
            found
        };
        found.ok_or_else(|| ProviderError::Sqlite(rusqlite::Error::InvalidParameterName(name.to_string())))
    }
}

impl Command for SqliteCommand<'_> {
    fn bind(&mut self, mut parameter: Parameter) -> ProviderResult<()> {
        match parameter.direction {
            Direction::Output | Direction::ReturnValue => parameter.value = Value::Null,
            Direction::Input | Direction::InputOutput => {
                let index = self.placeholder_index(&parameter.name)?;
                self.statement.raw_bind_parameter(index, to_sql(&parameter.value))?;
            }
        }
        self.parameters.push(parameter);
        Ok(())
    }

    fn execute(&mut self) -> ProviderResult<i64> {
        let before = total_changes(self.connection)?;
        if self.statement.column_count() == 0 {
            self.statement.raw_execute()?;
        } else {
            // Statements producing rows (SELECT, or DML with RETURNING) are drained.
            let mut rows = self.statement.raw_query();
            while rows.next()?.is_some() {}
        }

        if !self.modifies_data {
            return Ok(-1);
        }
        // sqlite3_changes() leaves out rows written by triggers; the
        // connection-wide total does not.
        Ok(total_changes(self.connection)? - before)
    }

    fn query<'s>(&'s mut self) -> ProviderResult<Box<dyn Cursor + 's>> {
        let columns: Vec<String> = self
            .statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let kinds = self
            .statement
            .columns()
            .iter()
            .map(|c| ColumnKind::from_decl_type(c.decl_type()))
            .collect();
        let rows = self.statement.raw_query();
        Ok(Box::new(SqliteCursor { columns, kinds, rows }))
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

struct SqliteCursor<'s> {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    rows: rusqlite::Rows<'s>,
}

impl Cursor for SqliteCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn advance(&mut self) -> ProviderResult<Option<Vec<Value>>> {
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(self.kinds.len());
        for (ordinal, kind) in self.kinds.iter().enumerate() {
            values.push(kind.decode(row.get_ref(ordinal)?)?);
        }
        Ok(Some(values))
    }
}

/// Value decoding chosen from a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    Byte,
    SmallInt,
    Integer,
    BigInt,
    Double,
    Decimal,
    DateTime,
    Guid,
    /// No usable declared type; decode by storage class
    Dynamic,
}

impl ColumnKind {
    fn from_decl_type(decl_type: Option<&str>) -> Self {
        let Some(decl) = decl_type.map(str::to_ascii_uppercase) else {
            return Self::Dynamic;
        };
        let has = |needle: &str| decl.contains(needle);

        if has("BOOL") || decl == "BIT" {
            Self::Boolean
        } else if has("TINYINT") {
            Self::Byte
        } else if has("SMALLINT") {
            Self::SmallInt
        } else if has("BIGINT") {
            Self::BigInt
        } else if has("INT") {
            Self::Integer
        } else if has("REAL") || has("FLOAT") || has("DOUBLE") {
            Self::Double
        } else if has("DECIMAL") || has("NUMERIC") || has("MONEY") {
            Self::Decimal
        } else if has("UNIQUEIDENTIFIER") || has("UUID") || has("GUID") {
            Self::Guid
        } else if has("DATE") || has("TIME") {
            Self::DateTime
        } else {
            Self::Dynamic
        }
    }

    fn decode(self, raw: ValueRef<'_>) -> ProviderResult<Value> {
        let value = match (self, raw) {
            (_, ValueRef::Null) => Value::Null,
            (Self::Boolean, ValueRef::Integer(i)) => Value::Boolean(i != 0),
            (Self::Byte, ValueRef::Integer(i)) => u8::try_from(i).map_or(Value::BigInt(i), Value::Byte),
            (Self::SmallInt, ValueRef::Integer(i)) => {
                i16::try_from(i).map_or(Value::BigInt(i), Value::SmallInt)
            }
            (Self::Integer, ValueRef::Integer(i)) => {
                i32::try_from(i).map_or(Value::BigInt(i), Value::Integer)
            }
            (Self::Double, ValueRef::Integer(i)) => Value::Double(i as f64),
            (Self::Decimal, ValueRef::Integer(i)) => Value::Decimal(Decimal::from(i)),
            (Self::Decimal, ValueRef::Real(f)) => Decimal::try_from(f).map_or(Value::Double(f), Value::Decimal),
            (Self::Decimal, ValueRef::Text(t)) => {
                let text = utf8(t)?;
                Decimal::from_str(text.trim()).map_or_else(|_| Value::Text(text.to_string()), Value::Decimal)
            }
            (Self::DateTime, ValueRef::Text(t)) => {
                let text = utf8(t)?;
                parse_datetime(text).map_or_else(|| Value::Text(text.to_string()), Value::DateTime)
            }
            (Self::Guid, ValueRef::Text(t)) => {
                let text = utf8(t)?;
                Uuid::parse_str(text.trim()).map_or_else(|_| Value::Text(text.to_string()), Value::Guid)
            }
            (Self::Guid, ValueRef::Blob(b)) if b.len() == 16 => {
                Uuid::from_slice(b).map_or_else(|_| Value::Binary(b.to_vec()), Value::Guid)
            }
            (_, ValueRef::Integer(i)) => Value::BigInt(i),
            (_, ValueRef::Real(f)) => Value::Double(f),
            (_, ValueRef::Text(t)) => Value::Text(utf8(t)?.to_string()),
            (_, ValueRef::Blob(b)) => Value::Binary(b.to_vec()),
        };
        Ok(value)
    }
}

fn utf8(bytes: &[u8]) -> ProviderResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| ProviderError::Engine(format!("invalid UTF-8 in text column: {e}")))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Byte(b) => SqlValue::Integer(i64::from(*b)),
        Value::SmallInt(i) => SqlValue::Integer(i64::from(*i)),
        Value::Integer(i) => SqlValue::Integer(i64::from(*i)),
        Value::BigInt(i) => SqlValue::Integer(*i),
        Value::Double(d) => SqlValue::Real(*d),
        Value::Float(f) => SqlValue::Real(f64::from(*f)),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Binary(b) => SqlValue::Blob(b.clone()),
        Value::Char(_) | Value::DateTime(_) | Value::Decimal(_) | Value::Guid(_) => {
            SqlValue::Text(value.to_string())
        }
    }
}

/// Rows inserted, updated or deleted on this connection since it opened,
/// trigger bodies included.
fn total_changes(connection: &rusqlite::Connection) -> ProviderResult<i64> {
    Ok(connection.query_row("SELECT total_changes()", [], |row| row.get(0))?)
}

/// Whether the statement leads with INSERT/UPDATE/DELETE/REPLACE, or with a
/// WITH clause that may front one. Leading comments are skipped.
fn is_data_modification(sql: &str) -> bool {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail).trim_start();
        } else {
            break;
        }
    }

    let keyword: String = rest
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_uppercase();

    matches!(keyword.as_str(), "INSERT" | "UPDATE" | "DELETE" | "REPLACE" | "WITH")
}
