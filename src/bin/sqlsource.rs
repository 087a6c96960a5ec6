use clap::Parser;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use sqlsource::{CommandKind, DataRecord, ExecutorConfig, Params, QueryExecutor, Value};
use std::collections::HashMap;
use std::path::PathBuf;

/// Run one SQL command and print its result
#[derive(Parser, Debug)]
#[command(name = "sqlsource")]
#[command(about = "Execute a SQL command against a SQLite database", long_about = None)]
struct Args {
    /// SQL text, or the procedure name with --procedure
    sql: String,

    /// Connection string (overrides config file and SQLSOURCE_CONNECTION_STRING)
    #[arg(short = 'c', long)]
    connection: Option<String>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named parameter, NAME=VALUE (repeatable)
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,

    /// Treat the SQL text as a stored procedure name
    #[arg(long)]
    procedure: bool,

    /// Report the affected row count instead of reading rows
    #[arg(long)]
    non_query: bool,

    /// Print rows as JSON objects
    #[arg(long)]
    json: bool,
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("parameter '{raw}' must be NAME=VALUE"))?;

    let value = if value.eq_ignore_ascii_case("null") {
        Value::Null
    } else if let Ok(i) = value.parse::<i64>() {
        Value::BigInt(i)
    } else if let Ok(f) = value.parse::<f64>() {
        Value::Double(f)
    } else {
        Value::Text(value.to_string())
    };
    Ok((name.to_string(), value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let connection_string = match args.connection {
        Some(cs) => cs,
        None => ExecutorConfig::load(args.config.as_deref())?.connection_string,
    };
    let executor = QueryExecutor::new(connection_string)?;

    let mut params = Params::new();
    for raw in &args.params {
        let (name, value) = parse_param(raw)?;
        params = params.with_value(&name, value);
    }
    let params = (!params.is_empty()).then_some(&params);
    let kind = if args.procedure {
        CommandKind::StoredProcedure
    } else {
        CommandKind::Text
    };

    if args.non_query {
        let affected = executor.execute_non_query(&args.sql, params, kind)?;
        println!("{affected} rows affected");
        return Ok(());
    }

    if args.json {
        let records = executor.execute_buffered(&args.sql, params, kind, &mut HashMap::new())?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let table = executor.stream(&args.sql, params, kind, |rows| {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(rows.columns().iter().map(Cell::new));

        while let Some(row) = rows.next()? {
            let mut values = vec![Value::Null; row.field_count()];
            row.get_values(&mut values)?;
            table.add_row(values.iter().map(Cell::new));
        }
        Ok(table)
    })?;

    let count = table.row_iter().count();
    println!("{table}\n({count} rows)");
    Ok(())
}
