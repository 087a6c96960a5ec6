use std::sync::Arc;

use super::error::{DataSourceError, Result};
use super::record::DataRecord;
use super::value::Value;

/// Row of a live cursor.
///
/// Borrowed from [`crate::executor::Rows`], so it cannot outlive the
/// enumeration that produced it. Duplicate column names are kept as returned
/// by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl RowView {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn out_of_range(&self, ordinal: usize) -> DataSourceError {
        DataSourceError::OrdinalOutOfRange {
            ordinal,
            count: self.field_count(),
        }
    }
}

impl DataRecord for RowView {
    fn field_count(&self) -> usize {
        self.values.len()
    }

    fn get_name(&self, ordinal: usize) -> Result<&str> {
        self.columns
            .get(ordinal)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_range(ordinal))
    }

    fn get_value(&self, ordinal: usize) -> Result<&Value> {
        self.values.get(ordinal).ok_or_else(|| self.out_of_range(ordinal))
    }

    fn get_value_by_name(&self, name: &str) -> Result<&Value> {
        self.get_ordinal(name).and_then(|ordinal| self.get_value(ordinal))
    }

    /// Exact match first, then a case-insensitive match.
    fn get_ordinal(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
            .ok_or_else(|| DataSourceError::FieldNotFound(name.to_string()))
    }

    fn get_bytes(&self, ordinal: usize, field_offset: usize, buffer: &mut [u8]) -> Result<usize> {
        let data = self.get_binary(ordinal)?;
        let available = data.get(field_offset..).unwrap_or_default();
        let count = available.len().min(buffer.len());
        buffer[..count].copy_from_slice(&available[..count]);
        Ok(count)
    }

    fn get_chars(&self, ordinal: usize, field_offset: usize, buffer: &mut [char]) -> Result<usize> {
        let mut count = 0;
        match self.get_value(ordinal)? {
            Value::Text(text) => {
                for (slot, c) in buffer.iter_mut().zip(text.chars().skip(field_offset)) {
                    *slot = c;
                    count += 1;
                }
            }
            Value::Char(c) if field_offset == 0 && !buffer.is_empty() => {
                buffer[0] = *c;
                count = 1;
            }
            Value::Char(_) => {}
            other => {
                return Err(DataSourceError::TypeMismatch {
                    expected: "Text",
                    found: other.type_name(),
                });
            }
        }
        Ok(count)
    }
}
