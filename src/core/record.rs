use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

use super::error::{DataSourceError, Result};
use super::value::{FromValue, Value};

macro_rules! typed_getter {
    ($($(#[$meta:meta])* $name:ident => $variant:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            fn $name(&self, ordinal: usize) -> Result<$ty> {
                match self.get_value(ordinal)? {
                    Value::$variant(v) => Ok(*v),
                    other => Err(type_mismatch(stringify!($variant), other)),
                }
            }
        )*
    };
}

fn type_mismatch(expected: &'static str, found: &Value) -> DataSourceError {
    DataSourceError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

/// Read surface shared by live cursor rows and detached records.
///
/// Typed getters check the stored variant and never coerce; use
/// [`DataRecord::get_value_or_default`] for converting reads.
pub trait DataRecord {
    fn field_count(&self) -> usize;

    fn get_name(&self, ordinal: usize) -> Result<&str>;

    fn get_value(&self, ordinal: usize) -> Result<&Value>;

    fn get_value_by_name(&self, name: &str) -> Result<&Value>;

    /// Ordinal of the named field.
    fn get_ordinal(&self, name: &str) -> Result<usize>;

    /// Copies binary data starting at `field_offset` into `buffer`, returning
    /// the number of bytes copied.
    fn get_bytes(&self, ordinal: usize, field_offset: usize, buffer: &mut [u8]) -> Result<usize>;

    /// Copies characters starting at `field_offset` into `buffer`, returning
    /// the number of characters copied.
    fn get_chars(&self, ordinal: usize, field_offset: usize, buffer: &mut [char]) -> Result<usize>;

    /// Nested result set reader.
    fn get_data(&self, _ordinal: usize) -> Result<Vec<DetachedRecord>> {
        Err(DataSourceError::NotSupported("nested result sets"))
    }

    fn get_field_type(&self, ordinal: usize) -> Result<&'static str> {
        Ok(self.get_value(ordinal)?.type_name())
    }

    fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.get_value(ordinal)?.is_null())
    }

    /// Copies up to `buffer.len()` values in ordinal order; returns the count copied.
    fn get_values(&self, buffer: &mut [Value]) -> Result<usize> {
        let count = buffer.len().min(self.field_count());
        for (ordinal, slot) in buffer.iter_mut().take(count).enumerate() {
            slot.clone_from(self.get_value(ordinal)?);
        }
        Ok(count)
    }

    typed_getter! {
        get_boolean => Boolean: bool,
        get_byte => Byte: u8,
        get_char => Char: char,
        get_date_time => DateTime: NaiveDateTime,
        get_decimal => Decimal: Decimal,
        get_double => Double: f64,
        get_float => Float: f32,
        get_guid => Guid: Uuid,
        get_int16 => SmallInt: i16,
        get_int32 => Integer: i32,
        get_int64 => BigInt: i64,
    }

    fn get_string(&self, ordinal: usize) -> Result<&str> {
        match self.get_value(ordinal)? {
            Value::Text(s) => Ok(s),
            other => Err(type_mismatch("Text", other)),
        }
    }

    fn get_binary(&self, ordinal: usize) -> Result<&[u8]> {
        match self.get_value(ordinal)? {
            Value::Binary(b) => Ok(b),
            other => Err(type_mismatch("Binary", other)),
        }
    }

    /// Converting read by name; null yields `T::default()`.
    fn get_value_or_default<T>(&self, name: &str) -> Result<T>
    where
        Self: Sized,
        T: FromValue + Default,
    {
        match self.get_value_by_name(name)? {
            Value::Null => Ok(T::default()),
            value => T::from_value(value.clone()),
        }
    }

    /// Decodes a text field into an enumeration through its `FromStr`
    /// name resolution; null yields `E::default()`.
    fn get_enum_or_default<E>(&self, name: &str) -> Result<E>
    where
        Self: Sized,
        E: FromStr + Default,
    {
        match self.get_value_by_name(name)? {
            Value::Null => Ok(E::default()),
            Value::Text(text) => E::from_str(text).map_err(|_| DataSourceError::InvalidCast {
                target: std::any::type_name::<E>(),
                found: format!("text value '{text}'"),
            }),
            other => Err(type_mismatch("Text", other)),
        }
    }
}

/// Immutable snapshot of one row, independent of any connection.
///
/// Field names are unique: when the source row repeats a name, only the first
/// occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetachedRecord {
    fields: Vec<(String, Value)>,
}

impl DetachedRecord {
    /// Copies every field of `record` in ordinal order.
    pub fn from_record<R: DataRecord + ?Sized>(record: &R) -> Result<Self> {
        let mut fields = Vec::with_capacity(record.field_count());
        for ordinal in 0..record.field_count() {
            fields.push((
                record.get_name(ordinal)?.to_string(),
                record.get_value(ordinal)?.clone(),
            ));
        }
        Ok(Self::from_fields(fields))
    }

    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut seen = HashSet::new();
        let fields = fields
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect();
        Self { fields }
    }

    /// Field lookup by name, `None` when absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    fn field(&self, ordinal: usize) -> Result<&(String, Value)> {
        self.fields
            .get(ordinal)
            .ok_or(DataSourceError::OrdinalOutOfRange {
                ordinal,
                count: self.fields.len(),
            })
    }
}

impl DataRecord for DetachedRecord {
    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn get_name(&self, ordinal: usize) -> Result<&str> {
        self.field(ordinal).map(|(n, _)| n.as_str())
    }

    fn get_value(&self, ordinal: usize) -> Result<&Value> {
        self.field(ordinal).map(|(_, v)| v)
    }

    fn get_value_by_name(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| DataSourceError::FieldNotFound(name.to_string()))
    }

    fn get_ordinal(&self, _name: &str) -> Result<usize> {
        Err(DataSourceError::NotSupported("ordinal lookup on a detached record"))
    }

    fn get_bytes(&self, _ordinal: usize, _field_offset: usize, _buffer: &mut [u8]) -> Result<usize> {
        Err(DataSourceError::NotSupported("chunked byte reads on a detached record"))
    }

    fn get_chars(&self, _ordinal: usize, _field_offset: usize, _buffer: &mut [char]) -> Result<usize> {
        Err(DataSourceError::NotSupported("chunked character reads on a detached record"))
    }
}

impl Serialize for DetachedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, &PlainValue(value))?;
        }
        map.end()
    }
}

/// Serializes a value as its natural JSON shape rather than the tagged enum form.
struct PlainValue<'a>(&'a Value);

impl Serialize for PlainValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Byte(b) => serializer.serialize_u8(*b),
            Value::SmallInt(i) => serializer.serialize_i16(*i),
            Value::Integer(i) => serializer.serialize_i32(*i),
            Value::BigInt(i) => serializer.serialize_i64(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Float(f) => serializer.serialize_f32(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Binary(b) => serializer.serialize_str(&hex::encode(b)),
            other => serializer.collect_str(other),
        }
    }
}
