use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::error::{DataSourceError, Result};

/// A single field value as read from, or bound to, a command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// The database null sentinel
    #[default]
    Null,
    Boolean(bool),
    Byte(u8),
    Char(char),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
    Double(f64),
    Float(f32),
    Guid(Uuid),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Text(String),
    Binary(Vec<u8>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::Double(_) => "double",
            Self::Float(_) => "float",
            Self::Guid(_) => "guid",
            Self::SmallInt(_) => "smallint",
            Self::Integer(_) => "integer",
            Self::BigInt(_) => "bigint",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload of any integer-valued variant.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(b) => Some(*b as i64),
            Self::SmallInt(i) => Some(*i as i64),
            Self::Integer(i) => Some(*i as i64),
            Self::BigInt(i) => Some(*i),
            _ => None,
        }
    }

    fn cast_error(&self, target: &'static str) -> DataSourceError {
        DataSourceError::InvalidCast {
            target,
            found: format!("{} value '{self}'", self.type_name()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Byte(b) => write!(f, "{b}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::DateTime(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Double(r) => write!(f, "{r}"),
            Self::Float(r) => write!(f, "{r}"),
            Self::Guid(u) => write!(f, "{u}"),
            Self::SmallInt(i) => write!(f, "{i}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::BigInt(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Binary(b) => write!(f, "\\x{}", hex::encode(b)),
        }
    }
}

macro_rules! impl_from_payload {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_payload! {
    bool => Boolean,
    u8 => Byte,
    char => Char,
    NaiveDateTime => DateTime,
    Decimal => Decimal,
    f64 => Double,
    f32 => Float,
    Uuid => Guid,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    String => Text,
    Vec<u8> => Binary,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Checked conversion out of a [`Value`], used where the driver is allowed to
/// coerce (scalar results, default-valued accessors).
///
/// The strict typed getters on records do not go through this trait.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! impl_from_value_integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    value
                        .as_i64()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| value.cast_error(stringify!($ty)))
                }
            }
        )*
    };
}

impl_from_value_integer!(u8, i16, i32, i64);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            ref v => match v.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(v.cast_error("bool")),
            },
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Double(d) => Ok(d),
            Value::Float(f) => Ok(Self::from(f)),
            ref v => v
                .as_i64()
                .map(|i| i as Self)
                .ok_or_else(|| v.cast_error("f64")),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            v => Err(v.cast_error("f32")),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Text(ref s) => Self::from_str(s.trim()).map_err(|_| value.cast_error("decimal")),
            ref v => v
                .as_i64()
                .map(Self::from)
                .ok_or_else(|| v.cast_error("decimal")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(t) => Ok(t),
            Value::Text(ref s) => parse_datetime(s).ok_or_else(|| value.cast_error("datetime")),
            v => Err(v.cast_error("datetime")),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Guid(u) => Ok(u),
            Value::Text(ref s) => Self::parse_str(s.trim()).map_err(|_| value.cast_error("guid")),
            v => Err(v.cast_error("guid")),
        }
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(c) => Ok(c),
            Value::Text(ref s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(value.cast_error("char")),
                }
            }
            v => Err(v.cast_error("char")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Char(c) => Ok(c.to_string()),
            v => Err(v.cast_error("string")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Binary(b) => Ok(b),
            v => Err(v.cast_error("binary")),
        }
    }
}

/// Parses the text forms SQL engines commonly hand back for date/time values.
#[must_use]
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Binary(vec![0xde, 0xad]).to_string(), "\\xdead");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
    }

    #[test]
    fn test_integer_conversion_checks_range() {
        assert_eq!(i32::from_value(Value::BigInt(42)).unwrap(), 42);
        assert_eq!(i64::from_value(Value::SmallInt(-3)).unwrap(), -3);
        assert!(matches!(
            i16::from_value(Value::BigInt(i64::from(i16::MAX) + 1)),
            Err(DataSourceError::InvalidCast { target: "i16", .. })
        ));
        assert!(i32::from_value(Value::Text("42".to_string())).is_err());
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Integer(7)).unwrap(), Some(7));
        assert!(i32::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_text_parsing_conversions() {
        let dt = NaiveDateTime::from_value(Value::Text("2024-03-01 10:20:30".to_string())).unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 10:20:30");

        let date_only = NaiveDateTime::from_value(Value::Text("2024-03-01".to_string())).unwrap();
        assert_eq!(date_only.to_string(), "2024-03-01 00:00:00");

        let id = Uuid::new_v4();
        assert_eq!(Uuid::from_value(Value::Text(id.to_string())).unwrap(), id);

        assert_eq!(
            Decimal::from_value(Value::Text("12.50".to_string())).unwrap(),
            Decimal::new(1250, 2)
        );
        assert_eq!(char::from_value(Value::Text("x".to_string())).unwrap(), 'x');
        assert!(char::from_value(Value::Text("xy".to_string())).is_err());
    }

    #[test]
    fn test_bool_from_integer_flag() {
        assert!(bool::from_value(Value::BigInt(1)).unwrap());
        assert!(!bool::from_value(Value::Integer(0)).unwrap());
        assert!(bool::from_value(Value::BigInt(2)).is_err());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".to_string()));
    }
}
