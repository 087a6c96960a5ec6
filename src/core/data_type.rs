use serde::{Deserialize, Serialize};
use super::error::{DataSourceError, Result};
use super::value::Value;

/// Semantic scalar types that can be registered as output parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScalarType {
    SmallInt,
    Integer,
    BigInt,
    Binary,
    Boolean,
    Text,
    DateTime,
    Decimal,
    Double,
    Guid,
}

/// Provider-specific parameter storage type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProviderType {
    SmallInt,
    Int,
    BigInt,
    Binary,
    Bit,
    VarChar,
    Date,
    Decimal,
    Float,
    UniqueIdentifier,
}

impl ScalarType {
    /// Semantic type of a value; `Lookup` for values outside the closed set
    /// (null, byte, char, single precision float).
    pub fn of(value: &Value) -> Result<Self> {
        match value {
            Value::SmallInt(_) => Ok(Self::SmallInt),
            Value::Integer(_) => Ok(Self::Integer),
            Value::BigInt(_) => Ok(Self::BigInt),
            Value::Binary(_) => Ok(Self::Binary),
            Value::Boolean(_) => Ok(Self::Boolean),
            Value::Text(_) => Ok(Self::Text),
            Value::DateTime(_) => Ok(Self::DateTime),
            Value::Decimal(_) => Ok(Self::Decimal),
            Value::Double(_) => Ok(Self::Double),
            Value::Guid(_) => Ok(Self::Guid),
            Value::Null | Value::Byte(_) | Value::Char(_) | Value::Float(_) => {
                Err(DataSourceError::Lookup(value.type_name()))
            }
        }
    }

    #[must_use]
    pub const fn provider_type(self) -> ProviderType {
        match self {
            Self::SmallInt => ProviderType::SmallInt,
            Self::Integer => ProviderType::Int,
            Self::BigInt => ProviderType::BigInt,
            Self::Binary => ProviderType::Binary,
            Self::Boolean => ProviderType::Bit,
            Self::Text => ProviderType::VarChar,
            Self::DateTime => ProviderType::Date,
            Self::Decimal => ProviderType::Decimal,
            Self::Double => ProviderType::Float,
            Self::Guid => ProviderType::UniqueIdentifier,
        }
    }
}

impl ProviderType {
    /// Provider type tag used when registering `value` as an output parameter.
    pub fn for_value(value: &Value) -> Result<Self> {
        ScalarType::of(value).map(ScalarType::provider_type)
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SmallInt => "smallint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Binary => "binary",
            Self::Bit => "bit",
            Self::VarChar => "varchar",
            Self::Date => "date",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::UniqueIdentifier => "uniqueidentifier",
        };
        write!(f, "{name}")
    }
}
