use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::data_type::ProviderType;
use super::error::DataSourceError;
use super::value::Value;

/// Whether the command text is a statement or the name of a stored procedure.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
}

impl FromStr for CommandKind {
    type Err = DataSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "storedprocedure" | "stored_procedure" | "procedure" => Ok(Self::StoredProcedure),
            other => Err(DataSourceError::validation(format!(
                "unrecognized command kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl Direction {
    /// True for directions the engine writes back after execution.
    #[must_use]
    pub const fn is_returned(self) -> bool {
        !matches!(self, Self::Input)
    }
}

/// Named input values for a command
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub values: HashMap<String, Value>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Input parameters with the provider type left for the driver to infer.
    pub(crate) fn to_parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.values
            .iter()
            .map(|(name, value)| Parameter::input(name.clone(), value.clone()))
    }
}

/// A parameter bound to a command with an explicit direction.
///
/// `provider_type` is `None` when the driver should infer it from the value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub provider_type: Option<ProviderType>,
    pub direction: Direction,
    pub value: Value,
}

impl Parameter {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        provider_type: ProviderType,
        direction: Direction,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_type: Some(provider_type),
            direction,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn input(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            provider_type: None,
            direction: Direction::Input,
            value: value.into(),
        }
    }

    /// Parameter the engine fills in; starts out as null.
    #[must_use]
    pub fn output(name: impl Into<String>, provider_type: ProviderType, direction: Direction) -> Self {
        Self {
            name: name.into(),
            provider_type: Some(provider_type),
            direction,
            value: Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind_parse() {
        assert_eq!("Text".parse::<CommandKind>().unwrap(), CommandKind::Text);
        assert_eq!(
            "StoredProcedure".parse::<CommandKind>().unwrap(),
            CommandKind::StoredProcedure
        );
        assert!(matches!(
            "TableDirect".parse::<CommandKind>(),
            Err(DataSourceError::Validation(_))
        ));
        assert_eq!(CommandKind::default(), CommandKind::Text);
    }

    #[test]
    fn test_returned_directions() {
        assert!(!Direction::Input.is_returned());
        assert!(Direction::Output.is_returned());
        assert!(Direction::InputOutput.is_returned());
        assert!(Direction::ReturnValue.is_returned());
    }

    #[test]
    fn test_params_builder() {
        let params = Params::new().with_value("@id", 7).with_value("@name", "bob");
        assert_eq!(params.len(), 2);
        assert!(params.contains("@id"));
        assert_eq!(params.values["@id"], Value::Integer(7));
        assert!(params.to_parameters().all(|p| p.direction == Direction::Input && p.provider_type.is_none()));
    }
}
