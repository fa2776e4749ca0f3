use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{OpError, Result};

/// A single named operator argument as the enclosing framework supplies it.
///
/// Flags commonly arrive as integers (`1` / `0`) rather than booleans, so
/// both are accepted wherever a flag is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ArgValue {
    fn kind(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "string",
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

/// Declarative, name-keyed operator arguments.
///
/// Serializes as a flat JSON object, e.g. `{"broadcast": 1, "trans_b": true}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorArgs {
    args: BTreeMap<String, ArgValue>,
}

impl OperatorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument. Returns self for builder-style usage.
    pub fn with(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an argument, replacing any previous value with the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<ArgValue>) {
        self.args.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }

    /// Argument names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Read a flag, falling back to `default` when it is absent.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the value is neither a bool nor an int.
    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool> {
        match self.args.get(name) {
            None => Ok(default),
            Some(ArgValue::Bool(b)) => Ok(*b),
            Some(ArgValue::Int(i)) => Ok(*i != 0),
            Some(other) => Err(OpError::InvalidArgument {
                name: name.to_string(),
                expected: "bool or int".to_string(),
                got: other.kind().to_string(),
            }),
        }
    }

    /// Parse arguments from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bool_accepts_int_and_bool() {
        let args = OperatorArgs::new()
            .with("broadcast", 1i64)
            .with("trans_a", false)
            .with("trans_b", 0i64);
        assert!(args.get_bool("broadcast", false).unwrap());
        assert!(!args.get_bool("trans_a", true).unwrap());
        assert!(!args.get_bool("trans_b", true).unwrap());
        assert!(args.get_bool("missing", true).unwrap());
    }

    #[test]
    fn test_get_bool_rejects_other_kinds() {
        let args = OperatorArgs::new().with("broadcast", "yes").with("trans_a", 1.0);
        assert!(matches!(
            args.get_bool("broadcast", false),
            Err(OpError::InvalidArgument { .. })
        ));
        assert!(args.get_bool("trans_a", false).is_err());
    }

    #[test]
    fn test_from_json() {
        let args = OperatorArgs::from_json(r#"{"broadcast": 1, "trans_b": true, "name": "bmm"}"#).unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args.get("broadcast"), Some(&ArgValue::Int(1)));
        assert_eq!(args.get("trans_b"), Some(&ArgValue::Bool(true)));
        assert_eq!(args.get("name"), Some(&ArgValue::Str("bmm".to_string())));
        assert_eq!(args.names().collect::<Vec<_>>(), vec!["broadcast", "name", "trans_b"]);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(OperatorArgs::from_json("[1, 2]"), Err(OpError::Json(_))));
    }
}
