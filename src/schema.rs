//! Attribute schemas
//!
//! Each resource and data source declares a fixed table of typed attributes.
//! The tables are static so controllers and the CLI can share them freely.

use serde_json::Value;
use std::time::Duration;

/// Primitive attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    String,
    Int,
    Bool,
}

impl AttrType {
    /// The value an unset attribute reads as
    pub fn zero(self) -> Value {
        match self {
            AttrType::String => Value::String(String::new()),
            AttrType::Int => Value::from(0),
            AttrType::Bool => Value::Bool(false),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Int => "int",
            AttrType::Bool => "bool",
        }
    }

    /// Parse a command-line literal into a value of this type
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            AttrType::String => Some(Value::String(raw.to_string())),
            AttrType::Int => raw.trim().parse::<i64>().ok().map(Value::from),
            AttrType::Bool => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(Value::Bool(true)),
                "false" | "no" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }

    /// Coerce a JSON value from the API into this type.
    ///
    /// Returns `None` when the value cannot be represented without loss.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (AttrType::String, Value::String(_)) => Some(value.clone()),
            (AttrType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (AttrType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (AttrType::Int, Value::Number(n)) => n.as_i64().map(Value::from),
            (AttrType::Int, Value::String(s)) => s.parse::<i64>().ok().map(Value::from),
            (AttrType::Bool, Value::Bool(_)) => Some(value.clone()),
            (AttrType::Bool, Value::String(s)) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// How an attribute participates in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMode {
    Required,
    Optional,
    /// Set by the operator or filled in from the API
    OptionalComputed,
    Computed,
}

impl AttrMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AttrMode::Required => "required",
            AttrMode::Optional => "optional",
            AttrMode::OptionalComputed => "optional, computed",
            AttrMode::Computed => "computed",
        }
    }
}

/// One named attribute
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub name: &'static str,
    pub ty: AttrType,
    pub mode: AttrMode,
}

impl Attribute {
    pub const fn required(name: &'static str, ty: AttrType) -> Self {
        Self { name, ty, mode: AttrMode::Required }
    }

    pub const fn optional(name: &'static str, ty: AttrType) -> Self {
        Self { name, ty, mode: AttrMode::Optional }
    }

    pub const fn optional_computed(name: &'static str, ty: AttrType) -> Self {
        Self { name, ty, mode: AttrMode::OptionalComputed }
    }

    pub const fn computed(name: &'static str, ty: AttrType) -> Self {
        Self { name, ty, mode: AttrMode::Computed }
    }

    /// Whether an operator may supply this attribute
    pub fn is_configurable(&self) -> bool {
        !matches!(self.mode, AttrMode::Computed)
    }
}

/// Default operation deadlines for a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    pub const fn new(create: Duration, update: Duration, delete: Duration) -> Self {
        Self { create, update, delete }
    }

    /// Override every deadline with one value
    pub const fn all(timeout: Duration) -> Self {
        Self::new(timeout, timeout, timeout)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        let twenty_minutes = Duration::from_secs(20 * 60);
        Self::new(twenty_minutes, twenty_minutes, twenty_minutes)
    }
}

/// Attribute table for one resource or data source type
#[derive(Debug)]
pub struct Schema {
    pub type_name: &'static str,
    pub attributes: &'static [Attribute],
    pub timeouts: Timeouts,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| matches!(a.mode, AttrMode::Required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_values() {
        assert_eq!(AttrType::String.zero(), json!(""));
        assert_eq!(AttrType::Int.zero(), json!(0));
        assert_eq!(AttrType::Bool.zero(), json!(false));
    }

    #[test]
    fn test_parse_cli_literals() {
        assert_eq!(AttrType::Int.parse("50"), Some(json!(50)));
        assert_eq!(AttrType::Int.parse("fifty"), None);
        assert_eq!(AttrType::Bool.parse("TRUE"), Some(json!(true)));
        assert_eq!(AttrType::Bool.parse("maybe"), None);
        assert_eq!(AttrType::String.parse("C5"), Some(json!("C5")));
    }

    #[test]
    fn test_coerce_api_values() {
        assert_eq!(AttrType::String.coerce(&json!(8589934592_i64)), Some(json!("8589934592")));
        assert_eq!(AttrType::Int.coerce(&json!("8")), Some(json!(8)));
        assert_eq!(AttrType::Int.coerce(&json!(1.5)), None);
        assert_eq!(AttrType::Bool.coerce(&json!("true")), Some(json!(true)));
        assert_eq!(AttrType::Bool.coerce(&Value::Null), Some(Value::Null));
        assert_eq!(AttrType::Bool.coerce(&json!({"a": 1})), None);
    }
}
