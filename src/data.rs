//! Resource data
//!
//! [`ResourceData`] is the attribute set for one resource instance: the
//! values the operator declared plus whatever the API reported back, the
//! remote identifier, and the operation deadlines. Every access goes through
//! the instance's [`Schema`], so values are always of the declared type.

use crate::error::{ProviderError, ProviderResult};
use crate::schema::{Schema, Timeouts};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: &'static Schema,
    id: Option<String>,
    values: BTreeMap<String, Value>,
    timeouts: Timeouts,
}

impl ResourceData {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            id: None,
            values: BTreeMap::new(),
            timeouts: schema.timeouts,
        }
    }

    /// Build from operator-supplied values, rejecting unknown or computed
    /// attributes and values of the wrong type
    pub fn from_config(
        schema: &'static Schema,
        config: &Map<String, Value>,
    ) -> ProviderResult<Self> {
        let mut data = Self::new(schema);
        for (key, value) in config {
            let Some(attr) = schema.attribute(key) else {
                return Err(ProviderError::validation(format!(
                    "{}: unsupported attribute \"{}\"",
                    schema.type_name, key
                )));
            };
            if !attr.is_configurable() {
                return Err(ProviderError::validation(format!(
                    "{}: attribute \"{}\" is computed and cannot be set",
                    schema.type_name, key
                )));
            }
            data.set(key, value.clone())?;
        }
        Ok(data)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The identifier, or a validation error naming the operation that needs it
    pub fn require_id(&self, operation: &str) -> ProviderResult<String> {
        self.id.clone().ok_or_else(|| {
            ProviderError::validation(format!(
                "{}: {} requires a resource id",
                self.schema.type_name, operation
            ))
        })
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the resource as gone
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn exists(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn set_timeouts(&mut self, timeouts: Timeouts) {
        self.timeouts = timeouts;
    }

    /// Current value, or the type's zero value when unset
    pub fn get(&self, key: &str) -> Value {
        match self.values.get(key) {
            Some(value) => value.clone(),
            None => self
                .schema
                .attribute(key)
                .map(|a| a.ty.zero())
                .unwrap_or(Value::Null),
        }
    }

    /// The value only if it is set to something other than its zero value
    pub fn get_ok(&self, key: &str) -> Option<Value> {
        let value = self.get(key);
        (!is_zero(&value)).then_some(value)
    }

    pub fn get_str(&self, key: &str) -> String {
        match self.get(key) {
            Value::String(s) => s,
            _ => String::new(),
        }
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).as_i64().unwrap_or(0)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).as_bool().unwrap_or(false)
    }

    /// Store a value, coercing it to the attribute's type. `null` unsets.
    pub fn set(&mut self, key: &str, value: Value) -> ProviderResult<()> {
        let Some(attr) = self.schema.attribute(key) else {
            return Err(ProviderError::validation(format!(
                "{}: unsupported attribute \"{}\"",
                self.schema.type_name, key
            )));
        };

        match attr.ty.coerce(&value) {
            Some(Value::Null) => {
                self.values.remove(key);
                Ok(())
            }
            Some(coerced) => {
                self.values.insert(key.to_string(), coerced);
                Ok(())
            }
            None => Err(ProviderError::validation(format!(
                "{}: attribute \"{}\" expects {}, got {}",
                self.schema.type_name,
                key,
                attr.ty.as_str(),
                value
            ))),
        }
    }

    /// Check that every required attribute carries a value
    pub fn validate_required(&self) -> ProviderResult<()> {
        let missing: Vec<&str> = self
            .schema
            .required()
            .filter(|a| !self.values.contains_key(a.name))
            .map(|a| a.name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::validation(format!(
                "{}: missing required attributes: {}",
                self.schema.type_name,
                missing.join(", ")
            )))
        }
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// JSON view used for CLI output and debug logging
    pub fn to_json(&self) -> Value {
        json!({
            "type": self.schema.type_name,
            "id": self.id,
            "attributes": self.values,
        })
    }
}

/// Whether a value equals the zero value of its own type.
///
/// This cannot tell "never set" apart from "explicitly set to 0/false/empty".
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !*b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrType, Attribute};
    use std::time::Duration;

    static TEST_SCHEMA: Schema = Schema {
        type_name: "paperspace_test",
        attributes: &[
            Attribute::required("name", AttrType::String),
            Attribute::required("size", AttrType::Int),
            Attribute::optional("assign_public_ip", AttrType::Bool),
            Attribute::computed("state", AttrType::String),
        ],
        timeouts: Timeouts::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            Duration::from_secs(30),
        ),
    };

    #[test]
    fn test_unset_reads_as_zero() {
        let data = ResourceData::new(&TEST_SCHEMA);
        assert_eq!(data.get("name"), json!(""));
        assert_eq!(data.get("size"), json!(0));
        assert_eq!(data.get("assign_public_ip"), json!(false));
        assert_eq!(data.get_ok("size"), None);
    }

    #[test]
    fn test_from_config_rejects_computed_and_unknown() {
        let mut config = Map::new();
        config.insert("state".to_string(), json!("ready"));
        assert!(ResourceData::from_config(&TEST_SCHEMA, &config).is_err());

        let mut config = Map::new();
        config.insert("colour".to_string(), json!("blue"));
        assert!(ResourceData::from_config(&TEST_SCHEMA, &config).is_err());
    }

    #[test]
    fn test_set_coerces_and_null_unsets() {
        let mut data = ResourceData::new(&TEST_SCHEMA);
        data.set("size", json!("50")).unwrap();
        assert_eq!(data.get_int("size"), 50);

        data.set("size", Value::Null).unwrap();
        assert!(!data.attributes().contains_key("size"));

        assert!(data.set("size", json!("huge")).is_err());
    }

    #[test]
    fn test_validate_required_lists_missing() {
        let mut data = ResourceData::new(&TEST_SCHEMA);
        data.set("name", json!("box")).unwrap();
        let err = data.validate_required().unwrap_err();
        assert!(err.to_string().contains("size"));
        assert!(!err.to_string().contains("name"));
    }

    #[test]
    fn test_id_lifecycle() {
        let mut data = ResourceData::new(&TEST_SCHEMA);
        assert!(!data.exists());
        assert!(data.require_id("read").is_err());
        data.set_id("ps123");
        assert!(data.exists());
        data.clear_id();
        assert_eq!(data.id(), None);
    }
}
