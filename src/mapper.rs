//! Field Mapper
//!
//! Translates between schema attributes (snake_case) and API wire fields
//! (camelCase) in both directions: [`build_request`] turns declared
//! attributes into a request body, [`apply_state`] copies a response body
//! back onto the attribute set.

use crate::data::{is_zero, ResourceData};
use serde_json::{Map, Value};

/// One request-building rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Always send the attribute under its own name
    Copy(&'static str),
    /// Always send the attribute under a wire name
    CopyAs(&'static str, &'static str),
    /// Send a fixed value
    Literal(&'static str, Value),
    /// Send the attribute under its own name unless it is the zero value
    CopyIfSet(&'static str),
    /// Send the attribute under a wire name unless it is the zero value
    CopyAsIfSet(&'static str, &'static str),
}

impl Rule {
    /// Wire field this rule writes
    pub fn wire_key(&self) -> &'static str {
        match self {
            Rule::Copy(key) | Rule::CopyIfSet(key) => key,
            Rule::CopyAs(_, wire) | Rule::CopyAsIfSet(_, wire) | Rule::Literal(wire, _) => wire,
        }
    }
}

/// Build a request body from a rule list.
///
/// Keys keep rule order so the pretty-printed body is stable in logs. A
/// later rule writing the same wire key replaces the earlier value.
pub fn build_request(rules: &[Rule], data: &ResourceData) -> Map<String, Value> {
    let mut body = Map::new();

    for rule in rules {
        let value = match rule {
            Rule::Copy(key) | Rule::CopyAs(key, _) => Some(data.get(key)),
            Rule::Literal(_, value) => Some(value.clone()),
            Rule::CopyIfSet(key) | Rule::CopyAsIfSet(key, _) => {
                let value = data.get(key);
                (!is_zero(&value)).then_some(value)
            }
        };

        if let Some(value) = value {
            body.insert(rule.wire_key().to_string(), value);
        }
    }

    body
}

/// `(attribute, wire field)` pairs for copying a response onto attributes
pub type StateMapping = &'static [(&'static str, &'static str)];

/// Copy wire fields present in `body` onto `data`.
///
/// Absent fields leave the attribute untouched, `null` unsets it, and values
/// that cannot be coerced to the attribute type are skipped with a warning.
pub fn apply_state(data: &mut ResourceData, body: &Value, mapping: StateMapping) {
    for (attr, wire) in mapping {
        let Some(value) = body.get(*wire) else {
            continue;
        };

        if let Err(e) = data.set(attr, value.clone()) {
            tracing::warn!("Skipping {} from response field {}: {}", attr, wire, e);
        }
    }
}

/// Render a body for debug logging, dropping secrets
pub fn redacted(body: &Map<String, Value>) -> String {
    let mut shown = body.clone();
    if shown.contains_key("password") {
        shown.insert("password".to_string(), Value::String("<redacted>".to_string()));
    }
    serde_json::to_string_pretty(&shown).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrType, Attribute, Schema, Timeouts};
    use serde_json::json;

    static TEST_SCHEMA: Schema = Schema {
        type_name: "paperspace_test",
        attributes: &[
            Attribute::required("machine_type", AttrType::String),
            Attribute::required("size", AttrType::Int),
            Attribute::optional("assign_public_ip", AttrType::Bool),
            Attribute::optional("team_id", AttrType::String),
            Attribute::optional("password", AttrType::String),
            Attribute::computed("storage_total", AttrType::String),
            Attribute::computed("cpus", AttrType::Int),
        ],
        timeouts: Timeouts::new(
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(1),
        ),
    };

    fn sample() -> ResourceData {
        let mut data = ResourceData::new(&TEST_SCHEMA);
        data.set("machine_type", json!("C5")).unwrap();
        data.set("size", json!(50)).unwrap();
        data
    }

    #[test]
    fn test_rules_rename_and_literal() {
        let rules = vec![
            Rule::Literal("region", json!("East Coast (NY2)")),
            Rule::CopyAs("machine_type", "machineType"),
            Rule::Copy("size"),
        ];

        let body = build_request(&rules, &sample());
        assert_eq!(
            Value::Object(body.clone()),
            json!({"region": "East Coast (NY2)", "machineType": "C5", "size": 50})
        );
        let keys: Vec<&String> = body.keys().collect();
        assert_eq!(keys, vec!["region", "machineType", "size"]);
    }

    #[test]
    fn test_if_set_skips_zero_values() {
        let rules = vec![
            Rule::CopyAsIfSet("assign_public_ip", "assignPublicIp"),
            Rule::CopyAsIfSet("team_id", "teamId"),
        ];
        let body = build_request(&rules, &sample());
        assert!(body.is_empty());

        // explicit false is indistinguishable from unset
        let mut data = sample();
        data.set("assign_public_ip", json!(false)).unwrap();
        assert!(build_request(&rules, &data).is_empty());

        data.set("assign_public_ip", json!(true)).unwrap();
        let body = build_request(&rules, &data);
        assert_eq!(body.get("assignPublicIp"), Some(&json!(true)));
    }

    #[test]
    fn test_unconditional_copy_emits_zero() {
        let body = build_request(&[Rule::CopyAs("team_id", "teamId")], &sample());
        assert_eq!(body.get("teamId"), Some(&json!("")));
    }

    #[test]
    fn test_apply_state_renames_and_coerces() {
        let mut data = sample();
        let body = json!({
            "storageTotal": 53687091200_i64,
            "cpus": "8",
            "teamId": null,
            "ignored": "x"
        });
        data.set("team_id", json!("te123")).unwrap();

        apply_state(
            &mut data,
            &body,
            &[("storage_total", "storageTotal"), ("cpus", "cpus"), ("team_id", "teamId")],
        );

        assert_eq!(data.get_str("storage_total"), "53687091200");
        assert_eq!(data.get_int("cpus"), 8);
        assert!(!data.attributes().contains_key("team_id"));
    }

    #[test]
    fn test_apply_state_skips_uncoercible() {
        let mut data = sample();
        apply_state(&mut data, &json!({"cpus": {"count": 8}}), &[("cpus", "cpus")]);
        assert_eq!(data.get_int("cpus"), 0);
    }

    #[test]
    fn test_redacted_hides_password() {
        let mut data = sample();
        data.set("password", json!("hunter2")).unwrap();
        let body = build_request(&[Rule::CopyIfSet("password")], &data);
        let shown = redacted(&body);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }
}
