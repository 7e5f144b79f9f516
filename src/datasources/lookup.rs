//! Filtered single-object lookup

use crate::api::client::id_of;
use crate::data::ResourceData;
use crate::error::{ProviderError, ProviderResult};
use crate::mapper::{apply_state, StateMapping};
use crate::provider::Provider;
use crate::schema::Schema;
use serde_json::Value;

/// A listing endpoint queried with attribute filters
#[derive(Debug)]
pub struct Lookup {
    pub schema: &'static Schema,
    /// Human name used in errors, e.g. `template`
    pub kind: &'static str,
    pub path: &'static str,
    /// `(attribute, query/wire field)`; also copied back from the match
    pub fields: StateMapping,
}

impl Lookup {
    /// Query pairs for every filter attribute that is set
    pub fn query(&self, data: &ResourceData) -> Vec<(&'static str, String)> {
        self.fields
            .iter()
            .filter_map(|(attr, wire)| {
                data.get_ok(attr).map(|value| match value {
                    Value::String(s) => (*wire, s),
                    other => (*wire, other.to_string()),
                })
            })
            .collect()
    }

    pub async fn read(&self, provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
        let query = self.query(data);
        if query.is_empty() {
            return Err(ProviderError::validation(format!(
                "Error reading paperspace {}: must specify query filter properties",
                self.kind
            )));
        }

        let operation = format!("Get{}s", capitalize(self.kind));
        let items = provider.api.list(&operation, self.path, &query).await?;
        let item = self.single(items)?;

        let Some(id) = id_of(&item) else {
            return Err(ProviderError::decode(
                format!("{} response", operation),
                format!("no {} id found", self.kind),
            ));
        };

        tracing::info!("Found {} {}", self.kind, id);
        apply_state(data, &item, self.fields);
        data.set_id(id);
        Ok(())
    }

    fn single(&self, items: Vec<Value>) -> ProviderResult<Value> {
        let mut items = items.into_iter();
        match (items.next(), items.next()) {
            (None, _) => Err(ProviderError::validation(format!(
                "Error reading paperspace {}: no {} found matching given properties",
                self.kind, self.kind
            ))),
            (Some(_), Some(_)) => Err(ProviderError::validation(format!(
                "Error reading paperspace {}: found more than one {} matching given properties",
                self.kind, self.kind
            ))),
            (Some(item), None) if item.is_object() => Ok(item),
            (Some(other), None) => Err(ProviderError::decode(
                format!("{} response", self.kind),
                format!("expected an object, got {}", other),
            )),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::template::LOOKUP;
    use serde_json::json;

    #[test]
    fn test_query_only_includes_set_filters() {
        let mut data = ResourceData::new(LOOKUP.schema);
        data.set("name", json!("ML-in-a-Box")).unwrap();
        data.set("user_id", json!("u123")).unwrap();

        assert_eq!(
            LOOKUP.query(&data),
            vec![("name", "ML-in-a-Box".to_string()), ("userId", "u123".to_string())]
        );
    }

    #[test]
    fn test_single_requires_exactly_one() {
        assert!(LOOKUP.single(vec![]).unwrap_err().to_string().contains("no template found"));
        assert!(LOOKUP
            .single(vec![json!({"id": "a"}), json!({"id": "b"})])
            .unwrap_err()
            .to_string()
            .contains("more than one"));
        assert_eq!(LOOKUP.single(vec![json!({"id": "a"})]).unwrap()["id"], "a");
        assert!(LOOKUP.single(vec![json!("a")]).is_err());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("network"), "Network");
        assert_eq!(capitalize(""), "");
    }
}
