//! `paperspace_script`
//!
//! Startup scripts are created synchronously. Their text is stored apart
//! from the metadata and fetched with a second call on read.

use super::found;
use crate::data::ResourceData;
use crate::error::ProviderResult;
use crate::mapper::{apply_state, build_request, Rule, StateMapping};
use crate::provider::Provider;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};
use serde_json::Value;

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_script",
    attributes: &[
        Attribute::required("name", AttrType::String),
        Attribute::optional("description", AttrType::String),
        Attribute::required("script_text", AttrType::String),
        Attribute::optional("region", AttrType::String),
        Attribute::computed("owner_type", AttrType::String),
        Attribute::computed("owner_id", AttrType::String),
        Attribute::computed("dt_created", AttrType::String),
        Attribute::optional_computed("is_enabled", AttrType::Bool),
        Attribute::optional_computed("run_once", AttrType::Bool),
    ],
    timeouts: Timeouts::new(
        std::time::Duration::from_secs(20 * 60),
        std::time::Duration::from_secs(20 * 60),
        std::time::Duration::from_secs(20 * 60),
    ),
};

const STATE: StateMapping = &[
    ("name", "name"),
    ("description", "description"),
    ("owner_type", "ownerType"),
    ("owner_id", "ownerId"),
    ("dt_created", "dtCreated"),
    ("is_enabled", "isEnabled"),
    ("run_once", "runOnce"),
];

fn create_rules() -> Vec<Rule> {
    vec![
        Rule::CopyAs("name", "scriptName"),
        Rule::CopyAs("script_text", "scriptText"),
        Rule::CopyAsIfSet("description", "scriptDescription"),
        Rule::CopyAsIfSet("is_enabled", "isEnabled"),
        Rule::CopyAsIfSet("run_once", "runOnce"),
    ]
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.validate_required()?;
    // scripts are account-wide, but creation is refused without a region
    provider.require_region(data, "creating")?;

    let body = build_request(&create_rules(), data);
    let script = provider.api.create_script(&Value::Object(body)).await?;

    apply_state(data, &script, STATE);
    if let Some(id) = crate::api::client::id_of(&script) {
        tracing::info!("Script {} created", id);
        data.set_id(id);
    }

    read(provider, data).await
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("read")?;
    let Some(script) = found(provider.api.get_script(&id).await, data)? else {
        return Ok(());
    };
    apply_state(data, &script, STATE);

    match provider.api.get_script_text(&id).await? {
        Some(text) => data.set("script_text", Value::String(text))?,
        None => tracing::info!("Script {} has no stored text", id),
    }
    Ok(())
}

/// Scripts cannot be modified in place; update refreshes state
pub async fn update(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    read(provider, data).await
}

pub async fn delete(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("delete")?;
    if found(provider.api.destroy_script(&id).await, data)?.is_some() {
        tracing::info!("Script {} deleted", id);
    }
    data.clear_id();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_renames() {
        let mut data = ResourceData::new(&SCHEMA);
        data.set("name", json!("bootstrap")).unwrap();
        data.set("script_text", json!("#!/bin/sh\necho hi")).unwrap();
        data.set("run_once", json!(true)).unwrap();

        let body = build_request(&create_rules(), &data);
        assert_eq!(
            Value::Object(body),
            json!({"scriptName": "bootstrap", "scriptText": "#!/bin/sh\necho hi", "runOnce": true})
        );
    }
}
