//! `paperspace_machine`
//!
//! Machines provision asynchronously: create returns an id immediately and
//! the machine moves through `provisioning` to `ready`. Destroy is also
//! asynchronous; the machine stays readable until teardown finishes.

use super::found;
use crate::data::ResourceData;
use crate::error::ProviderResult;
use crate::mapper::{apply_state, build_request, redacted, Rule, StateMapping};
use crate::provider::Provider;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};
use serde_json::Value;
use std::time::Duration;

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_machine",
    attributes: &[
        Attribute::optional_computed("region", AttrType::String),
        Attribute::required("machine_type", AttrType::String),
        Attribute::required("size", AttrType::Int),
        Attribute::required("billing_type", AttrType::String),
        Attribute::required("name", AttrType::String),
        Attribute::required("template_id", AttrType::String),
        Attribute::optional("assign_public_ip", AttrType::Bool),
        Attribute::optional_computed("network_id", AttrType::String),
        Attribute::optional_computed("team_id", AttrType::String),
        Attribute::optional_computed("user_id", AttrType::String),
        Attribute::optional("email", AttrType::String),
        Attribute::optional("password", AttrType::String),
        Attribute::optional("firstname", AttrType::String),
        Attribute::optional("lastname", AttrType::String),
        Attribute::optional("notification_email", AttrType::String),
        Attribute::optional("script_id", AttrType::String),
        Attribute::optional_computed("shutdown_timeout_in_hours", AttrType::Int),
        Attribute::optional_computed("is_managed", AttrType::Bool),
        Attribute::optional_computed("perform_auto_snapshot", AttrType::Bool),
        Attribute::optional_computed("auto_snapshot_frequency", AttrType::String),
        Attribute::optional_computed("auto_snapshot_save_count", AttrType::String),
        Attribute::optional("live_forever", AttrType::Bool),
        Attribute::computed("dt_last_run", AttrType::String),
        Attribute::computed("os", AttrType::String),
        Attribute::computed("ram", AttrType::String),
        Attribute::computed("cpus", AttrType::Int),
        Attribute::computed("gpu", AttrType::String),
        Attribute::computed("storage_total", AttrType::String),
        Attribute::computed("storage_used", AttrType::String),
        Attribute::computed("usage_rate", AttrType::String),
        Attribute::computed("shutdown_timeout_forces", AttrType::Bool),
        Attribute::computed("agent_type", AttrType::String),
        Attribute::computed("dt_created", AttrType::String),
        Attribute::computed("state", AttrType::String),
        Attribute::computed("private_ip_address", AttrType::String),
        Attribute::computed("public_ip_address", AttrType::String),
    ],
    timeouts: Timeouts::new(
        Duration::from_secs(10 * 60),
        Duration::from_secs(10 * 60),
        Duration::from_secs(5 * 60),
    ),
};

const STATE: StateMapping = &[
    ("name", "name"),
    ("os", "os"),
    ("ram", "ram"),
    ("cpus", "cpus"),
    ("gpu", "gpu"),
    ("storage_total", "storageTotal"),
    ("storage_used", "storageUsed"),
    ("usage_rate", "usageRate"),
    ("shutdown_timeout_in_hours", "shutdownTimeoutInHours"),
    ("shutdown_timeout_forces", "shutdownTimeoutForces"),
    ("perform_auto_snapshot", "performAutoSnapshot"),
    ("auto_snapshot_frequency", "autoSnapshotFrequency"),
    ("auto_snapshot_save_count", "autoSnapshotSaveCount"),
    ("agent_type", "agentType"),
    ("dt_created", "dtCreated"),
    ("state", "state"),
    ("network_id", "networkId"),
    ("private_ip_address", "privateIpAddress"),
    ("public_ip_address", "publicIpAddress"),
    ("region", "region"),
    ("user_id", "userId"),
    ("team_id", "teamId"),
    ("script_id", "scriptId"),
    ("dt_last_run", "dtLastRun"),
    ("is_managed", "isManaged"),
];

fn create_rules(region: String) -> Vec<Rule> {
    vec![
        Rule::Literal("region", Value::String(region)),
        Rule::CopyAs("machine_type", "machineType"),
        Rule::Copy("size"),
        Rule::CopyAs("billing_type", "billingType"),
        Rule::CopyAs("name", "machineName"),
        Rule::CopyAs("template_id", "templateId"),
        Rule::CopyAsIfSet("assign_public_ip", "assignPublicIp"),
        Rule::CopyAsIfSet("user_id", "userId"),
        Rule::CopyAsIfSet("team_id", "teamId"),
        Rule::CopyAsIfSet("script_id", "scriptId"),
        Rule::CopyAsIfSet("network_id", "networkId"),
        Rule::CopyAsIfSet("shutdown_timeout_in_hours", "shutdownTimeoutInHours"),
        Rule::CopyAsIfSet("is_managed", "isManaged"),
        Rule::CopyAsIfSet("perform_auto_snapshot", "performAutoSnapshot"),
        Rule::CopyAsIfSet("auto_snapshot_frequency", "autoSnapshotFrequency"),
        Rule::CopyAsIfSet("auto_snapshot_save_count", "autoSnapshotSaveCount"),
        Rule::CopyIfSet("email"),
        Rule::CopyIfSet("password"),
        Rule::CopyAsIfSet("firstname", "firstName"),
        Rule::CopyAsIfSet("lastname", "lastName"),
        Rule::CopyAsIfSet("notification_email", "notificationEmail"),
    ]
}

/// Build the create request body
pub fn create_body(region: String, data: &ResourceData) -> serde_json::Map<String, Value> {
    let mut body = build_request(&create_rules(region), data);
    // a null timeout disables auto-shutdown
    if data.get_bool("live_forever") {
        body.insert("shutdownTimeoutInHours".to_string(), Value::Null);
    }
    body
}

fn is_ready(machine: &Value) -> Result<(), String> {
    match machine.get("state").and_then(|v| v.as_str()) {
        Some("ready") => Ok(()),
        Some(state) => Err(format!("Expected machine to be ready but was in state {}", state)),
        None => Err("Expected machine to be ready but found no state".to_string()),
    }
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.validate_required()?;
    let region = provider.require_region(data, "creating")?;

    let body = create_body(region, data);
    tracing::debug!("CreateMachine body: {}", redacted(&body));

    let id = provider.api.create_machine(&Value::Object(body)).await?;
    tracing::info!("Machine {} created, waiting for it to become ready", id);
    data.set_id(id.clone());

    let machine = provider
        .reconciler
        .wait_until(
            &format!("create machine {}", id),
            data.timeouts().create,
            || provider.api.get_machine(&id),
            is_ready,
        )
        .await?;

    apply_state(data, &machine, STATE);
    tracing::info!("Machine {} is ready", id);
    Ok(())
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("read")?;
    if let Some(machine) = found(provider.api.get_machine(&id).await, data)? {
        apply_state(data, &machine, STATE);
    }
    Ok(())
}

/// Machines cannot be modified in place; update refreshes state
pub async fn update(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    read(provider, data).await
}

pub async fn delete(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("delete")?;
    if found(provider.api.destroy_machine(&id).await, data)?.is_none() {
        return Ok(());
    }
    tracing::info!("Machine {} is being destroyed", id);

    provider
        .reconciler
        .wait_until_gone(
            &format!("delete machine {}", id),
            data.timeouts().delete,
            || provider.api.get_machine(&id),
        )
        .await?;

    tracing::info!("Machine {} destroyed", id);
    data.clear_id();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared() -> ResourceData {
        let mut data = ResourceData::new(&SCHEMA);
        data.set("machine_type", json!("C5")).unwrap();
        data.set("size", json!(50)).unwrap();
        data.set("billing_type", json!("hourly")).unwrap();
        data.set("name", json!("trainer")).unwrap();
        data.set("template_id", json!("tkni3aa4")).unwrap();
        data
    }

    #[test]
    fn test_create_body_minimal() {
        let body = create_body("East Coast (NY2)".to_string(), &declared());
        assert_eq!(
            Value::Object(body),
            json!({
                "region": "East Coast (NY2)",
                "machineType": "C5",
                "size": 50,
                "billingType": "hourly",
                "machineName": "trainer",
                "templateId": "tkni3aa4"
            })
        );
    }

    #[test]
    fn test_create_body_optional_fields() {
        let mut data = declared();
        data.set("assign_public_ip", json!(true)).unwrap();
        data.set("team_id", json!("te1")).unwrap();
        data.set("firstname", json!("Ada")).unwrap();

        let body = create_body("Europe (AMS1)".to_string(), &data);
        assert_eq!(body.get("assignPublicIp"), Some(&json!(true)));
        assert_eq!(body.get("teamId"), Some(&json!("te1")));
        assert_eq!(body.get("firstName"), Some(&json!("Ada")));
        assert!(!body.contains_key("scriptId"));
    }

    #[test]
    fn test_live_forever_nulls_shutdown_timeout() {
        let mut data = declared();
        data.set("shutdown_timeout_in_hours", json!(4)).unwrap();
        data.set("live_forever", json!(true)).unwrap();

        let body = create_body("Europe (AMS1)".to_string(), &data);
        assert_eq!(body.get("shutdownTimeoutInHours"), Some(&Value::Null));
    }

    #[test]
    fn test_is_ready() {
        assert!(is_ready(&json!({"state": "ready"})).is_ok());
        assert!(is_ready(&json!({"state": "provisioning"})).unwrap_err().contains("provisioning"));
        assert!(is_ready(&json!({})).is_err());
    }

    #[test]
    fn test_state_mapping_targets_schema() {
        for (attr, _) in STATE {
            assert!(SCHEMA.attribute(attr).is_some(), "{} missing from schema", attr);
        }
    }
}
