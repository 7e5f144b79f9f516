//! `paperspace_autoscaling_group`
//!
//! The autoscaling API is eventually consistent: writes may be rejected
//! with transient errors and a new group can take a moment to become
//! readable, so every write and the follow-up read are polled.

use super::found;
use crate::api::client::id_of;
use crate::data::ResourceData;
use crate::error::{ProviderError, ProviderResult};
use crate::mapper::{apply_state, build_request, Rule, StateMapping};
use crate::provider::Provider;
use crate::reconcile::Attempt;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};
use serde_json::{json, Value};
use std::time::Duration;

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_autoscaling_group",
    attributes: &[
        Attribute::optional("name", AttrType::String),
        Attribute::required("min", AttrType::Int),
        Attribute::required("max", AttrType::Int),
        Attribute::required("cluster_id", AttrType::String),
        Attribute::required("machine_type", AttrType::String),
        Attribute::required("template_id", AttrType::String),
        Attribute::required("network_id", AttrType::String),
        Attribute::optional("startup_script_id", AttrType::String),
        Attribute::computed("current", AttrType::Int),
        Attribute::computed("dt_created", AttrType::String),
    ],
    timeouts: Timeouts::new(
        Duration::from_secs(60),
        Duration::from_secs(60),
        Duration::from_secs(60),
    ),
};

const STATE: StateMapping = &[
    ("name", "name"),
    ("min", "min"),
    ("max", "max"),
    ("cluster_id", "clusterId"),
    ("machine_type", "machineType"),
    ("template_id", "templateId"),
    ("network_id", "networkId"),
    ("startup_script_id", "scriptId"),
    ("current", "current"),
    ("dt_created", "dtCreated"),
];

fn create_rules() -> Vec<Rule> {
    vec![
        Rule::CopyIfSet("name"),
        Rule::CopyAs("cluster_id", "clusterId"),
        Rule::Copy("min"),
        Rule::Copy("max"),
        Rule::CopyAs("machine_type", "machineType"),
        Rule::CopyAs("template_id", "templateId"),
        Rule::CopyAs("network_id", "networkId"),
        Rule::CopyAsIfSet("startup_script_id", "scriptId"),
    ]
}

fn update_rules() -> Vec<Rule> {
    vec![
        Rule::CopyIfSet("name"),
        Rule::Copy("min"),
        Rule::Copy("max"),
        Rule::CopyAs("machine_type", "machineType"),
        Rule::CopyAs("template_id", "templateId"),
        Rule::CopyAs("network_id", "networkId"),
        Rule::CopyAsIfSet("startup_script_id", "scriptId"),
    ]
}

/// Update calls wrap the changed fields in an `attributes` object
pub fn update_body(data: &ResourceData) -> Value {
    json!({ "attributes": build_request(&update_rules(), data) })
}

fn classify<T>(result: ProviderResult<T>) -> Attempt<T> {
    match result {
        Ok(value) => Attempt::Ready(value),
        Err(err) if err.is_retryable() => Attempt::Retry(err.to_string()),
        Err(err) => Attempt::Fatal(err),
    }
}

/// Poll until the group is readable, then copy its fields
async fn settle(
    provider: &Provider,
    data: &mut ResourceData,
    id: &str,
    timeout: Duration,
) -> ProviderResult<()> {
    let group = provider
        .reconciler
        .wait_until(
            &format!("read autoscaling group {}", id),
            timeout,
            || provider.api.get_autoscaling_group(id),
            |_| Ok(()),
        )
        .await?;
    apply_state(data, &group, STATE);
    Ok(())
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.validate_required()?;
    if data.get_int("min") > data.get_int("max") {
        return Err(ProviderError::validation(format!(
            "autoscaling group min ({}) exceeds max ({})",
            data.get_int("min"),
            data.get_int("max")
        )));
    }

    let body = Value::Object(build_request(&create_rules(), data));
    let timeout = data.timeouts().create;
    let (api, body) = (&provider.api, &body);

    let id = provider
        .reconciler
        .run("create autoscaling group", timeout, || async move {
            classify(api.create_autoscaling_group(body).await)
        })
        .await?;
    tracing::info!("Autoscaling group {} created", id);
    data.set_id(id.clone());

    settle(provider, data, &id, timeout).await
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("read")?;
    if let Some(group) = found(provider.api.get_autoscaling_group(&id).await, data)? {
        if let Some(reported) = id_of(&group) {
            if reported != id {
                tracing::warn!("Autoscaling group {} reported id {}", id, reported);
            }
        }
        apply_state(data, &group, STATE);
    }
    Ok(())
}

pub async fn update(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("update")?;
    let body = update_body(data);
    let timeout = data.timeouts().update;
    let (api, body, target) = (&provider.api, &body, id.as_str());

    provider
        .reconciler
        .run(&format!("update autoscaling group {}", id), timeout, || async move {
            classify(api.update_autoscaling_group(target, body).await)
        })
        .await?;
    tracing::info!("Autoscaling group {} updated", id);

    settle(provider, data, &id, timeout).await
}

pub async fn delete(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("delete")?;
    let (api, target) = (&provider.api, id.as_str());

    provider
        .reconciler
        .run(&format!("delete autoscaling group {}", id), data.timeouts().delete, || async move {
            match api.delete_autoscaling_group(target).await {
                Ok(()) => Attempt::Ready(()),
                Err(err) if err.is_not_found() => Attempt::Ready(()),
                Err(err) if err.is_retryable() => Attempt::Retry(err.to_string()),
                Err(err) => Attempt::Fatal(err),
            }
        })
        .await?;

    tracing::info!("Autoscaling group {} deleted", id);
    data.clear_id();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> ResourceData {
        let mut data = ResourceData::new(&SCHEMA);
        data.set("name", json!("workers")).unwrap();
        data.set("min", json!(1)).unwrap();
        data.set("max", json!(4)).unwrap();
        data.set("cluster_id", json!("clu1")).unwrap();
        data.set("machine_type", json!("P4000")).unwrap();
        data.set("template_id", json!("t1")).unwrap();
        data.set("network_id", json!("n1")).unwrap();
        data
    }

    #[test]
    fn test_create_body() {
        let body = build_request(&create_rules(), &declared());
        assert_eq!(
            Value::Object(body),
            json!({
                "name": "workers",
                "clusterId": "clu1",
                "min": 1,
                "max": 4,
                "machineType": "P4000",
                "templateId": "t1",
                "networkId": "n1"
            })
        );
    }

    #[test]
    fn test_update_body_wraps_attributes() {
        let mut data = declared();
        data.set("startup_script_id", json!("s1")).unwrap();
        let body = update_body(&data);
        assert_eq!(body["attributes"]["scriptId"], "s1");
        assert_eq!(body["attributes"]["max"], 4);
        assert!(body["attributes"].get("clusterId").is_none());
    }
}
