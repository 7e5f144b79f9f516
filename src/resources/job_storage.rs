//! `paperspace_job_storage`
//!
//! Every team gets job storage provisioned per region by Paperspace itself.
//! Creating the resource waits for the team's storage in the region to show
//! up and adopts its handle as the id. Nothing is ever deleted remotely.

use super::found;
use crate::api::models::JobStorage;
use crate::data::ResourceData;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::Provider;
use crate::reconcile::Attempt;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};
use serde_json::Value;
use std::time::Duration;

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_job_storage",
    attributes: &[
        Attribute::required("team_id", AttrType::Int),
        Attribute::optional("region", AttrType::String),
        Attribute::computed("handle", AttrType::String),
    ],
    timeouts: Timeouts::all(Duration::from_secs(60)),
};

async fn lookup(provider: &Provider, team_id: i64, region: &str) -> ProviderResult<JobStorage> {
    provider
        .api
        .job_storage_in_region(team_id, region)
        .await?
        .ok_or_else(|| {
            ProviderError::not_found("job storage", format!("team {} in {}", team_id, region))
        })
}

fn apply(data: &mut ResourceData, storage: &JobStorage) -> ProviderResult<()> {
    data.set_id(storage.handle.clone());
    data.set("handle", Value::String(storage.handle.clone()))
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.validate_required()?;
    let team_id = data.get_int("team_id");
    let region = provider.require_region(data, "creating")?;
    let region = region.as_str();

    let storage = provider
        .reconciler
        .run("create job storage", data.timeouts().create, || async move {
            match lookup(provider, team_id, region).await {
                Ok(storage) => Attempt::Ready(storage),
                // storage is provisioned with the team, it never appears later
                Err(err) if err.is_not_found() => Attempt::Fatal(err),
                Err(err) if err.is_retryable() => Attempt::Retry(err.to_string()),
                Err(err) => Attempt::Fatal(err),
            }
        })
        .await?;

    tracing::info!("Job storage {} found for team {} in {}", storage.handle, team_id, region);
    apply(data, &storage)
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.require_id("read")?;
    let team_id = data.get_int("team_id");
    let region = provider.require_region(data, "reading")?;

    if let Some(storage) = found(lookup(provider, team_id, &region).await, data)? {
        apply(data, &storage)?;
    }
    Ok(())
}

/// Job storage has no mutable fields; update refreshes state
pub async fn update(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    read(provider, data).await
}

/// Storage belongs to the team; delete only forgets it
pub async fn delete(_provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    tracing::info!("Job storage {} removed from state", data.id().unwrap_or("-"));
    data.clear_id();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{JobStorageServer, StorageRegion};

    #[test]
    fn test_apply_adopts_handle_as_id() {
        let storage = JobStorage {
            handle: "jsabc123".to_string(),
            team_id: 42,
            server: JobStorageServer {
                ip: "10.0.0.4".to_string(),
                storage_region: StorageRegion {
                    name: "East Coast (NY2)".to_string(),
                },
            },
        };

        let mut data = ResourceData::new(&SCHEMA);
        apply(&mut data, &storage).unwrap();
        assert_eq!(data.id(), Some("jsabc123"));
        assert_eq!(data.get_str("handle"), "jsabc123");
    }
}
