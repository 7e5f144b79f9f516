//! `paperspace_job_storage` data source

use crate::data::ResourceData;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::Provider;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};
use serde_json::Value;

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_job_storage",
    attributes: &[
        Attribute::required("team_id", AttrType::Int),
        Attribute::optional("region", AttrType::String),
        Attribute::optional_computed("handle", AttrType::String),
    ],
    timeouts: Timeouts::all(std::time::Duration::from_secs(60)),
};

/// Unlike the resource, a missing storage is an error here
pub async fn read(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.validate_required()?;
    let team_id = data.get_int("team_id");
    let region = provider.require_region(data, "reading")?;

    let storage = provider
        .api
        .job_storage_in_region(team_id, &region)
        .await?
        .filter(|s| !s.handle.is_empty())
        .ok_or_else(|| {
            ProviderError::not_found("job storage", format!("team {} in {}", team_id, region))
        })?;

    data.set_id(storage.handle.clone());
    data.set("handle", Value::String(storage.handle))
}
