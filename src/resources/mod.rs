//! Resource lifecycle controllers
//!
//! One module per managed resource type. Every module exposes a static
//! `SCHEMA` and four operations, `create`, `read`, `update` and `delete`,
//! each taking the shared [`Provider`](crate::provider::Provider) and the
//! instance's [`ResourceData`].
//!
//! - [`machine`] - virtual machines, polled until `ready` / gone
//! - [`script`] - startup scripts
//! - [`network`] - team private networks
//! - [`autoscaling_group`] - autoscaling groups
//! - [`job_storage`] - team job storage (lookup only, no remote create)

pub mod autoscaling_group;
pub mod job_storage;
pub mod machine;
pub mod network;
pub mod script;

use crate::data::ResourceData;
use crate::error::ProviderResult;

/// Unwrap a fetch result, treating not-found as "resource is gone".
///
/// On not-found the id is cleared and `Ok(None)` is returned.
pub(crate) fn found<T>(
    result: ProviderResult<T>,
    data: &mut ResourceData,
) -> ProviderResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => {
            tracing::info!(
                "{} {} no longer exists; removing from state",
                data.schema().type_name,
                data.id().unwrap_or("-")
            );
            data.clear_id();
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
