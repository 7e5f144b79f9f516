//! Resource Registry
//!
//! Names every resource and data source type the provider serves and routes
//! lifecycle operations to the module that implements them.

use crate::data::ResourceData;
use crate::datasources;
use crate::error::ProviderResult;
use crate::provider::Provider;
use crate::resources::{autoscaling_group, job_storage, machine, network, script};
use crate::schema::Schema;
use std::fmt;

/// Lifecycle operation on a managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Managed resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Machine,
    Script,
    Network,
    AutoscalingGroup,
    JobStorage,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Machine,
        ResourceKind::Script,
        ResourceKind::Network,
        ResourceKind::AutoscalingGroup,
        ResourceKind::JobStorage,
    ];

    /// Accepts the full type name or the name without `paperspace_`
    pub fn parse(name: &str) -> Option<Self> {
        let short = name.strip_prefix("paperspace_").unwrap_or(name);
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name().strip_prefix("paperspace_") == Some(short))
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            ResourceKind::Machine => &machine::SCHEMA,
            ResourceKind::Script => &script::SCHEMA,
            ResourceKind::Network => &network::SCHEMA,
            ResourceKind::AutoscalingGroup => &autoscaling_group::SCHEMA,
            ResourceKind::JobStorage => &job_storage::SCHEMA,
        }
    }

    pub fn type_name(self) -> &'static str {
        self.schema().type_name
    }

    /// Run one lifecycle operation against `data`
    pub async fn apply(
        self,
        operation: Operation,
        provider: &Provider,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        tracing::debug!("{} {} id={:?}", operation.as_str(), self, data.id());

        match (self, operation) {
            (ResourceKind::Machine, Operation::Create) => machine::create(provider, data).await,
            (ResourceKind::Machine, Operation::Read) => machine::read(provider, data).await,
            (ResourceKind::Machine, Operation::Update) => machine::update(provider, data).await,
            (ResourceKind::Machine, Operation::Delete) => machine::delete(provider, data).await,

            (ResourceKind::Script, Operation::Create) => script::create(provider, data).await,
            (ResourceKind::Script, Operation::Read) => script::read(provider, data).await,
            (ResourceKind::Script, Operation::Update) => script::update(provider, data).await,
            (ResourceKind::Script, Operation::Delete) => script::delete(provider, data).await,

            (ResourceKind::Network, Operation::Create) => network::create(provider, data).await,
            (ResourceKind::Network, Operation::Read) => network::read(provider, data).await,
            (ResourceKind::Network, Operation::Update) => network::update(provider, data).await,
            (ResourceKind::Network, Operation::Delete) => network::delete(provider, data).await,

            (ResourceKind::AutoscalingGroup, Operation::Create) => {
                autoscaling_group::create(provider, data).await
            }
            (ResourceKind::AutoscalingGroup, Operation::Read) => {
                autoscaling_group::read(provider, data).await
            }
            (ResourceKind::AutoscalingGroup, Operation::Update) => {
                autoscaling_group::update(provider, data).await
            }
            (ResourceKind::AutoscalingGroup, Operation::Delete) => {
                autoscaling_group::delete(provider, data).await
            }

            (ResourceKind::JobStorage, Operation::Create) => {
                job_storage::create(provider, data).await
            }
            (ResourceKind::JobStorage, Operation::Read) => job_storage::read(provider, data).await,
            (ResourceKind::JobStorage, Operation::Update) => {
                job_storage::update(provider, data).await
            }
            (ResourceKind::JobStorage, Operation::Delete) => {
                job_storage::delete(provider, data).await
            }
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Read-only data source types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Network,
    Template,
    User,
    JobStorage,
}

impl DataSourceKind {
    pub const ALL: &'static [DataSourceKind] = &[
        DataSourceKind::Network,
        DataSourceKind::Template,
        DataSourceKind::User,
        DataSourceKind::JobStorage,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        let short = name.strip_prefix("paperspace_").unwrap_or(name);
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name().strip_prefix("paperspace_") == Some(short))
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            DataSourceKind::Network => &datasources::network::SCHEMA,
            DataSourceKind::Template => &datasources::template::SCHEMA,
            DataSourceKind::User => &datasources::user::SCHEMA,
            DataSourceKind::JobStorage => &datasources::job_storage::SCHEMA,
        }
    }

    pub fn type_name(self) -> &'static str {
        self.schema().type_name
    }

    pub async fn read(self, provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
        tracing::debug!("read data source {}", self);

        match self {
            DataSourceKind::Network => datasources::network::LOOKUP.read(provider, data).await,
            DataSourceKind::Template => datasources::template::LOOKUP.read(provider, data).await,
            DataSourceKind::User => datasources::user::LOOKUP.read(provider, data).await,
            DataSourceKind::JobStorage => datasources::job_storage::read(provider, data).await,
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_short_names() {
        assert_eq!(ResourceKind::parse("paperspace_machine"), Some(ResourceKind::Machine));
        assert_eq!(ResourceKind::parse("autoscaling_group"), Some(ResourceKind::AutoscalingGroup));
        assert_eq!(ResourceKind::parse("paperspace_template"), None);
        assert_eq!(DataSourceKind::parse("template"), Some(DataSourceKind::Template));
        assert_eq!(DataSourceKind::parse("paperspace_machine"), None);
    }

    #[test]
    fn test_type_names_are_unique_per_registry() {
        let mut names: Vec<_> = ResourceKind::ALL.iter().map(|k| k.type_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ResourceKind::ALL.len());

        for kind in DataSourceKind::ALL {
            assert!(kind.type_name().starts_with("paperspace_"));
        }
    }

    #[test]
    fn test_every_schema_has_attributes() {
        for kind in ResourceKind::ALL {
            assert!(!kind.schema().attributes.is_empty(), "{} has no attributes", kind);
        }
        for kind in DataSourceKind::ALL {
            assert!(!kind.schema().attributes.is_empty(), "{} has no attributes", kind);
        }
    }
}
