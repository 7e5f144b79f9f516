//! Provider context
//!
//! The [`Provider`] bundles everything a lifecycle operation needs: the API
//! client, the default region and the poll policy. It is built once and only
//! read afterwards, so concurrent operations can share it.

use crate::api::ApiClient;
use crate::config::ProviderConfig;
use crate::data::ResourceData;
use crate::error::{ProviderError, ProviderResult};
use crate::reconcile::{Backoff, Reconciler};

#[derive(Clone)]
pub struct Provider {
    pub api: ApiClient,
    pub region: Option<String>,
    pub reconciler: Reconciler,
}

impl Provider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        tracing::info!("Configuring provider for {}", config.api_host);
        if let Some(region) = &config.region {
            tracing::info!("Default region: {}", region);
        }

        Ok(Self {
            api: ApiClient::new(config)?,
            region: config.region.clone(),
            reconciler: Reconciler::default(),
        })
    }

    /// Replace the poll policy
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.reconciler = Reconciler::new(backoff);
        self
    }

    /// Region from the resource's `region` attribute, else the provider default
    pub fn region_for(&self, data: &ResourceData) -> Option<String> {
        let declared = data
            .schema()
            .attribute("region")
            .map(|_| data.get_str("region"))
            .filter(|r| !r.is_empty());

        declared.or_else(|| self.region.clone().filter(|r| !r.is_empty()))
    }

    /// Like [`Provider::region_for`], failing when no region is known
    pub fn require_region(&self, data: &ResourceData, operation: &str) -> ProviderResult<String> {
        self.region_for(data).ok_or_else(|| {
            ProviderError::validation(format!(
                "Error {} {}: missing region",
                operation,
                data.schema().type_name
            ))
        })
    }
}
