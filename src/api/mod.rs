//! Paperspace API interaction module
//!
//! # Module Structure
//!
//! - [`http`] - HTTP wrapper that attaches the fixed headers and decodes bodies
//! - [`client`] - Endpoint calls used by the lifecycle controllers
//! - [`models`] - Typed payloads for the network and job storage endpoints
//!
//! # Example
//!
//! ```ignore
//! use paperspace_provider::api::ApiClient;
//!
//! async fn example(config: &ProviderConfig) -> ProviderResult<()> {
//!     let client = ApiClient::new(config)?;
//!     let machine = client.get_machine("psabc123").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod models;

pub use client::ApiClient;
pub use http::{ApiHttpClient, ApiResponse};
