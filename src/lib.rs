//! Paperspace resource provider
//!
//! Lifecycle controllers for Paperspace machines, startup scripts, private
//! networks, autoscaling groups and job storage, plus read-only lookups for
//! networks, templates, users and job storage.
//!
//! # Architecture
//!
//! - [`api`] - HTTP wrapper and one client method per endpoint
//! - [`mapper`] - attribute <-> wire field translation
//! - [`reconcile`] - poll-until-ready loops with deadlines
//! - [`resources`] / [`datasources`] - per-type controllers
//! - [`registry`] - type names and operation dispatch

pub mod api;
pub mod config;
pub mod data;
pub mod datasources;
pub mod error;
pub mod mapper;
pub mod provider;
pub mod reconcile;
pub mod registry;
pub mod resources;
pub mod schema;

pub use data::ResourceData;
pub use error::{ProviderError, ProviderResult};
pub use provider::Provider;
pub use registry::{DataSourceKind, Operation, ResourceKind};
