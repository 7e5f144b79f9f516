//! Read-only data sources
//!
//! Network, template and user lookups share one implementation in
//! [`lookup`]: filters go into the query string and exactly one object must
//! match. Job storage reuses the team storage listing instead.

pub mod job_storage;
pub mod lookup;
pub mod network;
pub mod template;
pub mod user;

pub use lookup::Lookup;
