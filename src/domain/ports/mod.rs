//! Domain Ports - Interfaces to the outside world

mod cache_store;
mod target_registry;
mod upstream_client;

pub use cache_store::CacheStore;
pub use target_registry::TargetRegistry;
pub use upstream_client::{UpstreamClient, UpstreamError};
