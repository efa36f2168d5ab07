//! Outbound Adapters - Implementations of the domain ports

mod dashmap_cache_store;
mod dashmap_target_registry;
mod reqwest_upstream;

pub use dashmap_cache_store::DashMapCacheStore;
pub use dashmap_target_registry::DashMapTargetRegistry;
pub use reqwest_upstream::ReqwestUpstreamClient;
