//! Cache layer
//!
//! Public backend lists (annonces, events, ads, documentation) are read far
//! more often than they change, so their decoded JSON is kept for a short
//! TTL. Keys are `<resource>:<suffix>`; writes drop every key of the
//! resource.

pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Create the shared response cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<MemoryCache> {
    Arc::new(MemoryCache::with_capacity_and_ttl(
        config.max_capacity,
        Duration::from_secs(config.ttl_seconds),
    ))
}

/// Key of a cached list for a resource
pub fn list_key(resource: &str) -> String {
    format!("{}:list", resource)
}

/// Prefix covering every key of a resource
pub fn resource_prefix(resource: &str) -> String {
    format!("{}:", resource)
}
