//! Caching infrastructure for the service layer.
//!
//! The user collection is cached as one serialized JSON document under a
//! single key. Redis backs it in production.

mod cache_interface;
#[cfg(any(test, feature = "test-support"))]
mod memory_cache;
mod redis_cache;

pub use cache_interface::CacheInterface;
#[cfg(any(test, feature = "test-support"))]
pub use memory_cache::MemoryCacheService;
pub use redis_cache::{create_redis_pool, RedisCacheService};
