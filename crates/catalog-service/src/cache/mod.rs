//! Caching infrastructure for the service layer.
//!
//! The cache is non-authoritative: every entry is a disposable snapshot of
//! store data and a missing entry is always a valid state. [`ProductCache`]
//! applies the product-specific key and TTL rules on top of any
//! [`CacheInterface`] backend.

mod cache_interface;
pub mod cache_keys;
mod product_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use product_cache::{CachedProductPage, CacheTtls, ProductCache};
pub use redis_cache::{RedisCacheService, RedisCacheServiceParameters, DEFAULT_OPERATION_TIMEOUT};
