#![deny(clippy::all)]

use crate::domain::{ClientVariant, FlushCapability};
use async_trait::async_trait;
use shared::{Error, Exptime, Result};

// Ports are the pluggable extension points for concrete memcache clients

/// Port for a memcache client wrapped by `CacheAdapter`.
///
/// Implementations map their native failures into `shared::Error`. A client
/// that reports misses as errors must use `Error::NotFound` for them.
#[async_trait]
pub trait MemcacheClient<V>: Send + Sync + 'static {
    /// Dialect this client speaks
    fn variant(&self) -> ClientVariant;

    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// `exptime` of `None` stores without an expiry argument.
    async fn set(&self, key: &str, value: V, exptime: Option<Exptime>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Which of the two flush operations the client exposes.
    fn flush_capability(&self) -> FlushCapability {
        FlushCapability::FlushAll
    }

    async fn flush_all(&self) -> Result<()> {
        Err(Error::Unsupported("flush_all"))
    }

    async fn flush(&self) -> Result<()> {
        Err(Error::Unsupported("flush"))
    }
}
