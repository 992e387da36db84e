use crate::domain::{ClientVariant, Clock, FlushCapability, SetOptions, SystemClock};
use crate::ports::MemcacheClient;
use shared::config::Config;
use shared::{EXPIRES_EDGE, Error, ExpiresIn, Result};
use std::fmt::Debug;
use std::sync::Arc;

/// Memcache store over an externally owned client.
///
/// Holds no cache state. Every call is a single delegation to the client;
/// the only failure recovered is a `NotFound` on `get` from a dialect that
/// reports misses as errors.
pub struct CacheAdapter<V> {
    backend: Arc<dyn MemcacheClient<V>>,
    variant: ClientVariant,
    expires_edge: i64,
    clock: Arc<dyn Clock>,
}

impl<V> CacheAdapter<V>
where
    V: Send + Sync + 'static,
{
    /// Wraps `client` using the dialect it declares.
    pub fn new(client: Arc<dyn MemcacheClient<V>>) -> Self {
        let variant = client.variant();
        Self {
            backend: client,
            variant,
            expires_edge: EXPIRES_EDGE,
            clock: Arc::new(SystemClock),
        }
    }

    /// Like `new`, with the expiry edge and an optional dialect override taken from `config`.
    pub fn from_config(client: Arc<dyn MemcacheClient<V>>, config: &Config) -> Result<Self> {
        let mut adapter = Self::new(client);
        adapter.expires_edge = config.expires_edge;
        if let Some(name) = config.client_variant.as_deref() {
            adapter.variant = ClientVariant::try_from(name)?;
        }
        Ok(adapter)
    }

    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn variant(&self) -> ClientVariant {
        self.variant
    }

    pub fn expires_edge(&self) -> i64 {
        self.expires_edge
    }

    pub fn client(&self) -> &Arc<dyn MemcacheClient<V>> {
        &self.backend
    }

    /// Returns the value under `key`, or `None` on a miss.
    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        match self.backend.get(key).await {
            Err(Error::NotFound) if self.variant.recovers_not_found() => {
                tracing::debug!(
                    "Miss on '{}' reported as not found by {}",
                    key,
                    self.variant.as_str()
                );
                Ok(None)
            }
            other => other,
        }
    }

    /// Stores `value` under `key`, with an expiry when `opts.expires_in` is set.
    pub async fn set(&self, key: &str, value: V, opts: &SetOptions) -> Result<()> {
        let Some(secs) = opts.expires_in else {
            tracing::trace!("Setting '{}' without expiry", key);
            return self.backend.set(key, value, None).await;
        };

        let now = self.clock.now_unix();
        let exptime = self
            .variant
            .normalize_expiry(ExpiresIn(secs), self.expires_edge, now);
        tracing::debug!(
            "Setting '{}' with expires_in={} as exptime={} for {}",
            key,
            secs,
            exptime.0,
            self.variant.as_str()
        );
        self.backend.set(key, value, Some(exptime)).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        tracing::trace!("Deleting '{}'", key);
        self.backend.delete(key).await
    }

    /// Clears every entry through whichever flush operation the client exposes.
    pub async fn flush(&self) -> Result<()> {
        match self.backend.flush_capability() {
            FlushCapability::FlushAll => {
                tracing::trace!("Flushing via flush_all");
                self.backend.flush_all().await
            }
            FlushCapability::Flush => {
                tracing::trace!("Flushing via flush");
                self.backend.flush().await
            }
        }
    }
}

impl<V> Clone for CacheAdapter<V> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            variant: self.variant,
            expires_edge: self.expires_edge,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<V> Debug for CacheAdapter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAdapter")
            .field("variant", &self.variant)
            .field("expires_edge", &self.expires_edge)
            .field("backend", &"<dyn MemcacheClient>")
            .finish()
    }
}
