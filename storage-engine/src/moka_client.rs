use async_trait::async_trait;
use memcache_store::{ClientVariant, Clock, FlushCapability, MemcacheClient, SystemClock};
use moka::Expiry;
use moka::future::Cache;
use shared::{EXPIRES_EDGE, Error, Exptime, Result};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct StoredValue<V> {
    value: V,
    ttl: Option<Duration>,
}

/// Per-entry expiry; every write resets the clock to the new value's ttl.
struct EntryExpiry;

impl<V> Expiry<String, StoredValue<V>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

enum Lifetime {
    Forever,
    For(Duration),
    Expired,
}

/// Moka-backed memcache client living in the current process.
///
/// Speaks the dialect it is built for: a `Memcached` client reports misses
/// as `Error::NotFound`, the others return `None`. Expiry arguments follow
/// memcache rules (0 never expires, below the edge is relative seconds, at
/// or above it an absolute Unix timestamp).
pub struct InProcessClient<V>
where
    V: Send + Sync + Clone + 'static,
{
    cache: Cache<String, StoredValue<V>>,
    variant: ClientVariant,
    flush: FlushCapability,
    expires_edge: i64,
    clock: Arc<dyn Clock>,
}

impl<V> InProcessClient<V>
where
    V: Send + Sync + Clone + 'static,
{
    /// Create an unbounded client speaking `variant`
    pub fn new(variant: ClientVariant) -> Self {
        Self::build(variant, None)
    }

    /// Create a client holding at most `max_entries` entries
    pub fn new_bounded(variant: ClientVariant, max_entries: u64) -> Self {
        Self::build(variant, Some(max_entries))
    }

    fn build(variant: ClientVariant, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder()
            .name(variant.as_str())
            .expire_after(EntryExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            variant,
            flush: FlushCapability::FlushAll,
            expires_edge: EXPIRES_EDGE,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_flush_capability(mut self, flush: FlushCapability) -> Self {
        self.flush = flush;
        self
    }

    pub fn with_expires_edge(mut self, expires_edge: i64) -> Self {
        self.expires_edge = expires_edge;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn lifetime(&self, exptime: Option<Exptime>) -> Lifetime {
        let secs = match exptime {
            None | Some(Exptime(0)) => return Lifetime::Forever,
            Some(Exptime(secs)) if secs < 0 => return Lifetime::Expired,
            Some(Exptime(secs)) if secs < self.expires_edge => secs,
            Some(Exptime(at)) => at - self.clock.now_unix(),
        };

        if secs <= 0 {
            Lifetime::Expired
        } else {
            Lifetime::For(Duration::from_secs(secs.unsigned_abs()))
        }
    }

    fn clear(&self) {
        tracing::debug!("Invalidating all entries in {} client", self.variant.as_str());
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl<V> MemcacheClient<V> for InProcessClient<V>
where
    V: Send + Sync + Clone + 'static,
{
    fn variant(&self) -> ClientVariant {
        self.variant
    }

    async fn get(&self, key: &str) -> Result<Option<V>> {
        match self.cache.get(key).await {
            Some(stored) => Ok(Some(stored.value)),
            None if self.variant.recovers_not_found() => Err(Error::NotFound),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: V, exptime: Option<Exptime>) -> Result<()> {
        let ttl = match self.lifetime(exptime) {
            Lifetime::Forever => None,
            Lifetime::For(ttl) => Some(ttl),
            Lifetime::Expired => {
                // already past its expiry: behaves as an immediate eviction
                tracing::trace!("Dropping '{}' on set with expired exptime {:?}", key, exptime);
                self.cache.invalidate(key).await;
                return Ok(());
            }
        };

        self.cache
            .insert(key.to_string(), StoredValue { value, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    fn flush_capability(&self) -> FlushCapability {
        self.flush
    }

    async fn flush_all(&self) -> Result<()> {
        match self.flush {
            FlushCapability::FlushAll => {
                self.clear();
                Ok(())
            }
            FlushCapability::Flush => Err(Error::Unsupported("flush_all")),
        }
    }

    async fn flush(&self) -> Result<()> {
        match self.flush {
            FlushCapability::Flush => {
                self.clear();
                Ok(())
            }
            FlushCapability::FlushAll => Err(Error::Unsupported("flush")),
        }
    }
}

impl<V> Debug for InProcessClient<V>
where
    V: Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessClient")
            .field("variant", &self.variant)
            .field("flush", &self.flush)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
