use serde::{Deserialize, Serialize};
use shared::{Error, Exptime, ExpiresIn};
use std::str::FromStr;
use std::time::Duration;

/// Memcache client dialects the adapter normalizes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientVariant {
    /// Raises not-found on a miss and wants absolute timestamps for short expiries.
    Memcached,
    /// Returns an empty result on a miss and accepts relative expiries.
    MemCache,
    /// Any other client: misses pass through as returned, short expiries are made absolute.
    Generic,
}

impl ClientVariant {
    /// Whether a `NotFound` from `get` is a plain miss for this dialect.
    pub fn recovers_not_found(self) -> bool {
        matches!(self, ClientVariant::Memcached)
    }

    /// Encodes a relative expiry the way this dialect expects it.
    ///
    /// Values at or above `edge` are already absolute and pass through.
    pub fn normalize_expiry(self, expires_in: ExpiresIn, edge: i64, now_unix: i64) -> Exptime {
        let ExpiresIn(secs) = expires_in;
        if secs >= edge {
            return Exptime(secs);
        }
        match self {
            ClientVariant::MemCache => Exptime(secs),
            ClientVariant::Memcached | ClientVariant::Generic => Exptime(now_unix + secs),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClientVariant::Memcached => "memcached",
            ClientVariant::MemCache => "memcache",
            ClientVariant::Generic => "generic",
        }
    }
}

impl TryFrom<&str> for ClientVariant {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memcached" => Ok(ClientVariant::Memcached),
            "memcache" => Ok(ClientVariant::MemCache),
            "generic" => Ok(ClientVariant::Generic),
            other => Err(Error::InvalidConfig(format!(
                "unknown memcache client variant: {other}"
            ))),
        }
    }
}

impl FromStr for ClientVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientVariant::try_from(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushCapability {
    FlushAll,
    Flush,
}

/// Options recognized by `CacheAdapter::set`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOptions {
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl SetOptions {
    pub fn expires_in(secs: i64) -> Self {
        Self {
            expires_in: Some(secs),
        }
    }

    /// Sub-second precision is dropped.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::expires_in(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
    }
}

/// Source of the current Unix time used for absolute expiries.
pub trait Clock: Send + Sync + 'static {
    fn now_unix(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::EXPIRES_EDGE;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_short_expiry_per_variant() {
        let short = ExpiresIn(30);
        assert_eq!(
            ClientVariant::MemCache.normalize_expiry(short, EXPIRES_EDGE, NOW),
            Exptime(30)
        );
        assert_eq!(
            ClientVariant::Memcached.normalize_expiry(short, EXPIRES_EDGE, NOW),
            Exptime(NOW + 30)
        );
        assert_eq!(
            ClientVariant::Generic.normalize_expiry(short, EXPIRES_EDGE, NOW),
            Exptime(NOW + 30)
        );
    }

    #[test]
    fn test_expiry_at_edge_passes_through() {
        for variant in [
            ClientVariant::Memcached,
            ClientVariant::MemCache,
            ClientVariant::Generic,
        ] {
            assert_eq!(
                variant.normalize_expiry(ExpiresIn(EXPIRES_EDGE), EXPIRES_EDGE, NOW),
                Exptime(EXPIRES_EDGE)
            );
            assert_eq!(
                variant.normalize_expiry(ExpiresIn(NOW + 60), EXPIRES_EDGE, NOW),
                Exptime(NOW + 60)
            );
        }
    }

    #[test]
    fn test_custom_edge() {
        assert_eq!(
            ClientVariant::Memcached.normalize_expiry(ExpiresIn(100), 100, NOW),
            Exptime(100)
        );
        assert_eq!(
            ClientVariant::Memcached.normalize_expiry(ExpiresIn(99), 100, NOW),
            Exptime(NOW + 99)
        );
    }

    #[test]
    fn test_only_memcached_recovers_not_found() {
        assert!(ClientVariant::Memcached.recovers_not_found());
        assert!(!ClientVariant::MemCache.recovers_not_found());
        assert!(!ClientVariant::Generic.recovers_not_found());
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!(
            "Memcached".parse::<ClientVariant>().unwrap(),
            ClientVariant::Memcached
        );
        assert_eq!(
            ClientVariant::try_from(" memcache ").unwrap(),
            ClientVariant::MemCache
        );
        assert!(matches!(
            ClientVariant::try_from("dalli"),
            Err(Error::InvalidConfig(_))
        ));
        for variant in [
            ClientVariant::Memcached,
            ClientVariant::MemCache,
            ClientVariant::Generic,
        ] {
            assert_eq!(variant.as_str().parse::<ClientVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_set_options_from_json() {
        let opts: SetOptions = serde_json::from_str(r#"{"expires_in": 30}"#).unwrap();
        assert_eq!(opts, SetOptions::expires_in(30));

        let opts: SetOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, SetOptions::default());

        let variant: ClientVariant = serde_json::from_str(r#""memcache""#).unwrap();
        assert_eq!(variant, ClientVariant::MemCache);
    }

    #[test]
    fn test_with_ttl_truncates() {
        assert_eq!(
            SetOptions::with_ttl(Duration::from_millis(90_500)),
            SetOptions::expires_in(90)
        );
    }
}
