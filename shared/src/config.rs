use crate::EXPIRES_EDGE;
use tracing::{info, warn};

pub struct Config {
    pub expires_edge: i64,
    pub client_variant: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expires_edge: EXPIRES_EDGE,
            client_variant: None,
        }
    }
}

impl Config {
    /// Loads a `.env` file when present, then reads the environment.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(_) => info!("Loaded environment variables from .env file"),
            Err(_) => info!("No .env file found, using system environment variables"),
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let expires_edge = match lookup("MEMCACHE_EXPIRES_EDGE") {
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                warn!("MEMCACHE_EXPIRES_EDGE={raw:?} is not an integer, using {EXPIRES_EDGE}");
                EXPIRES_EDGE
            }),
            None => EXPIRES_EDGE,
        };

        Self {
            expires_edge,
            client_variant: lookup("MEMCACHE_CLIENT_VARIANT")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}
