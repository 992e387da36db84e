// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Miss reported as an error by clients that do so.
    #[error("not found")]
    NotFound,
    /// Client could not reach or lost its server.
    #[error("connection: {0}")]
    Connection(String),
    /// Server replied with something the client could not interpret.
    #[error("protocol: {0}")]
    Protocol(String),
    /// Client failed to encode or decode a value.
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Any other client failure.
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Relative expiry requested by a caller, in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiresIn(pub i64);

/// Expiry argument handed to a memcache client: relative seconds below the
/// edge, an absolute Unix timestamp at or above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exptime(pub i64);

/// 30 days in seconds. Memcache treats smaller expiry values as relative.
pub const EXPIRES_EDGE: i64 = 60 * 60 * 24 * 30;

pub mod config;
