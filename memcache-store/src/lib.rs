//! Uniform get/set/delete/flush over memcache clients that disagree on miss
//! reporting, expiry encoding and the name of their flush operation.

pub mod domain;
pub mod memcache_store;
pub mod ports;

pub use domain::{ClientVariant, Clock, FixedClock, FlushCapability, SetOptions, SystemClock};
pub use memcache_store::CacheAdapter;
pub use ports::MemcacheClient;
pub use shared::{EXPIRES_EDGE, Error, Exptime, ExpiresIn, Result};
