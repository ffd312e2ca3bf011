pub use crate::config::RingConfig;
pub use crate::hasher::{KeyedHasher, siphash64_seed};
pub use crate::ring::{Ring, RingError};
