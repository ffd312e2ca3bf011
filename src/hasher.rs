use std::hash::Hasher;

use siphasher::sip::SipHasher24;

/// Keyed hash function used to place buckets and keys on the ring.
///
/// Implementations must behave as an independent pseudorandom function per
/// seed: the same bytes hashed under two different seeds must produce
/// uncorrelated values. A SipHash-family primitive satisfies this; see
/// [`siphash64_seed`]. The ring reserves seed 0 for bucket placement.
pub trait KeyedHasher: Send + Sync {
    fn hash(&self, bytes: &[u8], seed: u64) -> u64;
}

impl<F> KeyedHasher for F
where
    F: Fn(&[u8], u64) -> u64 + Send + Sync,
{
    fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        self(bytes, seed)
    }
}

/// SipHash-2-4 keyed by `(seed, 0)`.
pub fn siphash64_seed(bytes: &[u8], seed: u64) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(seed, 0);
    hasher.write(bytes);
    hasher.finish()
}
