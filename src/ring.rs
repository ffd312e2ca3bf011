use std::collections::{
    BTreeSet,
    HashMap,
    HashSet,
};

use thiserror::Error;
use tracing::debug;

use crate::{
    config::RingConfig,
    hasher::KeyedHasher,
    prefix_index::PrefixIndex,
};

/// Seed under which bucket labels are placed on the ring. Distinct from the
/// two lookup seeds so bucket positions and key probes draw from independent
/// hash streams.
const BUCKET_SEED: u64 = 0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RingError {
    #[error("replication factor must be at least 1")]
    InvalidReplicationFactor,

    #[error("probe count {probe_count} is less than replication factor {replication_factor}")]
    TooFewProbes {
        probe_count: usize,
        replication_factor: usize,
    },

    #[error("no buckets available")]
    NoBuckets,
}

/// A probe's resolved successor bucket and its distance around the ring.
#[derive(Clone, Copy)]
struct Candidate {
    hash: u64,
    distance: u64,
}

/// A multi-probe consistent hash ring.
///
/// Keys are mapped to buckets by deriving `probe_count` positions on a
/// 64-bit hash ring from two keyed hash evaluations, resolving each position
/// to its successor bucket, and keeping the `replication_factor` closest.
/// Unlike a vnode ring, load is evened out by probing many positions per key
/// rather than placing many replicas per bucket, so each bucket is hashed
/// exactly once.
///
/// Lookups take `&self` and mutation takes `&mut self`; callers that share a
/// ring across threads must wrap it in an external lock.
pub struct Ring {
    replication_factor: usize,
    probe_count: usize,
    seeds: [u64; 2],
    hasher: Box<dyn KeyedHasher>,
    index: PrefixIndex,
    buckets: HashMap<u64, String>,
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("replication_factor", &self.replication_factor)
            .field("probe_count", &self.probe_count)
            .field("seeds", &self.seeds)
            .field("hasher", &"<dyn KeyedHasher>")
            .field("index", &self.index)
            .field("buckets", &self.buckets)
            .finish()
    }
}

impl Ring {
    /// Create an empty ring from `config`, placing buckets and keys with
    /// `hasher`.
    pub fn new(config: RingConfig, hasher: impl KeyedHasher + 'static) -> Result<Self, RingError> {
        config.validate()?;

        Ok(Self {
            replication_factor: config.replication_factor,
            probe_count: config.probe_count,
            seeds: config.seeds,
            hasher: Box::new(hasher),
            index: PrefixIndex::with_bucket_hint(config.bucket_count_hint),
            buckets: HashMap::with_capacity(config.bucket_count_hint),
        })
    }

    /// Register bucket labels on the ring.
    ///
    /// Each label is hashed once under the bucket seed and appended to its
    /// prefix slot; touched slots are re-sorted afterwards so successor
    /// scans stay correct. Re-adding a label leaves a duplicate entry in its
    /// slot and must be avoided by the caller. If two distinct labels
    /// collide on the same 64-bit hash, the later registration shadows the
    /// earlier label.
    pub fn add<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut touched = BTreeSet::new();

        for label in labels {
            let label = label.into();
            let hash = self.hasher.hash(label.as_bytes(), BUCKET_SEED);
            touched.insert(self.index.insert(hash));
            debug!(bucket = %label, hash, "registered bucket");
            self.buckets.insert(hash, label);
        }

        for slot in touched {
            self.index.sort_slot(slot);
        }
    }

    /// Resolve `key` to the `replication_factor` closest buckets, ordered by
    /// ascending ring distance.
    ///
    /// Selection is over probe results, not distinct buckets, so the same
    /// label can appear more than once when several probes resolve to the
    /// same successor. Use [`Ring::hash_distinct`] when physical targets
    /// must not repeat.
    pub fn hash(&self, key: &[u8]) -> Result<Vec<String>, RingError> {
        if self.buckets.is_empty() {
            return Err(RingError::NoBuckets);
        }

        let mut selected = vec![
            Candidate {
                hash: 0,
                distance: u64::MAX,
            };
            self.replication_factor
        ];

        for candidate in self.probes(key) {
            let worst = self.replication_factor - 1;
            if candidate.distance < selected[worst].distance {
                selected[worst] = candidate;
                selected.sort_unstable_by_key(|c| c.distance);
            }
        }

        Ok(selected.iter().map(|c| self.label_of(c.hash)).collect())
    }

    /// Resolve `key` to at most `replication_factor` distinct buckets,
    /// ordered by ascending ring distance.
    ///
    /// Probe results are considered closest-first and buckets already
    /// selected are skipped, so fewer labels than `replication_factor` are
    /// returned when the ring holds fewer distinct buckets.
    pub fn hash_distinct(&self, key: &[u8]) -> Result<Vec<String>, RingError> {
        if self.buckets.is_empty() {
            return Err(RingError::NoBuckets);
        }

        let mut candidates: Vec<Candidate> = self.probes(key).collect();
        candidates.sort_unstable_by_key(|c| c.distance);

        let mut seen = HashSet::new();
        let mut labels = Vec::with_capacity(self.replication_factor);
        for candidate in candidates {
            if seen.insert(candidate.hash) {
                labels.push(self.label_of(candidate.hash));
                if labels.len() == self.replication_factor {
                    break;
                }
            }
        }

        Ok(labels)
    }

    /// Whether any bucket is registered.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct registered bucket hashes.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Registered bucket labels, in no particular order. Callers that
    /// rebuild rings on membership change can persist this list externally.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.values().map(String::as_str)
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    pub fn probe_count(&self) -> usize {
        self.probe_count
    }

    /// Probe positions for `key`, each resolved to its successor bucket.
    ///
    /// Positions are synthesized by double hashing: `probe_i = h1 + i * h2`
    /// in wrapping arithmetic, giving `probe_count` pseudo-independent ring
    /// positions from two hash evaluations. Requires a non-empty ring.
    fn probes(&self, key: &[u8]) -> impl Iterator<Item = Candidate> + '_ {
        let h1 = self.hasher.hash(key, self.seeds[0]);
        let h2 = self.hasher.hash(key, self.seeds[1]);

        (0..self.probe_count as u64).map(move |i| {
            let probe = h1.wrapping_add(i.wrapping_mul(h2));
            let successor = self
                .index
                .successor(probe)
                .expect("non-empty ring has a successor for every probe");
            Candidate {
                hash: successor,
                distance: successor.wrapping_sub(probe),
            }
        })
    }

    fn label_of(&self, hash: u64) -> String {
        self.buckets
            .get(&hash)
            .cloned()
            .expect("selected hash was registered")
    }
}
