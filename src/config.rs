use crate::ring::RingError;

/// Configuration for a multi-probe hash ring
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Estimate of the eventual bucket count, used only to size the prefix
    /// index (it does not pre-register any buckets)
    pub bucket_count_hint: usize,
    /// Number of bucket labels returned per lookup
    pub replication_factor: usize,
    /// Number of probe positions derived per key; must be at least
    /// `replication_factor`
    pub probe_count: usize,
    /// Seeds for the two per-key hash streams. Seed 0 is reserved for
    /// bucket placement and should not appear here.
    pub seeds: [u64; 2],
}

impl RingConfig {
    /// Default number of probes per lookup. 21 probes keep the
    /// peak-to-average bucket load near 1.1; probes are synthesized from
    /// two hash evaluations, so a higher count costs successor scans
    /// rather than extra hashing.
    pub const DEFAULT_PROBE_COUNT: usize = 21;

    /// Create a ring configuration with the default probe count
    pub fn new(bucket_count_hint: usize, replication_factor: usize, seeds: [u64; 2]) -> Self {
        Self {
            bucket_count_hint,
            replication_factor,
            probe_count: Self::DEFAULT_PROBE_COUNT,
            seeds,
        }
    }

    /// Create a ring configuration with an explicit probe count
    pub fn with_probe_count(
        bucket_count_hint: usize,
        replication_factor: usize,
        seeds: [u64; 2],
        probe_count: usize,
    ) -> Self {
        Self {
            bucket_count_hint,
            replication_factor,
            probe_count,
            seeds,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RingError> {
        if self.replication_factor < 1 {
            return Err(RingError::InvalidReplicationFactor);
        }

        if self.probe_count < self.replication_factor {
            return Err(RingError::TooFewProbes {
                probe_count: self.probe_count,
                replication_factor: self.replication_factor,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_probe_count() {
        let config = RingConfig::new(100, 3, [1, 2]);
        assert_eq!(config.probe_count, RingConfig::DEFAULT_PROBE_COUNT);
        assert_eq!(config.replication_factor, 3);
    }

    #[test]
    fn test_validate_rejects_zero_replication() {
        let config = RingConfig::new(100, 0, [1, 2]);
        assert_eq!(config.validate(), Err(RingError::InvalidReplicationFactor));
    }

    #[test]
    fn test_validate_rejects_probe_count_below_replication() {
        let config = RingConfig::with_probe_count(100, 3, [1, 2], 2);
        assert_eq!(
            config.validate(),
            Err(RingError::TooFewProbes {
                probe_count: 2,
                replication_factor: 3,
            })
        );
    }

    #[test]
    fn test_validate_accepts_probe_count_equal_to_replication() {
        let config = RingConfig::with_probe_count(100, 3, [1, 2], 3);
        assert_eq!(config.validate(), Ok(()));
    }
}
