/// Target average number of bucket hashes per prefix slot. Finer
/// partitioning shortens the successor scan but costs more slots.
const TARGET_SLOT_OCCUPANCY: usize = 6;

/// Position of the highest set bit plus one; 0 for `v = 0`.
fn bit_length(v: usize) -> u32 {
    usize::BITS - v.leading_zeros()
}

/// Sorted index over bucket hashes on the 64-bit ring, partitioned by the
/// top `p` bits of each hash.
///
/// Every slot holds the hashes whose prefix equals the slot index, in
/// ascending order. Successor queries scan the probe's own slot and then
/// walk higher slots, so the sorted-order invariant must be restored (via
/// [`PrefixIndex::sort_slot`]) after any batch of inserts before the next
/// query.
#[derive(Debug)]
pub(crate) struct PrefixIndex {
    slots: Vec<Vec<u64>>,
    prefix_mask: u64,
    prefix_shift: u32,
}

impl PrefixIndex {
    /// Size the index for roughly `bucket_count_hint` entries, at
    /// [`TARGET_SLOT_OCCUPANCY`] entries per slot.
    pub(crate) fn with_bucket_hint(bucket_count_hint: usize) -> Self {
        let prefix_bits = bit_length(bucket_count_hint / TARGET_SLOT_OCCUPANCY);

        // A 64-bit shift by 64 is not defined, so the single-slot index
        // stores a mask that selects nothing.
        let (prefix_mask, prefix_shift) = if prefix_bits == 0 {
            (0, 0)
        } else {
            (
                ((1u64 << prefix_bits) - 1) << (64 - prefix_bits),
                64 - prefix_bits,
            )
        };

        Self {
            slots: vec![Vec::new(); 1 << prefix_bits],
            prefix_mask,
            prefix_shift,
        }
    }

    /// Slot index owning `hash`, from its high-order bits.
    pub(crate) fn slot_of(&self, hash: u64) -> usize {
        ((hash & self.prefix_mask) >> self.prefix_shift) as usize
    }

    /// Append `hash` to its slot and return the slot index. The slot is
    /// left unsorted; call [`PrefixIndex::sort_slot`] once the batch is in.
    pub(crate) fn insert(&mut self, hash: u64) -> usize {
        let slot = self.slot_of(hash);
        self.slots[slot].push(hash);
        slot
    }

    /// Restore ascending order within `slot`.
    pub(crate) fn sort_slot(&mut self, slot: usize) {
        self.slots[slot].sort_unstable();
    }

    /// Smallest entry strictly greater than `probe`, wrapping past the top
    /// of the hash space to the globally smallest entry. `None` when the
    /// index holds no entries at all.
    pub(crate) fn successor(&self, probe: u64) -> Option<u64> {
        let mut slot = self.slot_of(probe);

        loop {
            let entries = &self.slots[slot];
            let pos = entries.partition_point(|&v| v <= probe);
            if let Some(&hash) = entries.get(pos) {
                return Some(hash);
            }

            slot += 1;
            if slot == self.slots.len() {
                // Wrapped past the top of the ring: the successor is the
                // smallest entry in the lowest non-empty slot.
                return self.slots.iter().find(|s| !s.is_empty()).map(|s| s[0]);
            }
        }
    }
}
