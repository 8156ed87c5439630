use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;

use log::{debug, trace};
use thiserror::Error;

use crate::extendible_hashing::bucket::Bucket;
use crate::extendible_hashing::{Record, MAX_GLOBAL_DEPTH};
use crate::utils::hashing::calculate_hash;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Directory is at its maximum global depth {max_depth}, cannot split the bucket behind slot {slot}")]
    DepthExhausted { slot: usize, max_depth: u32 },
}

/// Extendible hash directory: a slot table of bucket handles over an arena
/// of buckets.
///
/// `slots` always holds exactly 2^global_depth handles. A bucket with local
/// depth `d` is shared by every slot agreeing on its low `d` index bits,
/// 2^(global_depth - d) slots in total. Buckets are created at construction
/// and by splits and stay in the arena for the lifetime of the directory.
#[derive(Debug)]
pub struct Directory<R> {
    /// Bucket storage (owns every bucket ever created)
    buckets: Vec<Bucket<R>>,

    /// Maps the low global_depth bits of a key hash to a bucket handle
    slots: Vec<usize>,

    /// slots.len() == 2^global_depth
    global_depth: u32,

    /// Capacity handed to every bucket this directory creates
    bucket_capacity: usize,

    /// Total records across all buckets
    len: usize,
}

impl<R: Record> Directory<R> {
    /// Creates a directory of two empty depth-1 buckets, one per low bit.
    pub fn new(bucket_capacity: usize) -> Self {
        assert!(bucket_capacity > 0, "bucket capacity must be at least 1");
        Directory {
            buckets: vec![
                Bucket::new(bucket_capacity, 1),
                Bucket::new(bucket_capacity, 1),
            ],
            slots: vec![0, 1],
            global_depth: 1,
            bucket_capacity,
            len: 0,
        }
    }

    /// Number of records
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    /// Number of directory slots, always 2^global_depth
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct buckets in the arena
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn bucket_capacity(&self) -> usize {
        self.bucket_capacity
    }

    /// Slot index for a key: the low global_depth bits of its hash.
    #[inline]
    fn slot_index(&self, key: u64) -> usize {
        let mask = (1u64 << self.global_depth) - 1;
        (calculate_hash(key) & mask) as usize
    }

    /**
    Inserts a record, splitting its target bucket as often as needed to make
    room. The slot index is recomputed on every pass because a split can
    deepen the directory. Duplicate keys are kept; lookups return the
    first-inserted one.

    Fails only when a full bucket cannot be split any further, i.e. its
    records collide on all MAX_GLOBAL_DEPTH usable hash bits.
    */
    pub fn insert(&mut self, record: R) -> Result<(), IndexError> {
        loop {
            let index = self.slot_index(record.key());
            let bucket_id = self.slots[index];
            if !self.buckets[bucket_id].is_full() {
                self.buckets[bucket_id].push(record);
                self.len += 1;
                return Ok(());
            }
            self.split(index)?;
        }
    }

    /// First record with this key, if any. Absence is a normal outcome.
    pub fn lookup(&self, key: u64) -> Option<&R> {
        let bucket = &self.buckets[self.slots[self.slot_index(key)]];
        bucket.records.iter().find(|record| record.key() == key)
    }

    /// Mutable access to the first record with this key. The caller must
    /// leave the key itself unchanged, otherwise the record ends up filed
    /// under a slot it no longer hashes to.
    pub fn lookup_mut(&mut self, key: u64) -> Option<&mut R> {
        let index = self.slot_index(key);
        let bucket_id = self.slots[index];
        self.buckets[bucket_id]
            .records
            .iter_mut()
            .find(|record| record.key() == key)
    }

    /// Removes and returns the first record with this key.
    pub fn remove(&mut self, key: u64) -> Option<R> {
        let index = self.slot_index(key);
        let bucket_id = self.slots[index];
        let bucket = &mut self.buckets[bucket_id];
        let position = bucket.records.iter().position(|record| record.key() == key)?;
        self.len -= 1;
        Some(bucket.records.remove(position))
    }

    /**
    Splits the bucket behind `slot` into two buckets one depth level deeper.

    If the bucket already uses every directory bit, the directory doubles
    first. The fresh bucket takes over the referencing slots whose new
    distinguishing bit is set, then the old bucket's records are re-placed
    across the two. Either side may come out full again; `insert` keeps
    splitting until its record fits.
    */
    pub fn split(&mut self, slot: usize) -> Result<(), IndexError> {
        let old_id = self.slots[slot];
        let old_depth = self.buckets[old_id].local_depth;
        if old_depth >= MAX_GLOBAL_DEPTH {
            return Err(IndexError::DepthExhausted {
                slot,
                max_depth: MAX_GLOBAL_DEPTH,
            });
        }
        if old_depth == self.global_depth {
            self.double_directory();
        }

        let new_depth = old_depth + 1;
        self.buckets[old_id].local_depth = new_depth;
        let new_id = self.buckets.len();
        self.buckets.push(Bucket::new(self.bucket_capacity, new_depth));
        debug!(
            "Bucket {} behind slot {} split, local depth {} -> {}",
            old_id, slot, old_depth, new_depth
        );

        // Slots whose new distinguishing bit is set move to the fresh bucket;
        // the rest keep the old one.
        let split_bit = 1usize << old_depth;
        for i in 0..self.slots.len() {
            if i & split_bit == split_bit && self.slots[i] == old_id {
                trace!("Slot {} rebound to bucket {}", i, new_id);
                self.slots[i] = new_id;
            }
        }

        // Re-place the split bucket's records. Every record lands in the old
        // bucket or the fresh one, and both have room for all of them.
        let records = self.buckets[old_id].take_records();
        for record in records {
            let index = self.slot_index(record.key());
            self.buckets[self.slots[index]].push(record);
        }
        Ok(())
    }

    /// Doubles the slot table by appending a copy of itself, so the new top
    /// index bit is ignored until some bucket splits deep enough to use it.
    fn double_directory(&mut self) {
        let size = self.slots.len();
        self.slots.reserve(size);
        for i in 0..size {
            let bucket_id = self.slots[i];
            self.slots.push(bucket_id);
        }
        self.global_depth += 1;
        debug!(
            "Directory doubled to global depth {} ({} slots)",
            self.global_depth,
            self.slots.len()
        );
    }

    /**
    Mean records per directory slot. A bucket shared by several slots counts
    once per slot, which keeps the ratio stable across directory doublings:
    doubling adds slots and bucket references in the same proportion.
    */
    pub fn load_factor(&self) -> f64 {
        let total: usize = self.slots.iter().map(|&id| self.buckets[id].len()).sum();
        total as f64 / self.slots.len() as f64
    }

    /// Slot-by-slot view of the directory: (slot index, bucket behind it).
    /// Shared buckets show up once per referencing slot.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &Bucket<R>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, &id)| (i, &self.buckets[id]))
    }

    /// Asserts the structural invariants. Cheap enough for tests and debug
    /// sessions, not meant for per-operation use.
    pub fn verify_integrity(&self) {
        assert_eq!(
            self.slots.len(),
            1 << self.global_depth,
            "Directory size {} does not match global depth {}",
            self.slots.len(),
            self.global_depth
        );

        let mut reference_counts: HashMap<usize, usize> = HashMap::new();
        for &bucket_id in &self.slots {
            *reference_counts.entry(bucket_id).or_insert(0) += 1;
        }

        for (&bucket_id, &count) in &reference_counts {
            let local_depth = self.buckets[bucket_id].local_depth;
            assert!(
                local_depth <= self.global_depth,
                "Local depth {} of bucket {} exceeds global depth {}",
                local_depth,
                bucket_id,
                self.global_depth
            );
            let expected = 1usize << (self.global_depth - local_depth);
            assert_eq!(
                count, expected,
                "Bucket {} at local depth {} is referenced by {} slots, expected {}",
                bucket_id, local_depth, count, expected
            );

            // All referencing slots must agree on the bucket's low bits.
            let mask = (1usize << local_depth) - 1;
            let mut low_bits = None;
            for (i, &id) in self.slots.iter().enumerate() {
                if id == bucket_id {
                    match low_bits {
                        None => low_bits = Some(i & mask),
                        Some(bits) => assert_eq!(
                            i & mask,
                            bits,
                            "Slot {} disagrees with bucket {}'s low bits",
                            i,
                            bucket_id
                        ),
                    }
                }
            }
        }
    }
}

impl<R: Record + Debug> fmt::Display for Directory<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Global Depth: {}", self.global_depth)?;
        for (i, bucket) in self.slots() {
            write!(
                f,
                "\nDirectory[{}]: Local Depth={}, Records={:?}",
                i, bucket.local_depth, bucket.records
            )?;
        }
        Ok(())
    }
}
