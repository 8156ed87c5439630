use std::mem;

/// A fixed-capacity run of records sharing the same low key-hash bits.
///
/// `local_depth` is how many of those bits the bucket discriminates on. The
/// directory owns the bookkeeping that keeps it consistent with the slot
/// table; the bucket just stores it.
#[derive(Debug, Clone)]
pub struct Bucket<R> {
    pub capacity: usize,
    pub local_depth: u32,
    pub records: Vec<R>,
}

impl<R> Bucket<R> {
    pub fn new(capacity: usize, local_depth: u32) -> Self {
        Bucket {
            capacity,
            local_depth,
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /**
    Appends a record, keeping insertion order. Callers check `is_full` first;
    the directory splits a full bucket before it retries the insert.
    */
    pub fn push(&mut self, record: R) {
        debug_assert!(self.records.len() < self.capacity);
        self.records.push(record);
    }

    /// Empties the bucket and hands back its records in insertion order.
    pub fn take_records(&mut self) -> Vec<R> {
        mem::take(&mut self.records)
    }
}
