pub mod bucket;
pub mod directory;

/// Upper bound on the global depth, i.e. the directory never grows past
/// 2^MAX_GLOBAL_DEPTH slots. Splitting a bucket that already uses this many
/// hash bits cannot separate its records any further, so the split is
/// refused instead of doubling forever.
pub const MAX_GLOBAL_DEPTH: u32 = 20;

/// A payload the directory can index: anything that exposes a `u64` key.
///
/// The key of a stored record must stay stable; the directory places records
/// by hashing it and does not re-check on access.
pub trait Record {
    fn key(&self) -> u64;
}

// Bare keys are records too, mainly for tests and benches.
impl Record for u64 {
    fn key(&self) -> u64 {
        *self
    }
}
