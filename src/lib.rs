pub mod extendible_hashing;
pub mod utils;

pub use extendible_hashing::bucket::Bucket;
pub use extendible_hashing::directory::{Directory, IndexError};
pub use extendible_hashing::{Record, MAX_GLOBAL_DEPTH};
