//! CLI command implementations.

mod benchmark;
mod checksum;
mod compress;
mod info;

pub use benchmark::{benchmark, BenchmarkArgs};
pub use checksum::{checksum, ChecksumArgs};
pub use compress::{compress, decompress, CompressArgs, DecompressArgs};
pub use info::info;
