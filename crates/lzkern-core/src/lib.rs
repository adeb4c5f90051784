//! SIMD-dispatched LZ77 primitives in the style of zlib-ng.
//!
//! The crate provides the hot inner loops of an LZ77 compressor and
//! decompressor, each with a scalar reference and SSE2/SSSE3/SSE4.2, AVX2 or
//! NEON kernels chosen at runtime:
//!
//! * [`chunkset`]: overlap-aware back-reference expansion.
//! * [`compare258`]: match length comparison.
//! * [`slide_hash`] and [`hash_chain`]: hash-chain aging and insertion.
//! * [`adler32`]: the Adler-32 checksum.
//!
//! A small LZ77 driver ([`deflate`]), a token container ([`frame`], [`inflate`])
//! and the [`Engine`] facade exercise the primitives end to end.
//!
//! # Example
//!
//! ```
//! use lzkern_core::EngineBuilder;
//!
//! let engine = EngineBuilder::new().level(6).build().unwrap();
//!
//! let data = b"abcabcabcabcabcabcabcabcabcabcabcabc".repeat(100);
//! let compressed = engine.compress(&data).unwrap();
//! let decompressed = engine.decompress(&compressed).unwrap();
//!
//! assert_eq!(data, decompressed);
//! assert!(compressed.len() < data.len());
//! ```

#![deny(missing_docs)]
#![deny(clippy::panic)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adler32;
pub mod chunkset;
pub mod compare258;
pub mod compat;
pub mod deflate;
mod engine;
mod error;
pub mod frame;
pub mod functable;
pub mod hash_chain;
pub mod inflate;
pub mod insert_string;
pub mod simd;
pub mod slide_hash;
mod stats;

pub use adler32::{adler32_combine, Adler32};
pub use deflate::{Params, Strategy, Token};
pub use engine::{Engine, EngineBuilder};
pub use error::{Error, Result};
pub use functable::{functable, Functable};
pub use stats::EngineStats;

use std::fmt;

/// Shortest back-reference worth emitting.
pub const MIN_MATCH: usize = 3;
/// Longest back-reference a single match can describe.
pub const MAX_MATCH: usize = 258;

/// SIMD implementation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimdBackend {
    /// Scalar fallback (no SIMD).
    #[default]
    Scalar,
    /// SSE2 (128-bit).
    Sse2,
    /// SSE4.2 with SSSE3 (128-bit, hardware CRC32 hash).
    Sse42,
    /// AVX2 (256-bit).
    Avx2,
    /// ARM NEON (128-bit).
    Neon,
}

impl SimdBackend {
    /// Every backend, slowest first.
    pub const ALL: [Self; 5] = [Self::Scalar, Self::Sse2, Self::Sse42, Self::Avx2, Self::Neon];

    /// Parse a backend name as used in configuration files and on the command line.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" | "generic" => Some(Self::Scalar),
            "sse2" => Some(Self::Sse2),
            "sse42" | "sse4.2" => Some(Self::Sse42),
            "avx2" => Some(Self::Avx2),
            "neon" => Some(Self::Neon),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
            Self::Sse42 => "sse42",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }
}

impl fmt::Display for SimdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
