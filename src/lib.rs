//! # lzkern
//!
//! SIMD-dispatched LZ77 primitives: chunked match copy, match-length
//! comparison, hash-chain slide, string hashing and Adler-32.
//!
//! This is the workspace root crate that re-exports core functionality.
//! For direct usage, depend on individual sub-crates:
//!
//! - [`lzkern-core`] - primitives, dispatch table, LZ77 driver and engine
//! - [`lzkern-cli`] - CLI tool (`lzkern` binary)
//!
//! ```
//! use lzkern::EngineBuilder;
//!
//! let engine = EngineBuilder::new().level(6).build()?;
//! let frame = engine.compress(&[7u8; 4096])?;
//! assert_eq!(engine.decompress(&frame)?, vec![7u8; 4096]);
//! # Ok::<(), lzkern::Error>(())
//! ```
//!
//! [`lzkern-core`]: lzkern_core
//! [`lzkern-cli`]: https://docs.rs/lzkern-cli

pub use lzkern_core::*;
