//! Compression engine facade.

use std::time::Instant;

use crate::deflate::{self, Params, Strategy, Token};
use crate::functable::Functable;
use crate::stats::{AtomicStats, EngineStats};
use crate::{frame, inflate, simd, Error, Result, SimdBackend};

/// Builder for an [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    params: Params,
    preferred_backend: Option<SimdBackend>,
}

impl EngineBuilder {
    /// Defaults: level 6, default strategy, 32 KiB window, best backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression level (0-9).
    #[must_use]
    pub fn level(mut self, level: u8) -> Self {
        self.params.level = level;
        self
    }

    /// Set the match strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.params.strategy = strategy;
        self
    }

    /// Set the window size as a power of two (9-15).
    #[must_use]
    pub fn window_bits(mut self, bits: u8) -> Self {
        self.params.window_bits = bits;
        self
    }

    /// Force a SIMD backend instead of the detected one.
    #[must_use]
    pub fn prefer_backend(mut self, backend: SimdBackend) -> Self {
        self.preferred_backend = Some(backend);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for out-of-range parameters and
    /// [`Error::SimdNotAvailable`] if the preferred backend cannot run here.
    pub fn build(self) -> Result<Engine> {
        self.params.validate()?;
        let backend = self.preferred_backend.unwrap_or_else(simd::best_backend);
        let ft = Functable::for_backend(backend)?;
        tracing::debug!(
            backend = backend.as_str(),
            level = self.params.level,
            strategy = self.params.strategy.as_str(),
            window_bits = self.params.window_bits,
            "engine built"
        );
        Ok(Engine {
            params: self.params,
            ft,
            stats: AtomicStats::default(),
        })
    }
}

/// A configured compressor and decompressor.
///
/// `Engine` is `Send + Sync`; one instance can serve many threads, each call
/// running an independent session.
#[derive(Debug)]
pub struct Engine {
    params: Params,
    ft: Functable,
    stats: AtomicStats,
}

impl Engine {
    /// Compress `data` into a frame.
    ///
    /// # Errors
    ///
    /// Propagates driver errors; with validated parameters there are none in
    /// practice.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();

        let tokens = deflate::deflate(&self.ft, &self.params, data)?;
        let adler = self.ft.adler32(1, data);
        let out = frame::encode(&tokens, self.params.window_bits, data.len(), adler);

        let matches = tokens
            .iter()
            .filter(|t| matches!(t, Token::Match { .. }))
            .count() as u64;
        let literals = tokens.len() as u64 - matches;
        let elapsed = start.elapsed().as_nanos() as u64;
        self.stats
            .record_compress(data.len(), out.len(), matches, literals, elapsed);

        Ok(out)
    }

    /// Decompress a frame produced by any engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptedData`] if the frame is malformed or its
    /// checksum does not match.
    pub fn decompress(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();
        let out = inflate::inflate(&self.ft, frame)?;
        self.stats
            .record_decompress(out.len(), start.elapsed().as_nanos() as u64);
        Ok(out)
    }

    /// Decompress into a caller buffer and return the decoded length.
    ///
    /// # Errors
    ///
    /// As [`Engine::decompress`], plus [`Error::BufferTooSmall`] when `out`
    /// cannot hold the result.
    pub fn decompress_into(&self, frame: &[u8], out: &mut [u8]) -> Result<usize> {
        let (header, _, _) = frame::parse(frame)?;
        let needed = usize::try_from(header.original_len).unwrap_or(usize::MAX);
        if needed > out.len() {
            return Err(Error::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }
        let data = self.decompress(frame)?;
        out[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    /// Adler-32 of `data` with this engine's kernel.
    #[must_use]
    pub fn checksum(&self, data: &[u8]) -> u32 {
        self.ft.adler32(1, data)
    }

    /// Backend in use.
    #[must_use]
    pub fn backend(&self) -> SimdBackend {
        self.ft.backend()
    }

    /// Parameters in use.
    #[must_use]
    pub fn params(&self) -> Params {
        self.params
    }

    /// Function table in use.
    #[must_use]
    pub fn functable(&self) -> &Functable {
        &self.ft
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats.snapshot()
    }

    /// Zero all counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}
