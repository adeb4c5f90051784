//! Engine statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of an engine's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Successful `compress` calls.
    pub compress_calls: u64,
    /// Successful `decompress` calls.
    pub decompress_calls: u64,
    /// Bytes fed to `compress`.
    pub bytes_in: u64,
    /// Frame bytes produced by `compress`.
    pub bytes_out: u64,
    /// Bytes produced by `decompress`.
    pub bytes_decompressed: u64,
    /// Matches emitted by the LZ77 driver.
    pub matches: u64,
    /// Literals emitted by the LZ77 driver.
    pub literals: u64,
    /// Total compression time in nanoseconds.
    pub compress_time_ns: u64,
    /// Total decompression time in nanoseconds.
    pub decompress_time_ns: u64,
}

impl EngineStats {
    /// Input bytes per frame byte; 1.0 before anything was compressed.
    #[must_use]
    pub fn overall_ratio(&self) -> f64 {
        if self.bytes_out == 0 {
            return 1.0;
        }
        self.bytes_in as f64 / self.bytes_out as f64
    }

    /// Compression throughput in bytes per second.
    #[must_use]
    pub fn compress_throughput(&self) -> f64 {
        if self.compress_time_ns == 0 {
            return 0.0;
        }
        self.bytes_in as f64 / (self.compress_time_ns as f64 / 1e9)
    }

    /// Decompression throughput in output bytes per second.
    #[must_use]
    pub fn decompress_throughput(&self) -> f64 {
        if self.decompress_time_ns == 0 {
            return 0.0;
        }
        self.bytes_decompressed as f64 / (self.decompress_time_ns as f64 / 1e9)
    }
}

#[derive(Debug, Default)]
pub(crate) struct AtomicStats {
    compress_calls: AtomicU64,
    decompress_calls: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
    bytes_decompressed: AtomicU64,
    matches: AtomicU64,
    literals: AtomicU64,
    compress_time_ns: AtomicU64,
    decompress_time_ns: AtomicU64,
}

impl AtomicStats {
    pub(crate) fn record_compress(
        &self,
        bytes_in: usize,
        bytes_out: usize,
        matches: u64,
        literals: u64,
        ns: u64,
    ) {
        self.compress_calls.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes_in as u64, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes_out as u64, Ordering::Relaxed);
        self.matches.fetch_add(matches, Ordering::Relaxed);
        self.literals.fetch_add(literals, Ordering::Relaxed);
        self.compress_time_ns.fetch_add(ns, Ordering::Relaxed);
    }

    pub(crate) fn record_decompress(&self, bytes: usize, ns: u64) {
        self.decompress_calls.fetch_add(1, Ordering::Relaxed);
        self.bytes_decompressed.fetch_add(bytes as u64, Ordering::Relaxed);
        self.decompress_time_ns.fetch_add(ns, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EngineStats {
        EngineStats {
            compress_calls: self.compress_calls.load(Ordering::Relaxed),
            decompress_calls: self.decompress_calls.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            bytes_decompressed: self.bytes_decompressed.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            literals: self.literals.load(Ordering::Relaxed),
            compress_time_ns: self.compress_time_ns.load(Ordering::Relaxed),
            decompress_time_ns: self.decompress_time_ns.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.compress_calls,
            &self.decompress_calls,
            &self.bytes_in,
            &self.bytes_out,
            &self.bytes_decompressed,
            &self.matches,
            &self.literals,
            &self.compress_time_ns,
            &self.decompress_time_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
