//! Runtime dispatch of the hot primitives.
//!
//! A [`Functable`] is a bundle of function pointers, one per primitive, all
//! chosen for the same [`SimdBackend`]. The process-wide table is built once
//! from CPU detection and memoised; [`Functable::for_backend`] builds explicit
//! tables for forced backends and for cross-checking kernels in tests.

use std::sync::OnceLock;

use crate::insert_string::{self, HashKind};
use crate::simd::{is_available, SimdFeatures};
use crate::{adler32, chunkset, compare258, slide_hash};
use crate::{Error, Result, SimdBackend, MAX_MATCH};

type CopyFn = unsafe fn(*mut u8, *const u8, usize) -> *mut u8;
type CopySafeFn = unsafe fn(*mut u8, *const u8, usize, *mut u8) -> *mut u8;
type UnrollFn = unsafe fn(*mut u8, &mut usize, &mut usize) -> *mut u8;
type MemsetFn = unsafe fn(*mut u8, usize, usize) -> *mut u8;
type MemsetSafeFn = unsafe fn(*mut u8, usize, usize, *mut u8) -> *mut u8;

/// Function pointers for one backend.
#[derive(Debug, Clone, Copy)]
pub struct Functable {
    backend: SimdBackend,
    chunk_size: usize,
    hash_kind: HashKind,
    adler32: fn(u32, &[u8]) -> u32,
    slide_hash_chain: fn(&mut [u16], u16),
    compare256: fn(&[u8; 256], &[u8; 256]) -> usize,
    update_hash: fn(u32) -> u32,
    chunk_copy: CopyFn,
    chunk_copy_safe: CopySafeFn,
    chunk_unroll: UnrollFn,
    chunk_memset: MemsetFn,
    chunk_memset_safe: MemsetSafeFn,
}

static FUNCTABLE: OnceLock<Functable> = OnceLock::new();

/// The process-wide table for the best backend this CPU supports.
pub fn functable() -> &'static Functable {
    FUNCTABLE.get_or_init(|| {
        let features = SimdFeatures::detect();
        let ft = Functable::for_features(crate::simd::backend_for(&features), &features);
        tracing::debug!(
            backend = ft.backend.as_str(),
            chunk_size = ft.chunk_size,
            hash = ft.hash_kind.as_str(),
            "functable initialised"
        );
        ft
    })
}

impl Functable {
    /// Build the table for `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SimdNotAvailable`] if this CPU cannot run `backend`.
    pub fn for_backend(backend: SimdBackend) -> Result<Self> {
        if !is_available(backend) {
            return Err(Error::SimdNotAvailable(backend));
        }
        Ok(Self::for_features(backend, &SimdFeatures::detect()))
    }

    fn scalar() -> Self {
        Self {
            backend: SimdBackend::Scalar,
            chunk_size: 8,
            hash_kind: HashKind::Multiplicative,
            adler32: adler32::generic::adler32,
            slide_hash_chain: slide_hash::rust::slide_hash_chain,
            compare256: compare258::rust::compare256,
            update_hash: insert_string::update_hash,
            chunk_copy: chunkset::scalar::chunk_copy,
            chunk_copy_safe: chunkset::scalar::chunk_copy_safe,
            chunk_unroll: chunkset::scalar::chunk_unroll,
            chunk_memset: chunkset::scalar::chunk_memset,
            chunk_memset_safe: chunkset::scalar::chunk_memset_safe,
        }
    }

    // `backend` has already been checked against `features`.
    #[allow(unused_variables)]
    fn for_features(backend: SimdBackend, features: &SimdFeatures) -> Self {
        let scalar = Self::scalar();
        match backend {
            SimdBackend::Scalar => scalar,
            #[cfg(target_arch = "x86_64")]
            SimdBackend::Sse2 => Self {
                backend,
                chunk_size: 16,
                slide_hash_chain: slide_hash::sse2::slide_hash_chain,
                compare256: compare258::sse2::compare256,
                ..scalar.with_sse2_chunks()
            },
            #[cfg(target_arch = "x86_64")]
            SimdBackend::Sse42 => Self {
                backend,
                chunk_size: 16,
                hash_kind: HashKind::Crc32,
                adler32: adler32::ssse3::adler32,
                slide_hash_chain: slide_hash::sse2::slide_hash_chain,
                compare256: compare258::sse2::compare256,
                update_hash: insert_string::sse42::update_hash,
                ..scalar.with_sse2_chunks()
            },
            #[cfg(target_arch = "x86_64")]
            SimdBackend::Avx2 => {
                let (hash_kind, update_hash): (HashKind, fn(u32) -> u32) = if features.sse42 {
                    (HashKind::Crc32, insert_string::sse42::update_hash)
                } else {
                    (HashKind::Multiplicative, insert_string::update_hash)
                };
                Self {
                    backend,
                    chunk_size: 32,
                    hash_kind,
                    adler32: adler32::avx2::adler32,
                    slide_hash_chain: slide_hash::avx2::slide_hash_chain,
                    compare256: compare258::avx2::compare256,
                    update_hash,
                    chunk_copy: chunkset::avx2::chunk_copy,
                    chunk_copy_safe: chunkset::avx2::chunk_copy_safe,
                    chunk_unroll: chunkset::avx2::chunk_unroll,
                    chunk_memset: chunkset::avx2::chunk_memset,
                    chunk_memset_safe: chunkset::avx2::chunk_memset_safe,
                }
            }
            #[cfg(target_arch = "aarch64")]
            SimdBackend::Neon => {
                let (hash_kind, update_hash): (HashKind, fn(u32) -> u32) = if features.crc32 {
                    (HashKind::Crc32, insert_string::acle::update_hash)
                } else {
                    (HashKind::Multiplicative, insert_string::update_hash)
                };
                Self {
                    backend,
                    chunk_size: 16,
                    hash_kind,
                    adler32: adler32::neon::adler32,
                    slide_hash_chain: slide_hash::neon::slide_hash_chain,
                    compare256: compare258::neon::compare256,
                    update_hash,
                    chunk_copy: chunkset::neon::chunk_copy,
                    chunk_copy_safe: chunkset::neon::chunk_copy_safe,
                    chunk_unroll: chunkset::neon::chunk_unroll,
                    chunk_memset: chunkset::neon::chunk_memset,
                    chunk_memset_safe: chunkset::neon::chunk_memset_safe,
                }
            }
            // unreachable after the availability check on this architecture
            #[allow(unreachable_patterns)]
            _ => scalar,
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn with_sse2_chunks(self) -> Self {
        Self {
            chunk_copy: chunkset::sse2::chunk_copy,
            chunk_copy_safe: chunkset::sse2::chunk_copy_safe,
            chunk_unroll: chunkset::sse2::chunk_unroll,
            chunk_memset: chunkset::sse2::chunk_memset,
            chunk_memset_safe: chunkset::sse2::chunk_memset_safe,
            ..self
        }
    }

    /// Backend these pointers were chosen for.
    #[must_use]
    pub fn backend(&self) -> SimdBackend {
        self.backend
    }

    /// Chunk width in bytes; also the over-write slack of the fast copy path.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash family installed for string insertion.
    #[must_use]
    pub fn hash_kind(&self) -> HashKind {
        self.hash_kind
    }

    /// Adler-32 of `data` continuing from `adler`.
    #[inline]
    #[must_use]
    pub fn adler32(&self, adler: u32, data: &[u8]) -> u32 {
        (self.adler32)(adler, data)
    }

    /// Slide both hash chains down by `wsize`.
    #[inline]
    pub fn slide_hash(&self, head: &mut [u16], prev: &mut [u16], wsize: u16) {
        (self.slide_hash_chain)(head, wsize);
        (self.slide_hash_chain)(prev, wsize);
    }

    /// Common prefix length of two 258-byte runs.
    #[inline]
    #[must_use]
    pub fn compare258(&self, src0: &[u8; MAX_MATCH], src1: &[u8; MAX_MATCH]) -> usize {
        compare258::compare258_with(src0, src1, self.compare256)
    }

    /// Common prefix length of two 256-byte runs.
    #[inline]
    #[must_use]
    pub fn compare256(&self, src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        (self.compare256)(src0, src1)
    }

    /// Hash a 32-bit window word; the result is masked by the caller.
    #[inline]
    #[must_use]
    pub fn update_hash(&self, val: u32) -> u32 {
        (self.update_hash)(val)
    }

    /// See [`chunkset::engine::chunk_copy`].
    ///
    /// # Safety
    ///
    /// As for the engine function.
    #[inline]
    pub unsafe fn chunk_copy(&self, out: *mut u8, from: *const u8, len: usize) -> *mut u8 {
        (self.chunk_copy)(out, from, len)
    }

    /// See [`chunkset::engine::chunk_copy_safe`].
    ///
    /// # Safety
    ///
    /// As for the engine function.
    #[inline]
    pub unsafe fn chunk_copy_safe(
        &self,
        out: *mut u8,
        from: *const u8,
        len: usize,
        safe_limit: *mut u8,
    ) -> *mut u8 {
        (self.chunk_copy_safe)(out, from, len, safe_limit)
    }

    /// See [`chunkset::engine::chunk_unroll`].
    ///
    /// # Safety
    ///
    /// As for the engine function.
    #[inline]
    pub unsafe fn chunk_unroll(&self, out: *mut u8, dist: &mut usize, len: &mut usize) -> *mut u8 {
        (self.chunk_unroll)(out, dist, len)
    }

    /// See [`chunkset::engine::chunk_memset`].
    ///
    /// # Safety
    ///
    /// As for the engine function.
    #[inline]
    pub unsafe fn chunk_memset(&self, out: *mut u8, dist: usize, len: usize) -> *mut u8 {
        (self.chunk_memset)(out, dist, len)
    }

    /// See [`chunkset::engine::chunk_memset_safe`].
    ///
    /// # Safety
    ///
    /// As for the engine function.
    #[inline]
    pub unsafe fn chunk_memset_safe(
        &self,
        out: *mut u8,
        dist: usize,
        len: usize,
        safe_limit: *mut u8,
    ) -> *mut u8 {
        (self.chunk_memset_safe)(out, dist, len, safe_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adler32::naive_adler32;
    use crate::simd::available_backends;

    fn tables() -> Vec<Functable> {
        available_backends()
            .into_iter()
            .map(|b| Functable::for_backend(b).unwrap())
            .collect()
    }

    #[test]
    fn test_global_table_is_memoised() {
        let a: *const Functable = functable();
        let b: *const Functable = functable();
        assert_eq!(a, b);
        assert_eq!(functable().backend(), crate::simd::best_backend());
    }

    #[test]
    fn test_chunk_sizes() {
        for ft in tables() {
            let expected = match ft.backend() {
                SimdBackend::Scalar => 8,
                SimdBackend::Avx2 => 32,
                _ => 16,
            };
            assert_eq!(ft.chunk_size(), expected, "{:?}", ft.backend());
        }
    }

    #[test]
    fn test_scalar_uses_multiplicative_hash() {
        let ft = Functable::for_backend(SimdBackend::Scalar).unwrap();
        assert_eq!(ft.hash_kind(), HashKind::Multiplicative);
        assert_eq!(ft.update_hash(0x1234_5678), insert_string::update_hash(0x1234_5678));
    }

    #[test]
    fn test_unavailable_backend_rejected() {
        #[cfg(target_arch = "x86_64")]
        let missing = SimdBackend::Neon;
        #[cfg(not(target_arch = "x86_64"))]
        let missing = SimdBackend::Avx2;
        assert!(matches!(
            Functable::for_backend(missing),
            Err(Error::SimdNotAvailable(b)) if b == missing
        ));
    }

    #[test]
    fn test_backends_agree_on_adler32() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i ^ (i >> 5)) as u8).collect();
        let expected = naive_adler32(1, &data);
        for ft in tables() {
            assert_eq!(ft.adler32(1, &data), expected, "{:?}", ft.backend());
        }
    }

    #[test]
    fn test_backends_agree_on_compare258() {
        let a = [0x33u8; MAX_MATCH];
        for ft in tables() {
            for pos in [0, 1, 2, 3, 100, 257] {
                let mut b = a;
                b[pos] ^= 1;
                assert_eq!(ft.compare258(&a, &b), pos, "{:?}", ft.backend());
            }
            assert_eq!(ft.compare258(&a, &a), MAX_MATCH);
        }
    }

    #[test]
    fn test_backends_agree_on_slide() {
        for ft in tables() {
            let mut head: Vec<u16> = (0..1000u16).map(|i| i.wrapping_mul(77)).collect();
            let mut prev = head.clone();
            let expected: Vec<u16> = head.iter().map(|v| v.saturating_sub(300)).collect();
            ft.slide_hash(&mut head, &mut prev, 300);
            assert_eq!(head, expected);
            assert_eq!(prev, expected);
        }
    }

    #[test]
    fn test_chunk_unroll_entry() {
        for ft in tables() {
            let mut buf = vec![0u8; 128];
            buf[..3].copy_from_slice(b"xyz");
            let (mut dist, mut len) = (3usize, 100usize);
            unsafe {
                let out = buf.as_mut_ptr().add(3);
                let end = ft.chunk_unroll(out, &mut dist, &mut len);
                let produced = end.offset_from(out) as usize;
                let end = ft.chunk_copy(end, end.sub(dist), len);
                assert_eq!(end.offset_from(out) as usize, produced + len);
            }
            for i in 3..103 {
                assert_eq!(buf[i], buf[i - 3], "{:?} at {i}", ft.backend());
            }
        }
    }

    #[test]
    fn test_chunk_copy_safe_entry() {
        for ft in tables() {
            let src: Vec<u8> = (0..64u8).collect();
            let mut dst = vec![0u8; 64];
            unsafe {
                let base = dst.as_mut_ptr();
                ft.chunk_copy_safe(base, src.as_ptr(), 64, base.add(40));
            }
            assert_eq!(&dst[..40], &src[..40]);
            assert!(dst[40..].iter().all(|&b| b == 0));
        }
    }
}
