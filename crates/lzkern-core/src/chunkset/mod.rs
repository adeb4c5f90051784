//! Chunked copy and memset for back-reference expansion.
//!
//! A back-reference `(dist, len)` copies `len` bytes from `dist` bytes behind
//! the output cursor. When `dist < len` the source and destination overlap
//! and the copy must replicate a pattern of period `dist`; a plain `memcpy`
//! would silently corrupt the output. The engine picks a strategy from the
//! distance:
//!
//! * `dist` in {1, 2, 4, 8} or equal to the chunk width: broadcast the
//!   pattern into one chunk and store it repeatedly.
//! * other `dist` below the chunk width: [`engine::chunk_unroll`] doubles the
//!   distance with short copies, then chunked copy takes over.
//! * `dist` at least the chunk width: chunked copy straight away.
//!
//! The raw-pointer engine lives in [`engine`]; [`copy_match`] is the checked
//! slice entry point used by the decoder.

/// Instantiate the engine for one chunk type, optionally under a
/// `#[target_feature]`, as plain `unsafe fn`s a functable can point at.
macro_rules! entry_points {
    ($chunk:ty $(, $feature:literal)?) => {
        $(#[target_feature(enable = $feature)])?
        pub(crate) unsafe fn chunk_copy(out: *mut u8, from: *const u8, len: usize) -> *mut u8 {
            $crate::chunkset::engine::chunk_copy::<$chunk>(out, from, len)
        }

        $(#[target_feature(enable = $feature)])?
        pub(crate) unsafe fn chunk_copy_safe(
            out: *mut u8,
            from: *const u8,
            len: usize,
            safe_limit: *mut u8,
        ) -> *mut u8 {
            $crate::chunkset::engine::chunk_copy_safe::<$chunk>(out, from, len, safe_limit)
        }

        $(#[target_feature(enable = $feature)])?
        pub(crate) unsafe fn chunk_unroll(
            out: *mut u8,
            dist: &mut usize,
            len: &mut usize,
        ) -> *mut u8 {
            $crate::chunkset::engine::chunk_unroll::<$chunk>(out, dist, len)
        }

        $(#[target_feature(enable = $feature)])?
        pub(crate) unsafe fn chunk_memset(out: *mut u8, dist: usize, len: usize) -> *mut u8 {
            $crate::chunkset::engine::chunk_memset::<$chunk>(out, dist, len)
        }

        $(#[target_feature(enable = $feature)])?
        pub(crate) unsafe fn chunk_memset_safe(
            out: *mut u8,
            dist: usize,
            len: usize,
            safe_limit: *mut u8,
        ) -> *mut u8 {
            $crate::chunkset::engine::chunk_memset_safe::<$chunk>(out, dist, len, safe_limit)
        }
    };
}

pub mod engine;
pub(crate) mod scalar;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;
#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;
#[cfg(target_arch = "x86_64")]
pub(crate) mod sse2;

pub use scalar::ScalarChunk;

use crate::functable::Functable;
use crate::{Error, Result};

/// One SIMD-register-sized copy granule.
///
/// # Safety
///
/// Implementations perform unaligned loads and stores of exactly
/// [`Chunk::SIZE`] bytes; callers guarantee those bytes are accessible and
/// that the CPU supports the implementation's instruction set.
pub unsafe trait Chunk: Copy {
    /// Width in bytes.
    const SIZE: usize;

    /// Load `SIZE` bytes from `src`.
    ///
    /// # Safety
    ///
    /// `src..src + SIZE` must be readable.
    unsafe fn load(src: *const u8) -> Self;

    /// Store `SIZE` bytes to `dst`.
    ///
    /// # Safety
    ///
    /// `dst..dst + SIZE` must be writable.
    unsafe fn store(self, dst: *mut u8);

    /// Replicate the byte at `from` across the chunk.
    ///
    /// # Safety
    ///
    /// `from` must be readable.
    unsafe fn broadcast_1(from: *const u8) -> Self;

    /// Replicate the 2 bytes at `from` across the chunk.
    ///
    /// # Safety
    ///
    /// `from..from + 2` must be readable.
    unsafe fn broadcast_2(from: *const u8) -> Self;

    /// Replicate the 4 bytes at `from` across the chunk.
    ///
    /// # Safety
    ///
    /// `from..from + 4` must be readable.
    unsafe fn broadcast_4(from: *const u8) -> Self;

    /// Replicate the 8 bytes at `from` across the chunk.
    ///
    /// # Safety
    ///
    /// `from..from + 8` must be readable.
    unsafe fn broadcast_8(from: *const u8) -> Self;
}

/// Expand the back-reference `(dist, len)` at `buf[pos..]` and return the new
/// cursor `pos + len`.
///
/// Uses the dispatched fast path while at least one chunk of slack remains
/// past the run and the bounded path near the end of `buf`, so it never writes
/// outside `buf`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `dist` is zero or reaches before the
/// start of `buf`, or the run does not fit in `buf`.
pub fn copy_match(ft: &Functable, buf: &mut [u8], pos: usize, dist: usize, len: usize) -> Result<usize> {
    if dist == 0 || dist > pos {
        return Err(Error::InvalidInput(format!(
            "distance {dist} invalid at position {pos}"
        )));
    }
    let left = buf.len().saturating_sub(pos);
    if len > left {
        return Err(Error::InvalidInput(format!(
            "run of {len} bytes at {pos} exceeds buffer of {}",
            buf.len()
        )));
    }

    // SAFETY: 0 < dist <= pos keeps the source inside `buf`; the fast path is
    // only taken with `len + chunk_size` bytes of room, the safe path is
    // bounded by the end of `buf`.
    unsafe {
        let base = buf.as_mut_ptr();
        let out = base.add(pos);
        if left >= len + ft.chunk_size() {
            ft.chunk_memset(out, dist, len);
        } else {
            ft.chunk_memset_safe(out, dist, len, base.add(buf.len()));
        }
    }
    Ok(pos + len)
}
