//! 32-byte AVX2 chunk.

use super::Chunk;
use std::arch::x86_64::{
    __m256i, _mm256_loadu_si256, _mm256_set1_epi16, _mm256_set1_epi32, _mm256_set1_epi64x,
    _mm256_set1_epi8, _mm256_storeu_si256,
};
use std::ptr;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Avx2Chunk(__m256i);

// SAFETY: unaligned 32-byte accesses. The methods are only reached through the
// `avx2` entry points below, which the functable installs after detection.
unsafe impl Chunk for Avx2Chunk {
    const SIZE: usize = 32;

    #[inline(always)]
    unsafe fn load(src: *const u8) -> Self {
        Self(_mm256_loadu_si256(src.cast()))
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut u8) {
        _mm256_storeu_si256(dst.cast(), self.0);
    }

    #[inline(always)]
    unsafe fn broadcast_1(from: *const u8) -> Self {
        Self(_mm256_set1_epi8(*from as i8))
    }

    #[inline(always)]
    unsafe fn broadcast_2(from: *const u8) -> Self {
        Self(_mm256_set1_epi16(ptr::read_unaligned(from.cast::<i16>())))
    }

    #[inline(always)]
    unsafe fn broadcast_4(from: *const u8) -> Self {
        Self(_mm256_set1_epi32(ptr::read_unaligned(from.cast::<i32>())))
    }

    #[inline(always)]
    unsafe fn broadcast_8(from: *const u8) -> Self {
        Self(_mm256_set1_epi64x(ptr::read_unaligned(from.cast::<i64>())))
    }
}

entry_points!(Avx2Chunk, "avx2");
