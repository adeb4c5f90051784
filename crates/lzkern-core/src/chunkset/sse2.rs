//! 16-byte SSE2 chunk.

use super::Chunk;
use std::arch::x86_64::{
    __m128i, _mm_loadu_si128, _mm_set1_epi16, _mm_set1_epi32, _mm_set1_epi64x, _mm_set1_epi8,
    _mm_storeu_si128,
};
use std::ptr;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Sse2Chunk(__m128i);

// SAFETY: unaligned 16-byte accesses; SSE2 is part of the x86_64 baseline.
unsafe impl Chunk for Sse2Chunk {
    const SIZE: usize = 16;

    #[inline(always)]
    unsafe fn load(src: *const u8) -> Self {
        Self(_mm_loadu_si128(src.cast()))
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut u8) {
        _mm_storeu_si128(dst.cast(), self.0);
    }

    #[inline(always)]
    unsafe fn broadcast_1(from: *const u8) -> Self {
        Self(_mm_set1_epi8(*from as i8))
    }

    #[inline(always)]
    unsafe fn broadcast_2(from: *const u8) -> Self {
        Self(_mm_set1_epi16(ptr::read_unaligned(from.cast::<i16>())))
    }

    #[inline(always)]
    unsafe fn broadcast_4(from: *const u8) -> Self {
        Self(_mm_set1_epi32(ptr::read_unaligned(from.cast::<i32>())))
    }

    #[inline(always)]
    unsafe fn broadcast_8(from: *const u8) -> Self {
        Self(_mm_set1_epi64x(ptr::read_unaligned(from.cast::<i64>())))
    }
}

entry_points!(Sse2Chunk, "sse2");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memset_dist_equal_to_chunk() {
        let mut buf = vec![0u8; 16 + 100 + 16];
        for (i, b) in buf[..16].iter_mut().enumerate() {
            *b = i as u8;
        }
        unsafe {
            let out = buf.as_mut_ptr().add(16);
            chunk_memset(out, 16, 100);
        }
        for i in 16..116 {
            assert_eq!(buf[i], (i % 16) as u8);
        }
    }

    #[test]
    fn test_broadcast_2_pattern() {
        let src = [0xABu8, 0xCD];
        let mut out = [0u8; 16];
        unsafe { Sse2Chunk::broadcast_2(src.as_ptr()).store(out.as_mut_ptr()) };
        for pair in out.chunks_exact(2) {
            assert_eq!(pair, &src);
        }
    }
}
