//! 16-byte NEON chunk.

use super::Chunk;
use std::arch::aarch64::{
    uint8x16_t, vdupq_n_u16, vdupq_n_u32, vdupq_n_u64, vdupq_n_u8, vld1q_u8,
    vreinterpretq_u8_u16, vreinterpretq_u8_u32, vreinterpretq_u8_u64, vst1q_u8,
};
use std::ptr;

#[derive(Debug, Clone, Copy)]
pub(crate) struct NeonChunk(uint8x16_t);

// SAFETY: unaligned 16-byte accesses; NEON is part of the aarch64 baseline.
unsafe impl Chunk for NeonChunk {
    const SIZE: usize = 16;

    #[inline(always)]
    unsafe fn load(src: *const u8) -> Self {
        Self(vld1q_u8(src))
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut u8) {
        vst1q_u8(dst, self.0);
    }

    #[inline(always)]
    unsafe fn broadcast_1(from: *const u8) -> Self {
        Self(vdupq_n_u8(*from))
    }

    #[inline(always)]
    unsafe fn broadcast_2(from: *const u8) -> Self {
        Self(vreinterpretq_u8_u16(vdupq_n_u16(ptr::read_unaligned(
            from.cast::<u16>(),
        ))))
    }

    #[inline(always)]
    unsafe fn broadcast_4(from: *const u8) -> Self {
        Self(vreinterpretq_u8_u32(vdupq_n_u32(ptr::read_unaligned(
            from.cast::<u32>(),
        ))))
    }

    #[inline(always)]
    unsafe fn broadcast_8(from: *const u8) -> Self {
        Self(vreinterpretq_u8_u64(vdupq_n_u64(ptr::read_unaligned(
            from.cast::<u64>(),
        ))))
    }
}

entry_points!(NeonChunk, "neon");
