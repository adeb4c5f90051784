//! Portable 8-byte chunk.

use super::Chunk;
use std::ptr;

/// A `u64` used as an 8-byte copy granule.
#[derive(Debug, Clone, Copy)]
pub struct ScalarChunk(u64);

// SAFETY: every access is an unaligned 8-byte read or write.
unsafe impl Chunk for ScalarChunk {
    const SIZE: usize = 8;

    #[inline(always)]
    unsafe fn load(src: *const u8) -> Self {
        Self(ptr::read_unaligned(src.cast::<u64>()))
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut u8) {
        ptr::write_unaligned(dst.cast::<u64>(), self.0);
    }

    #[inline(always)]
    unsafe fn broadcast_1(from: *const u8) -> Self {
        Self(u64::from(*from) * 0x0101_0101_0101_0101)
    }

    #[inline(always)]
    unsafe fn broadcast_2(from: *const u8) -> Self {
        let half = ptr::read_unaligned(from.cast::<u16>());
        Self(u64::from(half) * 0x0001_0001_0001_0001)
    }

    #[inline(always)]
    unsafe fn broadcast_4(from: *const u8) -> Self {
        let word = ptr::read_unaligned(from.cast::<u32>());
        Self(u64::from(word) * 0x0000_0001_0000_0001)
    }

    #[inline(always)]
    unsafe fn broadcast_8(from: *const u8) -> Self {
        Self::load(from)
    }
}

entry_points!(ScalarChunk);

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(chunk: ScalarChunk) -> [u8; 8] {
        let mut out = [0u8; 8];
        unsafe { chunk.store(out.as_mut_ptr()) };
        out
    }

    #[test]
    fn test_broadcasts() {
        let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
        unsafe {
            assert_eq!(bytes(ScalarChunk::broadcast_1(src.as_ptr())), [1; 8]);
            assert_eq!(
                bytes(ScalarChunk::broadcast_2(src.as_ptr())),
                [1, 2, 1, 2, 1, 2, 1, 2]
            );
            assert_eq!(
                bytes(ScalarChunk::broadcast_4(src.as_ptr())),
                [1, 2, 3, 4, 1, 2, 3, 4]
            );
            assert_eq!(bytes(ScalarChunk::broadcast_8(src.as_ptr())), src);
        }
    }

    #[test]
    fn test_broadcast_1_high_byte() {
        let src = [0xFFu8];
        unsafe {
            assert_eq!(bytes(ScalarChunk::broadcast_1(src.as_ptr())), [0xFF; 8]);
        }
    }
}
