//! Match length comparison.
//!
//! `compare258` answers "how many leading bytes of these two window positions
//! agree", capped at [`MAX_MATCH`]. The first two bytes are checked with a
//! single 16-bit compare; only then is the 256-byte vector kernel entered.

use crate::MAX_MATCH;

const _: () = assert!(MAX_MATCH == 256 + 2);

/// Compare two 258-byte runs using the given 256-byte kernel.
#[inline(always)]
pub(crate) fn compare258_with(
    src0: &[u8; MAX_MATCH],
    src1: &[u8; MAX_MATCH],
    compare256: fn(&[u8; 256], &[u8; 256]) -> usize,
) -> usize {
    if src0[..2] != src1[..2] {
        return usize::from(src0[0] == src1[0]);
    }

    2 + compare256(tail256(src0), tail256(src1))
}

/// Compare two 258-byte runs with the scalar kernel.
#[must_use]
pub fn compare258(src0: &[u8; MAX_MATCH], src1: &[u8; MAX_MATCH]) -> usize {
    compare258_with(src0, src1, rust::compare256)
}

/// Count how many of the first 256 bytes of `src` equal `byte`.
#[must_use]
pub fn compare256_rle(byte: u8, src: &[u8; 256]) -> usize {
    rust::compare256_rle(byte, src)
}

/// Bytes `2..MAX_MATCH`, the part the 256-byte kernels see.
#[inline(always)]
fn tail256(src: &[u8; MAX_MATCH]) -> &[u8; 256] {
    src.last_chunk::<256>()
        .unwrap_or_else(|| unreachable!("MAX_MATCH is 256 + 2"))
}

pub(crate) mod rust {
    #[inline(always)]
    fn read_u64_le(src: &[u8; 256], at: usize) -> u64 {
        let word = src[at..]
            .first_chunk::<8>()
            .unwrap_or_else(|| unreachable!("callers step `at` by 8 below 256"));
        u64::from_le_bytes(*word)
    }

    pub fn compare256(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        let mut len = 0;
        while len < 256 {
            let diff = read_u64_le(src0, len) ^ read_u64_le(src1, len);
            if diff != 0 {
                return len + (diff.trailing_zeros() / 8) as usize;
            }
            len += 8;
        }
        256
    }

    pub fn compare256_rle(byte: u8, src: &[u8; 256]) -> usize {
        let sv = u64::from_ne_bytes([byte; 8]);

        let mut len = 0;
        while len < 256 {
            let diff = sv ^ read_u64_le(src, len);
            if diff != 0 {
                return len + (diff.trailing_zeros() / 8) as usize;
            }
            len += 8;
        }
        256
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse2 {
    use std::arch::x86_64::{__m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8};

    pub fn compare256(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        debug_assert!(std::arch::is_x86_feature_detected!("sse2"));
        // SAFETY: only installed in a functable when SSE2 was detected.
        unsafe { compare256_impl(src0, src1) }
    }

    #[target_feature(enable = "sse2")]
    unsafe fn compare256_impl(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        let (p0, p1) = (src0.as_ptr(), src1.as_ptr());
        let mut len = 0;

        // two 16-byte lanes per iteration
        while len < 256 {
            let xmm_src0 = _mm_loadu_si128(p0.add(len).cast::<__m128i>());
            let xmm_src1 = _mm_loadu_si128(p1.add(len).cast::<__m128i>());
            let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(xmm_src0, xmm_src1)) as u32;
            if mask != 0xFFFF {
                return len + (!mask).trailing_zeros() as usize;
            }

            let xmm_src0 = _mm_loadu_si128(p0.add(len + 16).cast::<__m128i>());
            let xmm_src1 = _mm_loadu_si128(p1.add(len + 16).cast::<__m128i>());
            let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(xmm_src0, xmm_src1)) as u32;
            if mask != 0xFFFF {
                return len + 16 + (!mask).trailing_zeros() as usize;
            }

            len += 32;
        }

        256
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2 {
    use std::arch::x86_64::{
        __m256i, _mm256_cmpeq_epi8, _mm256_loadu_si256, _mm256_movemask_epi8,
    };

    pub fn compare256(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        debug_assert!(std::arch::is_x86_feature_detected!("avx2"));
        // SAFETY: only installed in a functable when AVX2 was detected.
        unsafe { compare256_impl(src0, src1) }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn compare256_impl(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        let (p0, p1) = (src0.as_ptr(), src1.as_ptr());
        let mut len = 0;

        while len < 256 {
            let ymm_src0 = _mm256_loadu_si256(p0.add(len).cast::<__m256i>());
            let ymm_src1 = _mm256_loadu_si256(p1.add(len).cast::<__m256i>());
            // identical bytes = FF
            let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(ymm_src0, ymm_src1)) as u32;
            if mask != 0xFFFF_FFFF {
                return len + (!mask).trailing_zeros() as usize;
            }

            let ymm_src0 = _mm256_loadu_si256(p0.add(len + 32).cast::<__m256i>());
            let ymm_src1 = _mm256_loadu_si256(p1.add(len + 32).cast::<__m256i>());
            let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(ymm_src0, ymm_src1)) as u32;
            if mask != 0xFFFF_FFFF {
                return len + 32 + (!mask).trailing_zeros() as usize;
            }

            len += 64;
        }

        256
    }
}

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon {
    use std::arch::aarch64::{veorq_u8, vgetq_lane_u64, vld1q_u8, vreinterpretq_u64_u8};

    pub fn compare256(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        debug_assert!(std::arch::is_aarch64_feature_detected!("neon"));
        // SAFETY: only installed in a functable when NEON was detected.
        unsafe { compare256_impl(src0, src1) }
    }

    #[target_feature(enable = "neon")]
    unsafe fn compare256_impl(src0: &[u8; 256], src1: &[u8; 256]) -> usize {
        let (p0, p1) = (src0.as_ptr(), src1.as_ptr());
        let mut len = 0;

        while len < 256 {
            let cmp = veorq_u8(vld1q_u8(p0.add(len)), vld1q_u8(p1.add(len)));

            let lane = vgetq_lane_u64::<0>(vreinterpretq_u64_u8(cmp));
            if lane != 0 {
                return len + (lane.trailing_zeros() / 8) as usize;
            }

            let lane = vgetq_lane_u64::<1>(vreinterpretq_u64_u8(cmp));
            if lane != 0 {
                return len + 8 + (lane.trailing_zeros() / 8) as usize;
            }

            len += 16;
        }

        256
    }
}
