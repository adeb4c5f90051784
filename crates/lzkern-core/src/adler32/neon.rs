//! NEON Adler-32 kernel, 16 bytes per step.

use super::{generic, nmax_for, BASE};
use std::arch::aarch64::{
    uint32x4_t, vaddq_u32, vaddvq_u32, vdupq_n_u32, vget_high_u8, vget_low_u8, vld1_u8,
    vld1q_u32, vld1q_u8, vmull_u8, vpadalq_u16, vpaddlq_u8, vshlq_n_u32,
};

const BLOCK: usize = nmax_for(16);

static WEIGHTS: [u8; 16] = [16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

pub fn adler32(adler: u32, data: &[u8]) -> u32 {
    debug_assert!(std::arch::is_aarch64_feature_detected!("neon"));
    // SAFETY: only installed in a functable when NEON was detected.
    unsafe { adler32_impl(adler, data) }
}

#[target_feature(enable = "neon")]
unsafe fn adler32_impl(adler: u32, data: &[u8]) -> u32 {
    if data.len() < 16 {
        return generic::adler32(adler, data);
    }

    let mut sum2 = (adler >> 16) % BASE;
    let mut adler = (adler & 0xffff) % BASE;

    let w_hi = vld1_u8(WEIGHTS.as_ptr());
    let w_lo = vld1_u8(WEIGHTS.as_ptr().add(8));

    for block in data.chunks(BLOCK) {
        let mut chunks = block.chunks_exact(16);

        let mut vs1: uint32x4_t = vld1q_u32([adler, 0, 0, 0].as_ptr());
        let mut vs2: uint32x4_t = vld1q_u32([sum2, 0, 0, 0].as_ptr());
        let mut vs1_0 = vdupq_n_u32(0);

        for chunk in &mut chunks {
            let v = vld1q_u8(chunk.as_ptr());
            vs1_0 = vaddq_u32(vs1_0, vs1);
            vs1 = vpadalq_u16(vs1, vpaddlq_u8(v));
            vs2 = vpadalq_u16(vs2, vmull_u8(vget_low_u8(v), w_hi));
            vs2 = vpadalq_u16(vs2, vmull_u8(vget_high_u8(v), w_lo));
        }
        vs2 = vaddq_u32(vs2, vshlq_n_u32::<4>(vs1_0));

        adler = vaddvq_u32(vs1);
        sum2 = vaddvq_u32(vs2);
        (adler, sum2) = generic::sum_block(adler, sum2, chunks.remainder());
        adler %= BASE;
        sum2 %= BASE;
    }

    adler | sum2 << 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adler32::{naive_adler32, NMAX};

    #[test]
    fn test_matches_naive() {
        let data: Vec<u8> = (0..3 * NMAX + 77).map(|i| (i * 131 + 17) as u8).collect();
        for len in [0, 1, 15, 16, 17, 100, NMAX, NMAX + 1, data.len()] {
            assert_eq!(
                adler32(1, &data[..len]),
                naive_adler32(1, &data[..len]),
                "len {len}"
            );
        }
    }

    #[test]
    fn test_all_ff_worst_case() {
        let data = vec![0xFFu8; 4 * NMAX];
        let seed = (BASE - 1) << 16 | (BASE - 1);
        assert_eq!(adler32(seed, &data), naive_adler32(seed, &data));
    }
}
