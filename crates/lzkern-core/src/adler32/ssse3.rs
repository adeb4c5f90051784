//! SSSE3 Adler-32 kernel, 16 bytes per step.

use super::{generic, nmax_for, BASE};
use std::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_madd_epi16, _mm_maddubs_epi16, _mm_sad_epu8,
    _mm_set1_epi16, _mm_setr_epi32, _mm_setr_epi8, _mm_setzero_si128, _mm_slli_epi32,
    _mm_storeu_si128,
};

const BLOCK: usize = nmax_for(16);

pub fn adler32(adler: u32, data: &[u8]) -> u32 {
    debug_assert!(std::arch::is_x86_feature_detected!("ssse3"));
    // SAFETY: only installed in a functable when SSSE3 was detected.
    unsafe { adler32_impl(adler, data) }
}

#[target_feature(enable = "ssse3")]
unsafe fn adler32_impl(adler: u32, data: &[u8]) -> u32 {
    if data.len() < 16 {
        return generic::adler32(adler, data);
    }

    let mut sum2 = (adler >> 16) % BASE;
    let mut adler = (adler & 0xffff) % BASE;

    let dot = _mm_setr_epi8(16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1);
    let ones = _mm_set1_epi16(1);
    let zero = _mm_setzero_si128();

    for block in data.chunks(BLOCK) {
        let mut chunks = block.chunks_exact(16);

        let mut vs1 = _mm_setr_epi32(adler as i32, 0, 0, 0);
        let mut vs2 = _mm_setr_epi32(sum2 as i32, 0, 0, 0);
        let mut vs1_0 = zero;

        for chunk in &mut chunks {
            let v = _mm_loadu_si128(chunk.as_ptr().cast());
            vs1_0 = _mm_add_epi32(vs1_0, vs1);
            vs1 = _mm_add_epi32(vs1, _mm_sad_epu8(v, zero));
            let weighted = _mm_madd_epi16(_mm_maddubs_epi16(v, dot), ones);
            vs2 = _mm_add_epi32(vs2, weighted);
        }
        // each chunk adds 16 times the running `a` it started from
        vs2 = _mm_add_epi32(vs2, _mm_slli_epi32(vs1_0, 4));

        adler = hsum(vs1);
        sum2 = hsum(vs2);
        (adler, sum2) = generic::sum_block(adler, sum2, chunks.remainder());
        adler %= BASE;
        sum2 %= BASE;
    }

    adler | sum2 << 16
}

#[inline(always)]
unsafe fn hsum(v: __m128i) -> u32 {
    let mut lanes = [0u32; 4];
    _mm_storeu_si128(lanes.as_mut_ptr().cast(), v);
    lanes.iter().fold(0u32, |acc, &x| acc.wrapping_add(x))
}
