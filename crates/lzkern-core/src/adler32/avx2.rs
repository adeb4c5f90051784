//! AVX2 Adler-32 kernel, 32 bytes per step.

use super::{generic, nmax_for, BASE};
use std::arch::x86_64::{
    __m256i, _mm256_add_epi32, _mm256_loadu_si256, _mm256_madd_epi16, _mm256_maddubs_epi16,
    _mm256_sad_epu8, _mm256_set1_epi16, _mm256_setr_epi32, _mm256_setr_epi8,
    _mm256_setzero_si256, _mm256_slli_epi32, _mm256_storeu_si256,
};

const BLOCK: usize = nmax_for(32);

pub fn adler32(adler: u32, data: &[u8]) -> u32 {
    debug_assert!(std::arch::is_x86_feature_detected!("avx2"));
    // SAFETY: only installed in a functable when AVX2 was detected.
    unsafe { adler32_impl(adler, data) }
}

#[target_feature(enable = "avx2")]
unsafe fn adler32_impl(adler: u32, data: &[u8]) -> u32 {
    if data.len() < 32 {
        return generic::adler32(adler, data);
    }

    let mut sum2 = (adler >> 16) % BASE;
    let mut adler = (adler & 0xffff) % BASE;

    let dot = _mm256_setr_epi8(
        32, 31, 30, 29, 28, 27, 26, 25, 24, 23, 22, 21, 20, 19, 18, 17, 16, 15, 14, 13, 12, 11,
        10, 9, 8, 7, 6, 5, 4, 3, 2, 1,
    );
    let ones = _mm256_set1_epi16(1);
    let zero = _mm256_setzero_si256();

    for block in data.chunks(BLOCK) {
        let mut chunks = block.chunks_exact(32);

        let mut vs1 = _mm256_setr_epi32(adler as i32, 0, 0, 0, 0, 0, 0, 0);
        let mut vs2 = _mm256_setr_epi32(sum2 as i32, 0, 0, 0, 0, 0, 0, 0);
        let mut vs1_0 = zero;

        for chunk in &mut chunks {
            let v = _mm256_loadu_si256(chunk.as_ptr().cast());
            vs1_0 = _mm256_add_epi32(vs1_0, vs1);
            vs1 = _mm256_add_epi32(vs1, _mm256_sad_epu8(v, zero));
            let weighted = _mm256_madd_epi16(_mm256_maddubs_epi16(v, dot), ones);
            vs2 = _mm256_add_epi32(vs2, weighted);
        }
        vs2 = _mm256_add_epi32(vs2, _mm256_slli_epi32(vs1_0, 5));

        adler = hsum(vs1);
        sum2 = hsum(vs2);
        (adler, sum2) = generic::sum_block(adler, sum2, chunks.remainder());
        adler %= BASE;
        sum2 %= BASE;
    }

    adler | sum2 << 16
}

#[inline(always)]
unsafe fn hsum(v: __m256i) -> u32 {
    let mut lanes = [0u32; 8];
    _mm256_storeu_si256(lanes.as_mut_ptr().cast(), v);
    lanes.iter().fold(0u32, |acc, &x| acc.wrapping_add(x))
}
