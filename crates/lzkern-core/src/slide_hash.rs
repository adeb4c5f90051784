//! Hash-chain aging when the sliding window advances.
//!
//! Every stored position is rebased by `wsize` with saturating subtraction:
//! positions that fall out of the window become 0, the "no entry" marker.

/// Slide both chains of a match finder by `wsize` using the scalar kernel.
pub fn slide_hash(head: &mut [u16], prev: &mut [u16], wsize: u16) {
    rust::slide_hash_chain(head, wsize);
    rust::slide_hash_chain(prev, wsize);
}

pub(crate) mod rust {
    /// Reference kernel.
    pub fn slide_hash_chain(table: &mut [u16], wsize: u16) {
        for m in table.iter_mut() {
            *m = m.saturating_sub(wsize);
        }
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse2 {
    use std::arch::x86_64::{
        __m128i, _mm_loadu_si128, _mm_set1_epi16, _mm_storeu_si128, _mm_subs_epu16,
    };

    pub fn slide_hash_chain(table: &mut [u16], wsize: u16) {
        debug_assert!(std::arch::is_x86_feature_detected!("sse2"));
        // SAFETY: only installed in a functable when SSE2 was detected.
        unsafe { slide_hash_chain_impl(table, wsize) }
    }

    #[target_feature(enable = "sse2")]
    unsafe fn slide_hash_chain_impl(table: &mut [u16], wsize: u16) {
        let xmm_wsize = _mm_set1_epi16(wsize as i16);

        let mut chunks = table.chunks_exact_mut(8);
        for chunk in &mut chunks {
            let chunk = chunk.as_mut_ptr().cast::<__m128i>();
            let value = _mm_loadu_si128(chunk);
            _mm_storeu_si128(chunk, _mm_subs_epu16(value, xmm_wsize));
        }
        super::rust::slide_hash_chain(chunks.into_remainder(), wsize);
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2 {
    use std::arch::x86_64::{
        __m256i, _mm256_loadu_si256, _mm256_set1_epi16, _mm256_storeu_si256, _mm256_subs_epu16,
    };

    pub fn slide_hash_chain(table: &mut [u16], wsize: u16) {
        debug_assert!(std::arch::is_x86_feature_detected!("avx2"));
        // SAFETY: only installed in a functable when AVX2 was detected.
        unsafe { slide_hash_chain_impl(table, wsize) }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn slide_hash_chain_impl(table: &mut [u16], wsize: u16) {
        let ymm_wsize = _mm256_set1_epi16(wsize as i16);

        let mut chunks = table.chunks_exact_mut(16);
        for chunk in &mut chunks {
            let chunk = chunk.as_mut_ptr().cast::<__m256i>();
            let value = _mm256_loadu_si256(chunk);
            _mm256_storeu_si256(chunk, _mm256_subs_epu16(value, ymm_wsize));
        }
        super::rust::slide_hash_chain(chunks.into_remainder(), wsize);
    }
}

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon {
    use std::arch::aarch64::{
        uint16x8_t, uint16x8x4_t, vdupq_n_u16, vld1q_u16_x4, vqsubq_u16, vst1q_u16_x4,
    };

    pub fn slide_hash_chain(table: &mut [u16], wsize: u16) {
        debug_assert!(std::arch::is_aarch64_feature_detected!("neon"));
        // SAFETY: only installed in a functable when NEON was detected.
        unsafe { slide_hash_chain_impl(table, wsize) }
    }

    #[target_feature(enable = "neon")]
    unsafe fn slide_hash_chain_impl(table: &mut [u16], wsize: u16) {
        let v = vdupq_n_u16(wsize);

        let mut chunks = table.chunks_exact_mut(32);
        for chunk in &mut chunks {
            let p0 = vld1q_u16_x4(chunk.as_ptr());
            let p0 = vqsubq_u16_x4_x1(p0, v);
            vst1q_u16_x4(chunk.as_mut_ptr(), p0);
        }
        super::rust::slide_hash_chain(chunks.into_remainder(), wsize);
    }

    #[inline(always)]
    unsafe fn vqsubq_u16_x4_x1(a: uint16x8x4_t, b: uint16x8_t) -> uint16x8x4_t {
        uint16x8x4_t(
            vqsubq_u16(a.0, b),
            vqsubq_u16(a.1, b),
            vqsubq_u16(a.2, b),
            vqsubq_u16(a.3, b),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WSIZE: u16 = 32768;

    const INPUT: [u16; 64] = [
        0, 0, 28790, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 43884, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 64412, 0, 0, 0, 0, 0, 21043, 0, 0, 0, 0, 0, 23707, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 64026, 0, 0, 20182,
    ];

    const OUTPUT: [u16; 64] = [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 11116, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 31644, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 31258, 0, 0, 0,
    ];

    #[test]
    fn test_slide_hash_rust() {
        let mut input = INPUT;
        rust::slide_hash_chain(&mut input, WSIZE);
        assert_eq!(input, OUTPUT);
    }

    #[test]
    fn test_slide_exactly_wsize_is_zero() {
        let mut table = [WSIZE, WSIZE - 1, WSIZE + 1, u16::MAX];
        rust::slide_hash_chain(&mut table, WSIZE);
        assert_eq!(table, [0, 0, 1, u16::MAX - WSIZE]);
    }

    #[test]
    fn test_slide_hash_both_chains() {
        let mut head = INPUT;
        let mut prev = INPUT;
        slide_hash(&mut head, &mut prev, WSIZE);
        assert_eq!(head, OUTPUT);
        assert_eq!(prev, OUTPUT);
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_slide_hash_sse2() {
        let mut input = INPUT;
        sse2::slide_hash_chain(&mut input, WSIZE);
        assert_eq!(input, OUTPUT);
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_slide_hash_avx2() {
        if std::arch::is_x86_feature_detected!("avx2") {
            let mut input = INPUT;
            avx2::slide_hash_chain(&mut input, WSIZE);
            assert_eq!(input, OUTPUT);
        }
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_slide_hash_avx2_ragged_tail() {
        if std::arch::is_x86_feature_detected!("avx2") {
            let mut simd: Vec<u16> = (0..37).map(|i| i * 1500).collect();
            let mut scalar = simd.clone();
            avx2::slide_hash_chain(&mut simd, 20000);
            rust::slide_hash_chain(&mut scalar, 20000);
            assert_eq!(simd, scalar);
        }
    }

    #[test]
    #[cfg(target_arch = "aarch64")]
    fn test_slide_hash_neon() {
        if std::arch::is_aarch64_feature_detected!("neon") {
            let mut input = INPUT;
            neon::slide_hash_chain(&mut input, WSIZE);
            assert_eq!(input, OUTPUT);
        }
    }
}
