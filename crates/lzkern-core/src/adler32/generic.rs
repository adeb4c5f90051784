//! Portable Adler-32 kernel.

use super::{BASE, NMAX};

/// Scalar Adler-32 over `data`, continuing from `adler`.
pub fn adler32(adler: u32, data: &[u8]) -> u32 {
    if data.is_empty() {
        return adler;
    }

    let mut sum2 = (adler >> 16) % BASE;
    let mut adler = (adler & 0xffff) % BASE;

    if data.len() == 1 {
        adler = (adler + u32::from(data[0])) % BASE;
        sum2 = (sum2 + adler) % BASE;
        return adler | sum2 << 16;
    }

    if data.len() < 16 {
        for &byte in data {
            adler += u32::from(byte);
            sum2 += adler;
        }
        return adler % BASE | (sum2 % BASE) << 16;
    }

    let mut blocks = data.chunks_exact(NMAX);
    for block in &mut blocks {
        (adler, sum2) = sum_block(adler, sum2, block);
        adler %= BASE;
        sum2 %= BASE;
    }
    (adler, sum2) = sum_block(adler, sum2, blocks.remainder());
    adler %= BASE;
    sum2 %= BASE;

    adler | sum2 << 16
}

/// Sum at most [`NMAX`] bytes without reducing.
#[inline(always)]
pub(crate) fn sum_block(mut adler: u32, mut sum2: u32, block: &[u8]) -> (u32, u32) {
    debug_assert!(block.len() <= NMAX);
    let mut chunks = block.chunks_exact(16);
    for chunk in &mut chunks {
        for &byte in chunk {
            adler += u32::from(byte);
            sum2 += adler;
        }
    }
    for &byte in chunks.remainder() {
        adler += u32::from(byte);
        sum2 += adler;
    }
    (adler, sum2)
}
