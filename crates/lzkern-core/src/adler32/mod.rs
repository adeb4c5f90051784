//! Adler-32 checksum.
//!
//! The checksum is two 16-bit sums modulo [`BASE`]: `a` is 1 plus the sum of
//! all bytes and `b` is the sum of every intermediate `a`. The result packs
//! them as `b << 16 | a`. Kernels defer the modulo for up to [`NMAX`] bytes,
//! the longest run that cannot overflow a 32-bit accumulator.
//!
//! [`adler32`] routes through the process-wide functable; the per-ISA kernels
//! are selected there.

pub(crate) mod generic;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;
#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;
#[cfg(target_arch = "x86_64")]
pub(crate) mod ssse3;

use crate::functable::functable;

/// Largest prime below 2^16.
pub const BASE: u32 = 65521;

/// Longest run of bytes that can be summed before reducing modulo [`BASE`].
pub const NMAX: usize = nmax();

/// Largest `n` with `255·n(n+1)/2 + (n+1)(BASE−1) <= u32::MAX`, the bound on
/// `b` after `n` bytes of 0xFF starting from reduced sums.
const fn nmax() -> usize {
    let mut n: u64 = 0;
    loop {
        let next = n + 1;
        let worst = 255 * next * (next + 1) / 2 + (next + 1) * (BASE as u64 - 1);
        if worst > u32::MAX as u64 {
            return n as usize;
        }
        n = next;
    }
}

const _: () = assert!(NMAX == 5552);

/// [`NMAX`] rounded down to a multiple of a kernel's block width.
pub(crate) const fn nmax_for(width: usize) -> usize {
    NMAX / width * width
}

/// Update `adler` with `data` using the best kernel for this CPU.
#[must_use]
pub fn adler32(adler: u32, data: &[u8]) -> u32 {
    functable().adler32(adler, data)
}

/// Checksum of `A ++ B` from the checksum of `A`, the checksum of `B` and the
/// length of `B`.
#[must_use]
pub fn adler32_combine(adler1: u32, adler2: u32, len2: u64) -> u32 {
    let base = u64::from(BASE);
    let rem = len2 % base;
    let a1 = u64::from(adler1 & 0xffff);
    let b1 = u64::from(adler1 >> 16);
    let a2 = u64::from(adler2 & 0xffff);
    let b2 = u64::from(adler2 >> 16);

    let mut sum1 = a1 + a2 + base - 1;
    let mut sum2 = rem * a1 % base + b1 + b2 + base - rem;
    sum1 %= base;
    sum2 %= base;
    (sum2 << 16 | sum1) as u32
}

/// Streaming Adler-32 state.
///
/// ```
/// use lzkern_core::Adler32;
///
/// let mut a = Adler32::new();
/// a.update(b"Wiki");
/// a.update(b"pedia");
/// assert_eq!(a.finalize(), 0x11E6_0398);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    value: u32,
}

impl Adler32 {
    /// Fresh state, checksum 1.
    #[must_use]
    pub fn new() -> Self {
        Self { value: 1 }
    }

    /// Continue from a previously produced checksum.
    #[must_use]
    pub fn resume(value: u32) -> Self {
        Self { value }
    }

    /// Feed bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.value = adler32(self.value, data);
    }

    /// Current checksum.
    #[must_use]
    pub fn finalize(&self) -> u32 {
        self.value
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte-at-a-time reference, used to check the kernels.
#[cfg(test)]
pub(crate) fn naive_adler32(start: u32, data: &[u8]) -> u32 {
    let mut a = (start & 0xffff) % BASE;
    let mut b = (start >> 16) % BASE;
    for &byte in data {
        a = (a + u32::from(byte)) % BASE;
        b = (b + a) % BASE;
    }
    b << 16 | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nmax_value() {
        assert_eq!(NMAX, 5552);
        assert_eq!(nmax_for(16), 5552);
        assert_eq!(nmax_for(32), 5536);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(adler32(1, b""), 1);
        assert_eq!(adler32(1, b"a"), 0x0062_0062);
        assert_eq!(adler32(1, b"abc"), 0x024d_0127);
        assert_eq!(adler32(1, b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn test_streaming_equals_one_shot() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7 + i / 3) as u8).collect();
        let mut state = Adler32::new();
        for piece in data.chunks(777) {
            state.update(piece);
        }
        assert_eq!(state.finalize(), adler32(1, &data));
        assert_eq!(Adler32::default(), Adler32::new());
    }

    #[test]
    fn test_resume() {
        let mut state = Adler32::resume(adler32(1, b"Wiki"));
        state.update(b"pedia");
        assert_eq!(state.finalize(), 0x11E6_0398);
    }

    #[test]
    fn test_combine() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        for split in [0, 1, 15, 5552, 9999, 10_000] {
            let (x, y) = data.split_at(split);
            let combined = adler32_combine(adler32(1, x), adler32(1, y), y.len() as u64);
            assert_eq!(combined, adler32(1, &data), "split {split}");
        }
    }

    #[test]
    fn test_all_ff_across_nmax_boundaries() {
        for len in [NMAX - 1, NMAX, NMAX + 1, 2 * NMAX + 17] {
            let data = vec![0xFFu8; len];
            assert_eq!(adler32(1, &data), naive_adler32(1, &data), "len {len}");
        }
    }
}
