//! Rolling hash used to index the match finder's hash table.
//!
//! Two families exist: a multiplicative hash that runs everywhere, and a
//! hardware CRC32 of the 32-bit word at the insert position. They are not
//! interchangeable, only self-consistent: one compression run must use one
//! of them throughout, which the functable guarantees.

/// Bits of hash table index.
pub const HASH_BITS: u32 = 16;
/// Number of hash buckets.
pub const HASH_SIZE: usize = 1 << HASH_BITS;
/// Mask applied to a raw hash value.
pub const HASH_MASK: u32 = (1 << HASH_BITS) - 1;

/// Which hash function a functable installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    /// Knuth multiplicative hash.
    Multiplicative,
    /// Hardware CRC32 (SSE4.2 or ARMv8 CRC extension).
    Crc32,
}

impl HashKind {
    /// Short name for diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multiplicative => "multiplicative",
            Self::Crc32 => "crc32",
        }
    }
}

/// Multiplicative hash of a 32-bit window word.
#[inline]
#[must_use]
pub fn update_hash(val: u32) -> u32 {
    val.wrapping_mul(2_654_435_761) >> (32 - HASH_BITS)
}

/// Read the little-endian word the hash is computed over.
///
/// The driver keeps at least four readable bytes past every insert position,
/// so this never needs a shorter fallback.
#[inline(always)]
pub(crate) fn read_word(window: &[u8], pos: usize) -> u32 {
    let word = window[pos..]
        .first_chunk::<4>()
        .unwrap_or_else(|| unreachable!("insert position {pos} lacks 4 bytes of lookahead"));
    u32::from_le_bytes(*word)
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse42 {
    use std::arch::x86_64::_mm_crc32_u32;

    pub fn update_hash(val: u32) -> u32 {
        debug_assert!(std::arch::is_x86_feature_detected!("sse4.2"));
        // SAFETY: only installed in a functable when SSE4.2 was detected.
        unsafe { crc32_word(val) }
    }

    #[target_feature(enable = "sse4.2")]
    unsafe fn crc32_word(val: u32) -> u32 {
        _mm_crc32_u32(0, val)
    }
}

#[cfg(target_arch = "aarch64")]
pub(crate) mod acle {
    use std::arch::aarch64::__crc32w;

    pub fn update_hash(val: u32) -> u32 {
        debug_assert!(std::arch::is_aarch64_feature_detected!("crc"));
        // SAFETY: only installed in a functable when the CRC extension was detected.
        unsafe { crc32_word(val) }
    }

    #[target_feature(enable = "crc")]
    unsafe fn crc32_word(val: u32) -> u32 {
        __crc32w(0, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_in_range() {
        for val in [0u32, 1, 0xdead_beef, u32::MAX] {
            assert!(update_hash(val) <= HASH_MASK);
        }
    }

    #[test]
    fn test_multiplicative_deterministic() {
        assert_eq!(update_hash(0x6162_6364), update_hash(0x6162_6364));
        assert_ne!(update_hash(0x6162_6364), update_hash(0x6162_6365));
    }

    #[test]
    fn test_read_word_little_endian() {
        let window = [0x01, 0x02, 0x03, 0x04, 0x05];
        assert_eq!(read_word(&window, 0), 0x0403_0201);
        assert_eq!(read_word(&window, 1), 0x0504_0302);
    }

    #[test]
    fn test_read_word_last_full_word() {
        let window = *b"\x00\x00\x00\x00wxyz";
        assert_eq!(read_word(&window, 4), u32::from_le_bytes(*b"wxyz"));
    }

    #[test]
    #[should_panic(expected = "lacks 4 bytes of lookahead")]
    fn test_read_word_short_tail_is_a_contract_violation() {
        let window = [1u8, 2, 3, 4, 5];
        read_word(&window, 2);
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_crc_hash_matches_software_crc32c() {
        if std::arch::is_x86_feature_detected!("sse4.2") {
            // CRC32C of the little-endian word, initial value 0 and no final xor
            let mut crc = 0u32;
            for byte in 0x6463_6261u32.to_le_bytes() {
                crc ^= u32::from(byte);
                for _ in 0..8 {
                    crc = if crc & 1 == 1 {
                        (crc >> 1) ^ 0x82F6_3B78
                    } else {
                        crc >> 1
                    };
                }
            }
            assert_eq!(sse42::update_hash(0x6463_6261), crc);
        }
    }

    #[test]
    fn test_hash_kind_names() {
        assert_eq!(HashKind::Multiplicative.as_str(), "multiplicative");
        assert_eq!(HashKind::Crc32.as_str(), "crc32");
    }
}
