//! Entry points with zlib calling conventions.

use crate::functable::functable;

/// Adler-32 with zlib's convention that a missing buffer yields the initial
/// value.
///
/// ```
/// use lzkern_core::compat::adler32;
///
/// let seed = adler32(0, None);
/// assert_eq!(seed, 1);
/// assert_eq!(adler32(seed, Some(b"Wikipedia")), 0x11E6_0398);
/// ```
#[must_use]
pub fn adler32(adler: u32, buf: Option<&[u8]>) -> u32 {
    match buf {
        None => 1,
        Some(data) => functable().adler32(adler, data),
    }
}

/// Chunk width of the dispatched copy engine, which is also the write slack a
/// caller must leave after a fast-path back-reference.
#[must_use]
pub fn chunksize() -> usize {
    functable().chunk_size()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_buffer_is_initial_value() {
        assert_eq!(adler32(0xDEAD_BEEF, None), 1);
    }

    #[test]
    fn test_empty_buffer_is_identity() {
        assert_eq!(adler32(0x0012_0034, Some(&[])), 0x0012_0034);
    }

    #[test]
    fn test_chunksize_is_power_of_two() {
        let size = chunksize();
        assert!(size.is_power_of_two());
        assert!((8..=32).contains(&size));
    }
}
