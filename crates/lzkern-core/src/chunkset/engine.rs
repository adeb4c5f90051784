//! Width-generic chunk copy engine.
//!
//! Every entry point is `#[inline(always)]` so that it is instantiated inside
//! the `#[target_feature]` wrappers of each ISA module and the chunk loads and
//! stores compile to single vector instructions.
//!
//! # Safety
//!
//! All functions here take raw pointers and trust the caller completely:
//!
//! * `out - dist .. out` must be initialised, readable memory of the same
//!   allocation as `out`.
//! * The non-`_safe` functions may write up to [`Chunk::SIZE`] bytes past
//!   `out + len`; that slack must be writable.
//! * The CPU must support the instruction set of `C`.

use super::Chunk;
use std::ptr;

/// Copy `len` bytes from `from` to `out` in whole chunks and return `out + len`.
///
/// Writes up to `max(len, C::SIZE)` bytes. `from` must trail `out` by at least
/// `C::SIZE` bytes, or by no less than `len`, or not overlap it at all.
///
/// # Safety
///
/// See the module documentation. `len` must be non-zero.
#[inline(always)]
pub unsafe fn chunk_copy<C: Chunk>(mut out: *mut u8, mut from: *const u8, len: usize) -> *mut u8 {
    debug_assert!(len > 0, "chunk_copy should never have a length 0");

    // the first store covers the ragged head, every later one is a full chunk
    let mut len = len - 1;
    let align = len % C::SIZE + 1;
    C::load(from).store(out);
    out = out.add(align);
    from = from.add(align);
    len /= C::SIZE;
    while len > 0 {
        C::load(from).store(out);
        out = out.add(C::SIZE);
        from = from.add(C::SIZE);
        len -= 1;
    }
    out
}

/// Copy up to `len` bytes from `from` to `out` without writing at or beyond
/// `safe_limit`. Returns one past the last byte written.
///
/// Overlap is allowed: each block is only used when the distance between
/// source and destination is at least the block width, so the result equals
/// a forward byte-by-byte copy.
///
/// # Safety
///
/// `out..safe_limit` must be writable and `from..from + len` readable for the
/// bytes actually copied.
#[inline(always)]
pub unsafe fn chunk_copy_safe<C: Chunk>(
    mut out: *mut u8,
    mut from: *const u8,
    len: usize,
    safe_limit: *mut u8,
) -> *mut u8 {
    debug_assert!(safe_limit as usize >= out as usize);
    let mut len = len.min((safe_limit as usize).saturating_sub(out as usize));
    let gap = (out as usize).abs_diff(from as usize);

    macro_rules! blocks {
        ($width:expr) => {
            while len >= $width && gap >= $width {
                ptr::copy_nonoverlapping(from, out, $width);
                out = out.add($width);
                from = from.add($width);
                len -= $width;
            }
        };
    }

    if C::SIZE >= 32 {
        blocks!(32);
    }
    if C::SIZE >= 16 {
        blocks!(16);
    }
    blocks!(8);
    blocks!(4);
    blocks!(2);
    while len > 0 {
        *out = *from;
        out = out.add(1);
        from = from.add(1);
        len -= 1;
    }
    out
}

/// Double the copy distance with short overlapping chunk copies until it is at
/// least one chunk wide or covers the rest of the run.
///
/// On return `out` has advanced by the bytes produced and `dist`/`len` hold
/// the remaining distance and length.
///
/// # Safety
///
/// See the module documentation; each step stores a full chunk at `out`.
#[inline(always)]
pub unsafe fn chunk_unroll<C: Chunk>(mut out: *mut u8, dist: &mut usize, len: &mut usize) -> *mut u8 {
    let from = out.sub(*dist);
    while *dist < *len && *dist < C::SIZE {
        C::load(from).store(out);
        out = out.add(*dist);
        *len -= *dist;
        *dist += *dist;
    }
    out
}

/// Expand a back-reference: for `i in 0..len`, `out[i] = out[i - dist]`, in
/// order. Returns `out + len`.
///
/// # Safety
///
/// See the module documentation. `dist` must be non-zero.
#[inline(always)]
pub unsafe fn chunk_memset<C: Chunk>(mut out: *mut u8, dist: usize, len: usize) -> *mut u8 {
    debug_assert!(dist > 0, "chunk_memset cannot have a distance 0");

    let from = out.sub(dist);
    if len < C::SIZE {
        return copy_bytes(out, dist, len);
    }

    let chunk = match dist {
        1 => C::broadcast_1(from),
        2 => C::broadcast_2(from),
        4 => C::broadcast_4(from),
        8 => C::broadcast_8(from),
        d if d == C::SIZE => C::load(from),
        _ => {
            let (mut dist, mut len) = (dist, len);
            out = chunk_unroll::<C>(out, &mut dist, &mut len);
            return chunk_copy::<C>(out, out.sub(dist), len);
        }
    };

    // the pattern period divides the chunk width, so every store is in phase
    let rem = len % C::SIZE;
    let mut bulk = len - rem;
    while bulk > 0 {
        chunk.store(out);
        out = out.add(C::SIZE);
        bulk -= C::SIZE;
    }
    if rem > 0 {
        ptr::copy_nonoverlapping(from, out, rem);
        out = out.add(rem);
    }
    out
}

/// [`chunk_memset`] that never writes at or beyond `safe_limit`.
///
/// `len` is clamped to the room left. Runs that would need over-write slack
/// are split: the bulk goes through the chunked path while it provably stays
/// one chunk short of the limit, and the tail is finished a byte at a time.
///
/// # Safety
///
/// `out..safe_limit` must be writable and `out - dist..out` initialised.
#[inline(always)]
pub unsafe fn chunk_memset_safe<C: Chunk>(
    out: *mut u8,
    dist: usize,
    len: usize,
    safe_limit: *mut u8,
) -> *mut u8 {
    debug_assert!(safe_limit as usize >= out as usize);
    let left = (safe_limit as usize).saturating_sub(out as usize);
    let len = len.min(left);

    if left < 3 * C::SIZE {
        return copy_bytes(out, dist, len);
    }
    if len + C::SIZE <= left {
        return chunk_memset::<C>(out, dist, len);
    }

    let bulk = left - C::SIZE;
    let out = chunk_memset::<C>(out, dist, bulk);
    copy_bytes(out, dist, len - bulk)
}

#[inline(always)]
unsafe fn copy_bytes(mut out: *mut u8, dist: usize, len: usize) -> *mut u8 {
    for _ in 0..len {
        *out = *out.sub(dist);
        out = out.add(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkset::ScalarChunk;

    const SLACK: usize = 64;

    fn reference(prefix: &[u8], dist: usize, len: usize) -> Vec<u8> {
        let mut buf = prefix.to_vec();
        for _ in 0..len {
            buf.push(buf[buf.len() - dist]);
        }
        buf
    }

    fn prefix(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i * 31 + 7) as u8).collect()
    }

    #[test]
    fn test_chunk_memset_matches_reference() {
        for dist in [1usize, 2, 3, 4, 5, 7, 8, 9, 15, 16, 17, 40] {
            for len in [1usize, 2, 7, 8, 9, dist, dist + 1, 3 * dist, 100, 258] {
                let pre = prefix(48);
                let mut buf = pre.clone();
                buf.resize(pre.len() + len + SLACK, 0);
                let end = unsafe {
                    let out = buf.as_mut_ptr().add(pre.len());
                    chunk_memset::<ScalarChunk>(out, dist, len).offset_from(out)
                };
                assert_eq!(end as usize, len);
                assert_eq!(
                    &buf[..pre.len() + len],
                    &reference(&pre, dist, len)[..],
                    "dist {dist} len {len}"
                );
            }
        }
    }

    #[test]
    fn test_chunk_copy_overwrites_at_most_one_chunk() {
        let src = prefix(40);
        let mut dst = vec![0xEEu8; 64];
        let end = unsafe {
            let out = dst.as_mut_ptr();
            chunk_copy::<ScalarChunk>(out, src.as_ptr(), 3).offset_from(out)
        };
        assert_eq!(end, 3);
        assert_eq!(&dst[..3], &src[..3]);
        assert!(dst[ScalarChunk::SIZE..].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_chunk_unroll_doubles_distance() {
        let mut buf = vec![0u8; 64];
        buf[..3].copy_from_slice(b"abc");
        let (mut dist, mut len) = (3usize, 20usize);
        let consumed = unsafe {
            let out = buf.as_mut_ptr().add(3);
            chunk_unroll::<ScalarChunk>(out, &mut dist, &mut len).offset_from(out)
        };
        // 3 -> 6 -> 12, having produced 3 + 6 bytes
        assert_eq!(dist, 12);
        assert_eq!(consumed, 9);
        assert_eq!(len, 11);
        assert_eq!(&buf[..12], b"abcabcabcabc");
    }

    #[test]
    fn test_chunk_copy_safe_respects_limit() {
        let mut buf = vec![0u8; 32];
        buf[..5].copy_from_slice(b"hello");
        let end = unsafe {
            let base = buf.as_mut_ptr();
            chunk_copy_safe::<ScalarChunk>(base.add(5), base, 100, base.add(20)).offset_from(base)
        };
        assert_eq!(end, 20);
        assert_eq!(&buf[..20], b"hellohellohellohello");
        assert!(buf[20..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_chunk_memset_safe_split_path() {
        let pre = prefix(16);
        let len = 200;
        let mut buf = pre.clone();
        buf.resize(pre.len() + len, 0);
        unsafe {
            let base = buf.as_mut_ptr();
            let limit = base.add(buf.len());
            chunk_memset_safe::<ScalarChunk>(base.add(pre.len()), 5, len, limit);
        }
        assert_eq!(buf, reference(&pre, 5, len));
    }
}
