//! Property-based tests for the primitive invariants, run against every
//! backend the CPU supports.

use lzkern::chunkset::copy_match;
use lzkern::simd::available_backends;
use lzkern::slide_hash::slide_hash;
use lzkern::{Functable, SimdBackend, MAX_MATCH};
use proptest::prelude::*;

const BASE: u32 = 65521;

fn naive_adler32(adler: u32, data: &[u8]) -> u32 {
    let mut a = adler & 0xFFFF;
    let mut b = adler >> 16;
    for &byte in data {
        a = (a + u32::from(byte)) % BASE;
        b = (b + a) % BASE;
    }
    (b << 16) | a
}

fn tables() -> Vec<Functable> {
    available_backends()
        .into_iter()
        .map(|b| Functable::for_backend(b).unwrap())
        .collect()
}

/// Reference expansion: sequential byte copy from `dist` behind.
fn reference_expand(buf: &mut [u8], pos: usize, dist: usize, len: usize) {
    for i in pos..pos + len {
        buf[i] = buf[i - dist];
    }
}

fn seeded_prefix(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_adler32_matches_reference(
        data in prop::collection::vec(any::<u8>(), 0..20_000),
        s1 in 0u32..BASE,
        s2 in 0u32..BASE,
    ) {
        let seed = (s2 << 16) | s1;
        let expected = naive_adler32(seed, &data);
        for ft in tables() {
            prop_assert_eq!(ft.adler32(seed, &data), expected, "{:?}", ft.backend());
        }
    }

    #[test]
    fn prop_adler32_empty_is_identity(s1 in 0u32..BASE, s2 in 0u32..BASE) {
        let seed = (s2 << 16) | s1;
        for ft in tables() {
            prop_assert_eq!(ft.adler32(seed, &[]), seed);
        }
    }

    #[test]
    fn prop_adler32_split_anywhere(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(data.len() + 1);
        let (left, right) = data.split_at(at);
        for ft in tables() {
            let whole = ft.adler32(1, &data);
            prop_assert_eq!(ft.adler32(ft.adler32(1, left), right), whole);
            prop_assert_eq!(
                lzkern::adler32_combine(ft.adler32(1, left), ft.adler32(1, right), right.len() as u64),
                whole
            );
        }
    }

    #[test]
    fn prop_slide_saturates(
        head in prop::collection::vec(any::<u16>(), 1..300),
        prev in prop::collection::vec(any::<u16>(), 1..300),
        wsize in 1u16..=u16::MAX,
    ) {
        for ft in tables() {
            let (mut h, mut p) = (head.clone(), prev.clone());
            ft.slide_hash(&mut h, &mut p, wsize);
            for (new, old) in h.iter().zip(&head) {
                prop_assert_eq!(*new, old.saturating_sub(wsize));
            }
            for (new, old) in p.iter().zip(&prev) {
                prop_assert_eq!(*new, old.saturating_sub(wsize));
            }
        }
    }

    #[test]
    fn prop_slide_composes(
        table in prop::collection::vec(any::<u16>(), 1..300),
        w1 in 0u16..=u16::MAX,
        w2 in 0u16..=u16::MAX,
    ) {
        let mut twice = table.clone();
        let mut prev_twice = table.clone();
        slide_hash(&mut twice, &mut prev_twice, w1);
        slide_hash(&mut twice, &mut prev_twice, w2);

        let combined = u32::from(w1) + u32::from(w2);
        let expected: Vec<u16> = table
            .iter()
            .map(|&v| u32::from(v).saturating_sub(combined) as u16)
            .collect();
        prop_assert_eq!(&twice, &expected);
        prop_assert_eq!(&prev_twice, &expected);
    }

    #[test]
    fn prop_compare258_exact_prefix(
        fill in prop::collection::vec(any::<u8>(), MAX_MATCH),
        k in 0usize..=MAX_MATCH,
        flip in 1u8..=255,
    ) {
        let mut a = [0u8; MAX_MATCH];
        a.copy_from_slice(&fill);
        let mut b = a;
        if k < MAX_MATCH {
            b[k] ^= flip;
        }
        for ft in tables() {
            prop_assert_eq!(ft.compare258(&a, &a), MAX_MATCH);
            prop_assert_eq!(ft.compare258(&a, &b), k, "{:?}", ft.backend());
        }
    }

    #[test]
    fn prop_memset_far_distance_is_plain_copy(
        dist in 32usize..600,
        len in 1usize..600,
        seed in any::<u8>(),
    ) {
        for ft in tables() {
            let mut buf = seeded_prefix(dist + len + 64, seed);
            let mut expected = buf.clone();
            reference_expand(&mut expected, dist, dist, len);
            copy_match(&ft, &mut buf, dist, dist, len).unwrap();
            prop_assert_eq!(&buf[..dist + len], &expected[..dist + len]);
        }
    }
}

#[test]
fn test_memset_periodic_matrix() {
    for ft in tables() {
        for dist in [1usize, 2, 3, 4, 7, 8, 15] {
            for len in [1, 2, dist, dist + 1, 3 * dist, 300] {
                // Slack past the run keeps the dispatched fast path in play.
                let mut buf = seeded_prefix(64 + len + 64, dist as u8);
                let mut expected = buf.clone();
                reference_expand(&mut expected, 64, dist, len);

                copy_match(&ft, &mut buf, 64, dist, len).unwrap();
                assert_eq!(
                    &buf[64..64 + len],
                    &expected[64..64 + len],
                    "{:?} dist {dist} len {len}",
                    ft.backend()
                );
            }
        }
    }
}

#[test]
fn test_safe_variants_never_pass_limit() {
    const GUARD: usize = 64;
    for ft in tables() {
        for dist in [1usize, 2, 3, 4, 7, 8, 15] {
            for len in [1, 2, dist, dist + 1, 3 * dist, 300] {
                let start = 64;
                let limit = start + len;
                let mut buf = seeded_prefix(limit + GUARD, 0x33);
                buf[limit..].fill(0xEE);
                let mut expected = buf.clone();
                reference_expand(&mut expected, start, dist, len);

                // SAFETY: source `start - dist` is inside `buf`, the run ends
                // exactly at `limit`, and the guard region follows it.
                let end = unsafe {
                    let base = buf.as_mut_ptr();
                    let out = ft.chunk_memset_safe(base.add(start), dist, len, base.add(limit));
                    out.offset_from(base) as usize
                };
                assert_eq!(end, limit);
                assert_eq!(&buf[..limit], &expected[..limit], "{:?} memset dist {dist} len {len}", ft.backend());
                assert!(buf[limit..].iter().all(|&b| b == 0xEE), "{:?} memset overran", ft.backend());

                // Non-overlapping copy bounded the same way.
                let mut buf = seeded_prefix(limit + GUARD, 0x44);
                buf[limit..].fill(0xEE);
                let src: Vec<u8> = (0..len).map(|i| i as u8 ^ 0xA5).collect();
                // SAFETY: `src` holds `len` bytes and the destination run ends at `limit`.
                let end = unsafe {
                    let base = buf.as_mut_ptr();
                    let out = ft.chunk_copy_safe(base.add(start), src.as_ptr(), len, base.add(limit));
                    out.offset_from(base) as usize
                };
                assert_eq!(end, limit);
                assert_eq!(&buf[start..limit], &src[..]);
                assert!(buf[limit..].iter().all(|&b| b == 0xEE), "{:?} copy overran", ft.backend());
            }
        }
    }
}

#[test]
fn test_null_buffer_contract() {
    assert_eq!(lzkern::compat::adler32(0x1234_5678, None), 1);
    assert_eq!(lzkern::compat::adler32(1, Some(&[])), 1);
    assert_eq!(
        lzkern::compat::chunksize(),
        lzkern::functable().chunk_size()
    );
    assert!(matches!(
        Functable::for_backend(SimdBackend::Scalar).map(|ft| ft.chunk_size()),
        Ok(8)
    ));
}
