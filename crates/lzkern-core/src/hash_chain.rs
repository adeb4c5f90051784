//! Hash chains: `head` maps a bucket to its most recent window position and
//! `prev` threads every position to the previous one with the same hash.

use crate::functable::Functable;
use crate::insert_string::{read_word, HASH_MASK, HASH_SIZE};

/// A window offset. 0 doubles as "no entry".
pub type Pos = u16;

/// Match-finder chain tables for one compression session.
#[derive(Debug, Clone)]
pub struct HashChains {
    head: Box<[Pos]>,
    prev: Box<[Pos]>,
    w_mask: usize,
}

impl HashChains {
    /// Allocate empty chains for a window of `wsize` bytes.
    ///
    /// `wsize` must be a power of two no larger than 32 KiB.
    #[must_use]
    pub fn new(wsize: usize) -> Self {
        debug_assert!(wsize.is_power_of_two() && wsize <= 1 << 15);
        Self {
            head: vec![0; HASH_SIZE].into_boxed_slice(),
            prev: vec![0; wsize].into_boxed_slice(),
            w_mask: wsize - 1,
        }
    }

    /// Bucket heads.
    #[must_use]
    pub fn head(&self) -> &[Pos] {
        &self.head
    }

    /// Chain links, indexed by `pos & (wsize - 1)`.
    #[must_use]
    pub fn prev(&self) -> &[Pos] {
        &self.prev
    }

    /// Previous position sharing the hash of `pos`.
    #[inline]
    #[must_use]
    pub fn prev_of(&self, pos: Pos) -> Pos {
        self.prev[usize::from(pos) & self.w_mask]
    }

    /// Insert `pos` and return the bucket's former head, the newest match
    /// candidate for the string starting there.
    ///
    /// `window` must hold at least four readable bytes at `pos`.
    #[inline]
    pub fn quick_insert_string(&mut self, ft: &Functable, window: &[u8], pos: usize) -> Pos {
        let hm = (ft.update_hash(read_word(window, pos)) & HASH_MASK) as usize;
        let head = self.head[hm];
        let pos = pos as Pos;
        if head != pos {
            self.prev[usize::from(pos) & self.w_mask] = head;
            self.head[hm] = pos;
        }
        head
    }

    /// Insert `count` consecutive positions starting at `pos`.
    pub fn insert_string(&mut self, ft: &Functable, window: &[u8], pos: usize, count: usize) {
        for idx in pos..pos + count {
            self.quick_insert_string(ft, window, idx);
        }
    }

    /// Rebase every stored position after the window moved down by `wsize`.
    pub fn slide(&mut self, ft: &Functable, wsize: u16) {
        ft.slide_hash(&mut self.head, &mut self.prev, wsize);
    }

    /// Forget every position.
    pub fn clear(&mut self) {
        self.head.fill(0);
        self.prev.fill(0);
    }
}
