//! LZ77 match-finding driver.
//!
//! Turns input bytes into a [`Token`] stream using the dispatched primitives:
//! hash insertion and chain walking over [`HashChains`], `compare258` to score
//! candidates, `slide_hash` when the window advances, and `compare256_rle`
//! for run-length search. The window handling follows zlib: a buffer of two
//! window sizes whose upper half is moved down once the cursor gets within
//! [`MIN_LOOKAHEAD`] bytes of its end.

use std::fmt;

use crate::functable::Functable;
use crate::hash_chain::{HashChains, Pos};
use crate::{Error, Result, MAX_MATCH, MIN_MATCH};

/// Smallest accepted `window_bits`.
pub const MIN_WINDOW_BITS: u8 = 9;
/// Largest accepted `window_bits` (32 KiB window).
pub const MAX_WINDOW_BITS: u8 = 15;

/// Bytes of lookahead needed before a match search: one maximal match plus
/// the next hash insert.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Distance beyond which a minimum-length match costs more than it saves.
const TOO_FAR: usize = 4096;

/// A literal byte or a back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// One byte copied through.
    Literal(u8),
    /// Copy `len` bytes from `dist` bytes back.
    Match {
        /// Distance back, `1..=wsize`.
        dist: u16,
        /// Length, `MIN_MATCH..=MAX_MATCH`.
        len: u16,
    },
}

impl Token {
    /// Number of output bytes this token produces.
    #[must_use]
    pub fn output_len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { len, .. } => usize::from(*len),
        }
    }
}

/// Match selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Level-driven greedy or lazy matching.
    #[default]
    Default,
    /// Lazy matching that drops short matches, for data with small random
    /// variations.
    Filtered,
    /// Only distance-1 runs.
    Rle,
}

impl Strategy {
    /// Parse a strategy name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "filtered" => Some(Self::Filtered),
            "rle" => Some(Self::Rle),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Filtered => "filtered",
            Self::Rle => "rle",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// 0 (literals only) to 9 (slowest, best).
    pub level: u8,
    /// Match selection strategy.
    pub strategy: Strategy,
    /// Base-2 logarithm of the window size.
    pub window_bits: u8,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            level: 6,
            strategy: Strategy::Default,
            window_bits: MAX_WINDOW_BITS,
        }
    }
}

impl Params {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a level above 9 or `window_bits`
    /// outside `9..=15`.
    pub fn validate(&self) -> Result<()> {
        if self.level > 9 {
            return Err(Error::InvalidConfig(format!(
                "level must be 0-9, got {}",
                self.level
            )));
        }
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&self.window_bits) {
            return Err(Error::InvalidConfig(format!(
                "window_bits must be {MIN_WINDOW_BITS}-{MAX_WINDOW_BITS}, got {}",
                self.window_bits
            )));
        }
        Ok(())
    }

    /// Window size in bytes.
    #[must_use]
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Stored,
    Fast,
    Slow,
}

/// Per-level tuning.
#[derive(Debug, Clone, Copy)]
struct Config {
    /// Shorten the chain search once a match this long is in hand.
    good_length: u16,
    /// Lazy: skip the search after a match this long. Fast: longest match
    /// whose interior positions are still inserted.
    max_lazy: u16,
    /// Stop searching at a match this long.
    nice_length: u16,
    max_chain: u16,
    func: Func,
}

const fn tune(good_length: u16, max_lazy: u16, nice_length: u16, max_chain: u16, func: Func) -> Config {
    Config {
        good_length,
        max_lazy,
        nice_length,
        max_chain,
        func,
    }
}

const CONFIGURATION_TABLE: [Config; 10] = [
    tune(0, 0, 0, 0, Func::Stored),
    tune(4, 4, 8, 4, Func::Fast),
    tune(4, 5, 16, 8, Func::Fast),
    tune(4, 6, 32, 32, Func::Fast),
    tune(4, 4, 16, 16, Func::Slow),
    tune(8, 16, 32, 32, Func::Slow),
    tune(8, 16, 128, 128, Func::Slow),
    tune(8, 32, 128, 256, Func::Slow),
    tune(32, 128, 258, 1024, Func::Slow),
    tune(32, 258, 258, 4096, Func::Slow),
];

/// Tokenise `input` with `params`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `params` fail [`Params::validate`].
pub fn deflate(ft: &Functable, params: &Params, input: &[u8]) -> Result<Vec<Token>> {
    params.validate()?;
    let config = CONFIGURATION_TABLE[usize::from(params.level)];

    if config.func == Func::Stored {
        return Ok(input.iter().copied().map(Token::Literal).collect());
    }

    let mut state = DeflateState::new(ft, params, config, input);
    match (params.strategy, config.func) {
        (Strategy::Rle, _) => state.deflate_rle(),
        (_, Func::Fast) => state.deflate_fast(),
        _ => state.deflate_slow(),
    }
    tracing::trace!(
        input = input.len(),
        tokens = state.tokens.len(),
        slides = state.slides,
        "deflate finished"
    );
    Ok(state.tokens)
}

/// The `MAX_MATCH` bytes starting at `pos`.
///
/// The window carries `MAX_MATCH` bytes of padding past `2 * w_size`, so
/// every cursor the driver holds has a full run behind it.
#[inline(always)]
fn run(window: &[u8], pos: usize) -> &[u8; MAX_MATCH] {
    window[pos..]
        .first_chunk::<MAX_MATCH>()
        .unwrap_or_else(|| unreachable!("window padding covers every cursor"))
}

struct DeflateState<'a> {
    ft: &'a Functable,
    input: &'a [u8],
    next_in: usize,

    /// `2 * w_size` bytes plus a maximal match of padding, so a 258-byte
    /// compare from any cursor stays inside the allocation.
    window: Vec<u8>,
    w_size: usize,
    max_dist: usize,
    chains: HashChains,

    strstart: usize,
    lookahead: usize,
    match_start: usize,
    match_length: usize,
    prev_match: usize,
    prev_length: usize,
    match_available: bool,

    strategy: Strategy,
    max_chain: usize,
    good_match: usize,
    max_lazy: usize,
    nice_match: usize,

    tokens: Vec<Token>,
    slides: u64,
}

impl<'a> DeflateState<'a> {
    fn new(ft: &'a Functable, params: &Params, config: Config, input: &'a [u8]) -> Self {
        let w_size = params.window_size();
        Self {
            ft,
            input,
            next_in: 0,
            window: vec![0; 2 * w_size + MAX_MATCH],
            w_size,
            max_dist: w_size - MIN_LOOKAHEAD,
            chains: HashChains::new(w_size),
            strstart: 0,
            lookahead: 0,
            match_start: 0,
            match_length: MIN_MATCH - 1,
            prev_match: 0,
            prev_length: MIN_MATCH - 1,
            match_available: false,
            strategy: params.strategy,
            max_chain: usize::from(config.max_chain),
            good_match: usize::from(config.good_length),
            max_lazy: usize::from(config.max_lazy),
            nice_match: usize::from(config.nice_length),
            tokens: Vec::with_capacity(input.len() / 2),
            slides: 0,
        }
    }

    /// Top up the lookahead, sliding the window first when the cursor has
    /// reached its upper limit.
    fn fill_window(&mut self) {
        let window_size = 2 * self.w_size;
        loop {
            let mut more = window_size - self.lookahead - self.strstart;

            if self.strstart >= self.w_size + self.max_dist {
                let end = self.strstart + self.lookahead;
                self.window.copy_within(self.w_size..end, 0);
                self.match_start = self.match_start.saturating_sub(self.w_size);
                self.strstart -= self.w_size;
                // w_size is at most 1 << 15
                self.chains.slide(self.ft, self.w_size as u16);
                self.slides += 1;
                more += self.w_size;
                tracing::trace!(strstart = self.strstart, "window slid");
            }

            if self.next_in == self.input.len() {
                break;
            }

            let start = self.strstart + self.lookahead;
            let n = more.min(self.input.len() - self.next_in);
            self.window[start..start + n]
                .copy_from_slice(&self.input[self.next_in..self.next_in + n]);
            self.next_in += n;
            self.lookahead += n;

            if self.lookahead >= MIN_LOOKAHEAD {
                break;
            }
        }
    }

    /// Walk the chain from `cur_match` and return the best length found, at
    /// most the lookahead. Sets `match_start` when it improves on
    /// `prev_length`.
    fn longest_match(&mut self, mut cur_match: Pos) -> usize {
        let scan = self.strstart;
        let mut chain_length = self.max_chain;
        let mut best_len = self.prev_length.max(MIN_MATCH - 1);
        let nice_match = self.nice_match.min(self.lookahead);
        let limit = scan.saturating_sub(self.max_dist);

        if self.prev_length >= self.good_match {
            chain_length >>= 2;
        }

        let scan_run = run(&self.window, scan);
        loop {
            let cur = usize::from(cur_match);
            if cur >= scan {
                break;
            }

            let cur_run = run(&self.window, cur);
            // best_len < MAX_MATCH while the walk continues
            let end = best_len.min(MAX_MATCH - 1);
            if cur_run[end] == scan_run[end] && cur_run[0] == scan_run[0] {
                let len = self.ft.compare258(cur_run, scan_run);
                if len > best_len {
                    self.match_start = cur;
                    best_len = len;
                    if len >= nice_match {
                        break;
                    }
                }
            }

            cur_match = self.chains.prev_of(cur_match);
            chain_length -= 1;
            if usize::from(cur_match) <= limit || chain_length == 0 {
                break;
            }
        }

        best_len.min(self.lookahead)
    }

    #[inline]
    fn emit_match(&mut self, dist: usize, len: usize) {
        debug_assert!((1..=self.w_size).contains(&dist));
        debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&len));
        // dist <= 1 << 15 and len <= 258
        self.tokens.push(Token::Match {
            dist: dist as u16,
            len: len as u16,
        });
    }

    #[inline]
    fn insert_head(&mut self) -> Pos {
        if self.lookahead >= MIN_MATCH {
            self.chains
                .quick_insert_string(self.ft, &self.window, self.strstart)
        } else {
            0
        }
    }

    #[inline]
    fn in_reach(&self, hash_head: Pos) -> bool {
        hash_head != 0 && self.strstart - usize::from(hash_head) <= self.max_dist
    }

    /// Greedy matching: take the first acceptable match.
    fn deflate_fast(&mut self) {
        loop {
            if self.lookahead < MIN_LOOKAHEAD {
                self.fill_window();
                if self.lookahead == 0 {
                    break;
                }
            }

            let hash_head = self.insert_head();
            if self.in_reach(hash_head) {
                self.match_length = self.longest_match(hash_head);
            }

            if self.match_length >= MIN_MATCH {
                self.emit_match(self.strstart - self.match_start, self.match_length);
                self.lookahead -= self.match_length;

                if self.match_length <= self.max_lazy && self.lookahead >= MIN_MATCH {
                    // the string at strstart is already in the table
                    self.strstart += 1;
                    self.chains.insert_string(
                        self.ft,
                        &self.window,
                        self.strstart,
                        self.match_length - 1,
                    );
                    self.strstart += self.match_length - 1;
                } else {
                    self.strstart += self.match_length;
                }
                self.match_length = MIN_MATCH - 1;
            } else {
                self.tokens.push(Token::Literal(self.window[self.strstart]));
                self.lookahead -= 1;
                self.strstart += 1;
            }
        }
    }

    /// Lazy matching: only commit to a match once the next position has been
    /// checked for a longer one.
    fn deflate_slow(&mut self) {
        loop {
            if self.lookahead < MIN_LOOKAHEAD {
                self.fill_window();
                if self.lookahead == 0 {
                    break;
                }
            }

            let hash_head = self.insert_head();

            self.prev_length = self.match_length;
            self.prev_match = self.match_start;
            self.match_length = MIN_MATCH - 1;

            if self.in_reach(hash_head) && self.prev_length < self.max_lazy {
                self.match_length = self.longest_match(hash_head);

                if self.match_length <= 5
                    && (self.strategy == Strategy::Filtered
                        || (self.match_length == MIN_MATCH
                            && self.strstart - self.match_start > TOO_FAR))
                {
                    self.match_length = MIN_MATCH - 1;
                }
            }

            if self.prev_length >= MIN_MATCH && self.match_length <= self.prev_length {
                let max_insert = self.strstart + self.lookahead - MIN_MATCH;
                self.emit_match(self.strstart - 1 - self.prev_match, self.prev_length);

                // strstart - 1 and strstart are already inserted
                self.lookahead -= self.prev_length - 1;
                let mut remaining = self.prev_length - 2;
                while remaining > 0 {
                    self.strstart += 1;
                    if self.strstart <= max_insert {
                        self.chains
                            .quick_insert_string(self.ft, &self.window, self.strstart);
                    }
                    remaining -= 1;
                }
                self.match_available = false;
                self.match_length = MIN_MATCH - 1;
                self.strstart += 1;
            } else if self.match_available {
                self.tokens
                    .push(Token::Literal(self.window[self.strstart - 1]));
                self.strstart += 1;
                self.lookahead -= 1;
            } else {
                self.match_available = true;
                self.strstart += 1;
                self.lookahead -= 1;
            }
        }

        if self.match_available {
            self.tokens
                .push(Token::Literal(self.window[self.strstart - 1]));
            self.match_available = false;
        }
    }

    /// Distance-1 runs only; the hash chains are not used.
    fn deflate_rle(&mut self) {
        loop {
            if self.lookahead <= MAX_MATCH {
                self.fill_window();
                if self.lookahead == 0 {
                    break;
                }
            }

            let mut match_len = 0;
            if self.lookahead >= MIN_MATCH && self.strstart > 0 {
                let scan = self.strstart - 1;
                let byte = self.window[scan];
                if self.window[scan + 1] == byte && self.window[scan + 2] == byte {
                    let tail = self.window[scan + 3..]
                        .first_chunk::<256>()
                        .unwrap_or_else(|| unreachable!("window padding covers every cursor"));
                    match_len = (2 + crate::compare258::compare256_rle(byte, tail))
                        .min(self.lookahead)
                        .min(MAX_MATCH);
                }
            }

            if match_len >= MIN_MATCH {
                self.emit_match(1, match_len);
                self.lookahead -= match_len;
                self.strstart += match_len;
            } else {
                self.tokens.push(Token::Literal(self.window[self.strstart]));
                self.lookahead -= 1;
                self.strstart += 1;
            }
        }
    }
}
