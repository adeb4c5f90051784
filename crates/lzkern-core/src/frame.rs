//! Token container.
//!
//! ```text
//! "LZK" 0x01 | window_bits u8 | original_len u64 LE | records... | adler32 u32 BE
//! ```
//!
//! Records are byte-aligned. Tag `0x00..=0x7F` is a literal run of `tag + 1`
//! bytes that follow; tag `0x80` is a match followed by `len - 3` (u8) and
//! `dist - 1` (u16 LE). Every other tag is invalid. This is a transport for
//! LZ77 tokens, not an entropy-coded format.

use crate::deflate::{Token, MAX_WINDOW_BITS, MIN_WINDOW_BITS};
use crate::{Error, Result, MIN_MATCH};

/// Magic bytes and version.
pub const MAGIC: [u8; 4] = *b"LZK\x01";
/// Bytes before the first record.
pub const HEADER_LEN: usize = MAGIC.len() + 1 + 8;
/// Bytes after the last record.
pub const TRAILER_LEN: usize = 4;
/// Tag introducing a match record.
pub const MATCH_TAG: u8 = 0x80;
/// Longest literal run one record carries.
pub const MAX_LITERAL_RUN: usize = 128;
/// Upper bound on output bytes per record byte; a 4-byte match record
/// produces at most 258 bytes.
pub const MAX_EXPANSION: u64 = 65;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Window the encoder used; bounds every match distance.
    pub window_bits: u8,
    /// Decoded length.
    pub original_len: u64,
}

/// Serialise `tokens` into a frame.
#[must_use]
pub fn encode(tokens: &[Token], window_bits: u8, original_len: usize, adler: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + original_len / 2 + TRAILER_LEN);
    out.extend_from_slice(&MAGIC);
    out.push(window_bits);
    out.extend_from_slice(&(original_len as u64).to_le_bytes());

    let mut run: Vec<u8> = Vec::with_capacity(MAX_LITERAL_RUN);
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                run.push(byte);
                if run.len() == MAX_LITERAL_RUN {
                    flush_literals(&mut out, &mut run);
                }
            }
            Token::Match { dist, len } => {
                flush_literals(&mut out, &mut run);
                out.push(MATCH_TAG);
                // len is MIN_MATCH..=MAX_MATCH
                out.push((usize::from(len) - MIN_MATCH) as u8);
                out.extend_from_slice(&(dist - 1).to_le_bytes());
            }
        }
    }
    flush_literals(&mut out, &mut run);

    out.extend_from_slice(&adler.to_be_bytes());
    out
}

fn flush_literals(out: &mut Vec<u8>, run: &mut Vec<u8>) {
    if run.is_empty() {
        return;
    }
    // run.len() is 1..=MAX_LITERAL_RUN
    out.push((run.len() - 1) as u8);
    out.extend_from_slice(run);
    run.clear();
}

/// Split a frame into header, record bytes and stored checksum.
///
/// # Errors
///
/// Returns [`Error::CorruptedData`] for a short frame, bad magic, an
/// out-of-range window or an implausible decoded length.
pub fn parse(frame: &[u8]) -> Result<(FrameHeader, &[u8], u32)> {
    if frame.len() < HEADER_LEN + TRAILER_LEN {
        return Err(Error::CorruptedData(format!(
            "frame of {} bytes is shorter than header and trailer",
            frame.len()
        )));
    }
    let (header, rest) = frame.split_at(HEADER_LEN);
    let (records, trailer) = rest.split_at(rest.len() - TRAILER_LEN);

    if header[..MAGIC.len()] != MAGIC {
        return Err(Error::CorruptedData("bad frame magic".to_string()));
    }
    let window_bits = header[MAGIC.len()];
    if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        return Err(Error::CorruptedData(format!(
            "window_bits {window_bits} out of range"
        )));
    }
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[MAGIC.len() + 1..]);
    let original_len = u64::from_le_bytes(len_bytes);

    if original_len > MAX_EXPANSION * records.len() as u64 {
        return Err(Error::CorruptedData(format!(
            "declared length {original_len} impossible for {} record bytes",
            records.len()
        )));
    }

    let mut adler = [0u8; 4];
    adler.copy_from_slice(trailer);

    Ok((
        FrameHeader {
            window_bits,
            original_len,
        },
        records,
        u32::from_be_bytes(adler),
    ))
}
