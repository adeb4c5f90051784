//! Frame decoder.
//!
//! Records are validated before anything is written; back-references then go
//! straight to the dispatched chunk engine. The output buffer is allocated at
//! its final size up front, so the fast `chunk_memset` is used while a chunk
//! of slack remains past the match and `chunk_memset_safe` within the last
//! chunk of the buffer.

use crate::frame;
use crate::functable::Functable;
use crate::{Error, Result, MIN_MATCH};

/// Decode `frame` and verify its checksum.
///
/// # Errors
///
/// Returns [`Error::CorruptedData`] for any malformed record, a distance or
/// length that leaves the output, a length mismatch, or a checksum mismatch.
pub fn inflate(ft: &Functable, frame: &[u8]) -> Result<Vec<u8>> {
    let (header, records, expected_adler) = frame::parse(frame).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected frame");
    })?;

    let out_len = usize::try_from(header.original_len)
        .map_err(|_| Error::CorruptedData("declared length exceeds address space".to_string()))?;
    let wsize = 1usize << header.window_bits;
    let mut out = vec![0u8; out_len];
    let mut out_pos = 0usize;
    let mut rp = 0usize;

    while rp < records.len() {
        let tag = records[rp];
        rp += 1;

        if tag < frame::MATCH_TAG {
            let n = usize::from(tag) + 1;
            let Some(literals) = records.get(rp..rp + n) else {
                return Err(corrupt(format!("literal run of {n} truncated")));
            };
            let Some(dst) = out.get_mut(out_pos..out_pos + n) else {
                return Err(corrupt(format!("literal run of {n} overflows output")));
            };
            dst.copy_from_slice(literals);
            rp += n;
            out_pos += n;
        } else if tag == frame::MATCH_TAG {
            let Some(&[len_byte, d0, d1]) = records.get(rp..rp + 3) else {
                return Err(corrupt("match record truncated".to_string()));
            };
            rp += 3;
            let len = usize::from(len_byte) + MIN_MATCH;
            let dist = usize::from(u16::from_le_bytes([d0, d1])) + 1;

            if dist > out_pos || dist > wsize {
                return Err(corrupt(format!(
                    "distance {dist} invalid at output position {out_pos}"
                )));
            }
            let left = out_len - out_pos;
            if len > left {
                return Err(corrupt(format!("match of {len} overflows output")));
            }

            // SAFETY: 1 <= dist <= out_pos keeps the source in `out`, and
            // len <= left keeps the run in `out`. The fast path needs one
            // chunk of slack past the run; otherwise the bounded variant
            // stops at the end of the buffer.
            unsafe {
                let base = out.as_mut_ptr();
                let dst = base.add(out_pos);
                if left >= len + ft.chunk_size() {
                    ft.chunk_memset(dst, dist, len);
                } else {
                    ft.chunk_memset_safe(dst, dist, len, base.add(out_len));
                }
            }
            out_pos += len;
        } else {
            return Err(corrupt(format!("invalid record tag {tag:#04x}")));
        }
    }

    if out_pos != out_len {
        return Err(corrupt(format!(
            "decoded {out_pos} bytes, header declares {out_len}"
        )));
    }

    let actual = ft.adler32(1, &out);
    if actual != expected_adler {
        return Err(corrupt(format!(
            "adler32 mismatch: expected {expected_adler:#010x}, got {actual:#010x}"
        )));
    }

    Ok(out)
}

fn corrupt(msg: String) -> Error {
    tracing::warn!(reason = %msg, "rejected frame");
    Error::CorruptedData(msg)
}
