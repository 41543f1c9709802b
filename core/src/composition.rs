//! Composition state decoding: strings, clause boundaries, cursor.
//!
//! The subsystem hands the composition over as legacy-encoded bytes, a
//! clause buffer of byte offsets into those bytes, and a cursor value that
//! is also a byte offset. Everything user-visible here is in characters,
//! so each piece goes through the byte-to-character translation in
//! [`crate::encoding`]. Slicing the already-decoded string would misalign
//! as soon as a multi-byte character appears.

use serde::Serialize;

use crate::encoding::LegacyEncoding;
use crate::error::DecodeError;

/// Which composition string to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// The in-progress, not yet committed text.
    Composition,
    /// The most recently committed text.
    Result,
    /// Phonetic reading of the in-progress text.
    CompositionReading,
    /// Phonetic reading of the committed text.
    ResultReading,
}

/// Snapshot of the current composition state.
///
/// Recomputed fresh on every query; the bridge performs no caching or
/// diffing. Clause strings concatenate exactly to `text`, and `cursor` is a
/// character index (`None` when the subsystem reports no cursor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    /// Text currently being composed.
    pub text: String,
    /// Text committed by the most recent conversion.
    pub result: String,
    /// Clause segmentation of `text`, as reported by the engine.
    pub clauses: Vec<String>,
    /// Cursor position as a character index into `text`.
    pub cursor: Option<usize>,
}

impl Composition {
    /// True when there is neither in-progress nor committed text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.result.is_empty()
    }

    /// Length of the in-progress text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn u32_at(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
}

/// Decode the clause-boundary buffer against the raw composition bytes.
///
/// The buffer is a sequence of little-endian 4-byte offsets into
/// `composition_bytes`; with `count = len / 4` entries there are `count - 1`
/// clauses. The final entry is a trailing sentinel equal to the total byte
/// length, so the last clause runs from the second-to-last offset to the end
/// of the composition bytes. Each clause is legacy-decoded from its byte
/// sub-range independently.
pub fn decode_clauses(
    composition_bytes: &[u8],
    clause_buf: &[u8],
    encoding: LegacyEncoding,
) -> Result<Vec<String>, DecodeError> {
    if clause_buf.len() % 4 != 0 {
        return Err(DecodeError::MisalignedClauseBuffer {
            len: clause_buf.len(),
        });
    }
    let count = clause_buf.len() / 4;
    if count < 2 {
        return Ok(Vec::new());
    }

    // count - 1 real boundaries; the last buffer entry is the sentinel.
    let boundaries: Vec<usize> = (0..count - 1)
        .map(|i| u32_at(clause_buf, i * 4) as usize)
        .collect();

    let total = composition_bytes.len();
    let mut previous = 0usize;
    for (index, &offset) in boundaries.iter().enumerate() {
        if offset > total {
            return Err(DecodeError::OffsetOutOfRange {
                index,
                offset,
                len: total,
            });
        }
        if offset < previous {
            return Err(DecodeError::UnorderedClauseBoundary {
                index,
                offset,
                previous,
            });
        }
        previous = offset;
    }

    let mut clauses = Vec::with_capacity(boundaries.len());
    for i in 0..boundaries.len() {
        let start = boundaries[i];
        let end = if i + 1 < boundaries.len() {
            boundaries[i + 1]
        } else {
            total
        };
        clauses.push(encoding.decode(&composition_bytes[start..end]));
    }
    Ok(clauses)
}

/// Map the subsystem's raw cursor value to a character index.
///
/// Only the low 16 bits are meaningful; `0xFFFF` is the "no cursor"
/// sentinel. Any other value is a byte offset into the legacy-encoded
/// composition bytes and is translated by decoding the byte prefix.
pub fn cursor_index(
    composition_bytes: &[u8],
    raw: i32,
    encoding: LegacyEncoding,
) -> Option<usize> {
    let masked = (raw as u32) & 0xFFFF;
    if masked == 0xFFFF {
        return None;
    }
    Some(encoding.char_index_at(composition_bytes, masked as usize))
}
