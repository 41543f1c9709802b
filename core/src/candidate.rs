//! Candidate-list buffer decoding.
//!
//! The subsystem serializes its candidate list as a packed little-endian
//! structure: a fixed 24-byte header (`size, style, count, selection,
//! page_start, page_size`), then `count` 4-byte offsets relative to the
//! start of the buffer, then a region of null-terminated legacy-encoded
//! strings the offsets point into. All fields are read with length-checked
//! accesses at fixed byte offsets; a buffer that is inconsistent with its
//! own header is a [`DecodeError`], never an out-of-bounds read.

use std::ops::Index;

use serde::Serialize;

use crate::encoding::LegacyEncoding;
use crate::error::DecodeError;

/// Byte length of the fixed candidate-list header.
pub const CANDIDATE_HEADER_LEN: usize = 24;

/// Immutable snapshot of the conversion candidates currently offered.
///
/// Header metadata (`selection`, `page_start`, `page_size`) is preserved
/// verbatim from the buffer; only the page view clamps, because the
/// subsystem does not guarantee `page_start + page_size <= count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateList {
    candidates: Vec<String>,
    selection: usize,
    page_start: usize,
    page_size: usize,
}

impl CandidateList {
    /// Decode a raw candidate-list buffer.
    pub fn decode(buf: &[u8], encoding: LegacyEncoding) -> Result<Self, DecodeError> {
        if buf.len() < CANDIDATE_HEADER_LEN {
            return Err(DecodeError::TruncatedHeader {
                len: buf.len(),
                expected: CANDIDATE_HEADER_LEN,
            });
        }
        let _size = u32_at(buf, 0);
        let _style = u32_at(buf, 4);
        let count = u32_at(buf, 8) as usize;
        let selection = u32_at(buf, 12) as usize;
        let page_start = u32_at(buf, 16) as usize;
        let page_size = u32_at(buf, 20) as usize;

        let offsets_end = CANDIDATE_HEADER_LEN + count.saturating_mul(4);
        if offsets_end > buf.len() {
            return Err(DecodeError::TruncatedOffsets {
                len: buf.len(),
                count,
            });
        }

        let mut candidates = Vec::with_capacity(count);
        for index in 0..count {
            let offset = u32_at(buf, CANDIDATE_HEADER_LEN + index * 4) as usize;
            if offset >= buf.len() {
                return Err(DecodeError::OffsetOutOfRange {
                    index,
                    offset,
                    len: buf.len(),
                });
            }
            // A missing terminator runs to the end of the buffer.
            candidates.push(encoding.decode_nul_terminated(&buf[offset..]));
        }

        Ok(Self {
            candidates,
            selection,
            page_start,
            page_size,
        })
    }

    /// An empty list with zeroed metadata, used when the subsystem reports
    /// no candidate data at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True when no candidates are offered.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.candidates.get(index).map(String::as_str)
    }

    /// Iterate over all candidates in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    /// Index of the currently selected candidate, as reported.
    pub fn selection(&self) -> usize {
        self.selection
    }

    /// First candidate index of the visible page, as reported.
    pub fn page_start(&self) -> usize {
        self.page_start
    }

    /// Number of candidates per page, as reported.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The currently selected candidate, when the reported selection is in
    /// range.
    pub fn selected(&self) -> Option<&str> {
        self.get(self.selection)
    }

    /// The candidates of the visible page. The window is clamped to the
    /// actual candidate count.
    pub fn page(&self) -> &[String] {
        let start = self.page_start.min(self.candidates.len());
        let end = start
            .saturating_add(self.page_size)
            .min(self.candidates.len());
        &self.candidates[start..end]
    }
}

impl Index<usize> for CandidateList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.candidates[index]
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

fn u32_at(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
}
