//! Text decoding for the two encodings the subsystem speaks.
//!
//! Composition, clause, and candidate text arrive in a locale-specific
//! legacy multi-byte code page (Shift_JIS, GBK, EUC-KR, ...), while layout
//! descriptions arrive as UTF-16LE. The two are kept separate on purpose;
//! unifying them (or assuming UTF-8 anywhere) breaks the byte-to-character
//! index translation that cursor and clause handling depend on.

use encoding_rs::Encoding;

/// The legacy multi-byte code page used for composition and candidate text.
///
/// Wraps a statically known `encoding_rs` encoding; copyable so decoders can
/// carry it by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyEncoding {
    encoding: &'static Encoding,
}

impl LegacyEncoding {
    /// Resolve an encoding label (e.g. `"shift_jis"`, `"euc-kr"`, `"gbk"`).
    /// Returns `None` for labels no code page is registered under.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(|encoding| Self { encoding })
    }

    /// Canonical name of the underlying code page.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode a byte buffer. Malformed sequences become replacement
    /// characters rather than errors, matching how the subsystem's own
    /// conversions behave.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (decoded, _, _) = self.encoding.decode(bytes);
        decoded.into_owned()
    }

    /// Decode up to (but not including) the first null byte.
    pub fn decode_nul_terminated(&self, bytes: &[u8]) -> String {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.decode(&bytes[..end])
    }

    /// Encode a string into this code page.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (encoded, _, _) = self.encoding.encode(text);
        encoded.into_owned()
    }

    /// Translate a byte offset into the encoded form of a string to a
    /// character index, by decoding the prefix `[0, byte_offset)` and
    /// counting its characters. Offsets past the end of the buffer are
    /// clamped to the end. Byte and character offsets are never 1:1 under
    /// a variable-width code page, so this is the only valid translation.
    pub fn char_index_at(&self, bytes: &[u8], byte_offset: usize) -> usize {
        let end = byte_offset.min(bytes.len());
        self.decode(&bytes[..end]).chars().count()
    }
}

impl Default for LegacyEncoding {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::SHIFT_JIS,
        }
    }
}

/// Decode a UTF-16LE byte buffer, dropping a trailing odd byte and any
/// trailing null terminators. Used only for layout descriptions.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let decoded = String::from_utf16_lossy(&units);
    decoded.trim_end_matches('\0').to_string()
}
