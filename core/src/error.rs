//! Error types for buffer decoding and bridge queries.
//!
//! The subsystem reports its own failures through sentinel return values
//! (null handles, non-positive sizes), not through errors; those degrade to
//! neutral results at the bridge surface. The errors here cover the cases
//! the bridge itself detects: buffers whose contents are inconsistent with
//! their declared layout, and configuration that cannot be resolved.

use thiserror::Error;

/// A buffer handed over by the subsystem is inconsistent with its declared
/// layout. These are never silently truncated away; decoding stops and the
/// error is surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Candidate buffer is shorter than its fixed header.
    #[error("candidate buffer of {len} bytes is shorter than the {expected}-byte header")]
    TruncatedHeader { len: usize, expected: usize },

    /// Candidate header declares more offset entries than the buffer holds.
    #[error("candidate buffer of {len} bytes cannot hold {count} offset entries")]
    TruncatedOffsets { len: usize, count: usize },

    /// An offset points outside the buffer it indexes into.
    #[error("offset {offset} at entry {index} lies outside the {len}-byte buffer")]
    OffsetOutOfRange {
        index: usize,
        offset: usize,
        len: usize,
    },

    /// Clause boundaries must be non-decreasing byte positions.
    #[error("clause boundary {offset} at entry {index} precedes the previous boundary {previous}")]
    UnorderedClauseBoundary {
        index: usize,
        offset: usize,
        previous: usize,
    },

    /// The clause buffer must be a whole number of 4-byte offsets.
    #[error("clause buffer length {len} is not a multiple of 4")]
    MisalignedClauseBuffer { len: usize },
}

/// Errors surfaced by the bridge itself.
#[derive(Debug, Error)]
pub enum ImmError {
    /// The subsystem returned no input context for the target window.
    #[error("no input context available for the target window")]
    NoContext,

    /// The configured legacy encoding label is not a known code page.
    #[error("unknown legacy encoding label: {0:?}")]
    UnknownEncoding(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
