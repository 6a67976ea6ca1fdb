// src/error.rs
use thiserror::Error;

use crate::tag::TagType;

/// Errors reported by the codec and the container engine.
///
/// Decode errors (`Truncated`, `NoTlv`, `MalformedTlv`) come from untrusted
/// tag memory and are always recoverable. Driver errors are passed through
/// unchanged with no retry at this layer. Contract violations (encoding into
/// an undersized buffer, oversized field setters) panic instead; those are
/// bugs in the calling code, not runtime conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NdefError {
    /// A declared length would run past the end of the input buffer.
    #[error("truncated input: need {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    /// The record header has the chunk flag (CF, 0x20) set. Chunked records
    /// are never produced by this codec and are rejected on decode.
    #[error("chunked records are not supported")]
    ChunkedRecord,

    /// No NDEF message TLV (tag 0x03) in the scanned memory image.
    #[error("no NDEF TLV found")]
    NoTlv,

    /// A TLV length field runs past the end of the available image.
    #[error("malformed TLV: declared {declared} bytes, {available} available")]
    MalformedTlv { declared: usize, available: usize },

    /// The encoded message plus TLV overhead does not fit the tag's usable
    /// data region. Detected before any block is written.
    #[error("message needs {needed} bytes but tag has {capacity} usable")]
    TagTooSmall { needed: usize, capacity: usize },

    /// Sector authentication was rejected by the tag.
    #[error("authentication failed for sector at block {block}")]
    AuthFailed { block: u8 },

    /// A block read/write failed in the driver.
    #[error("driver I/O error at block {block}: {reason}")]
    Io { block: u8, reason: String },

    /// A write sequence failed partway through. `written` lists the blocks
    /// that were confirmed persisted before the failure; the tag is left in
    /// a partially written state (block storage has no transactions).
    #[error("write failed at block {block}, {} block(s) already persisted", written.len())]
    WriteFailed {
        block: u8,
        written: Vec<u8>,
        source: Box<NdefError>,
    },

    /// The tag family is not handled by this crate.
    #[error("tag type {0:?} is not supported")]
    UnsupportedTag(TagType),
}
