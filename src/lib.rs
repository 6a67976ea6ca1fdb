//! NDEF message codec and TLV container engine for MIFARE Classic family
//! tags.
//!
//! The crate splits into two layers:
//!
//! - [`record`] / [`message`]: the NDEF wire format — bit-packed record
//!   headers, short/long payload lengths, MB/ME framing. Pure byte-buffer
//!   code, no knowledge of tags.
//! - [`tlv`] / [`geometry`] / [`classic`]: the container side — locating
//!   the NDEF TLV inside a tag's block image, sizing a write, splitting it
//!   across data blocks while skipping sector trailers.
//!
//! Hardware access goes through the [`driver::TagDriver`] trait; this crate
//! ships no transport implementation. [`adapter::NfcAdapter`] ties driver,
//! key and engine together for callers.
//!
//! Everything is synchronous and single-tag. A write that fails after some
//! blocks were persisted leaves the tag partially written; block-structured
//! storage has no transactions, so the failure result reports which blocks
//! were confirmed instead of hiding it (see
//! [`error::NdefError::WriteFailed`]).

pub mod adapter;
pub mod classic;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod message;
pub mod record;
pub mod tag;
pub mod tlv;

pub use adapter::NfcAdapter;
pub use classic::MifareClassic;
pub use driver::{BLOCK_SIZE, DEFAULT_KEY, KeyType, MifareKey, TagDriver};
pub use error::NdefError;
pub use geometry::TagGeometry;
pub use message::NdefMessage;
pub use record::{DecodedRecord, NdefRecord, Tnf};
pub use tag::{NfcTag, TagType};
