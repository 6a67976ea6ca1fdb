// src/record.rs
//
// Single NDEF record codec. Wire layout of one record:
//
//   [header] [type len] [payload len: 1 or 4] [id len?] [type] [id?] [payload]
//
// Header byte: MB(0x80) ME(0x40) CF(0x20) SR(0x10) IL(0x08) TNF(0x07)
use serde::Serialize;

use crate::error::NdefError;

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// Type Name Format, the low 3 bits of the record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Tnf {
    Empty = 0x00,
    WellKnown = 0x01,
    MimeMedia = 0x02,
    AbsoluteUri = 0x03,
    ExternalType = 0x04,
    Unknown = 0x05,
    Unchanged = 0x06,
    Reserved = 0x07,
}

impl Tnf {
    /// Extracts the TNF from a raw header byte. Total: the value is masked
    /// to 3 bits first, so every input maps to a variant.
    pub fn from_header_byte(byte: u8) -> Tnf {
        match byte & TNF_MASK {
            0x00 => Tnf::Empty,
            0x01 => Tnf::WellKnown,
            0x02 => Tnf::MimeMedia,
            0x03 => Tnf::AbsoluteUri,
            0x04 => Tnf::ExternalType,
            0x05 => Tnf::Unknown,
            0x06 => Tnf::Unchanged,
            0x07 => Tnf::Reserved,
            _ => unreachable!("masked to 3 bits"),
        }
    }
}

/// One NDEF record. Owns its type/payload/id buffers; `Clone` deep-copies
/// all three, so no two records ever share mutable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NdefRecord {
    tnf: Tnf,
    record_type: Vec<u8>,
    payload: Vec<u8>,
    id: Option<Vec<u8>>,
}

/// Result of decoding one record: the record itself, how many input bytes it
/// consumed, and the MB/ME framing flags recovered from the header.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedRecord {
    pub record: NdefRecord,
    pub consumed: usize,
    pub is_first: bool,
    pub is_last: bool,
}

impl Default for NdefRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl NdefRecord {
    /// An empty record: TNF `Empty`, no type, no payload, no id.
    pub fn new() -> Self {
        NdefRecord {
            tnf: Tnf::Empty,
            record_type: Vec::new(),
            payload: Vec::new(),
            id: None,
        }
    }

    pub fn tnf(&self) -> Tnf {
        self.tnf
    }

    pub fn set_tnf(&mut self, tnf: Tnf) {
        self.tnf = tnf;
    }

    pub fn record_type(&self) -> &[u8] {
        &self.record_type
    }

    /// Replaces the type buffer. Type length is a 1-byte wire field, so
    /// anything over 255 bytes is a caller bug.
    pub fn set_type(&mut self, record_type: &[u8]) {
        assert!(record_type.len() <= 0xFF, "type length exceeds 255 bytes");
        self.record_type = record_type.to_vec();
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replaces the payload buffer. The full 32-bit length range is
    /// supported; the 4-byte long form is used above 255 bytes.
    pub fn set_payload(&mut self, payload: &[u8]) {
        assert!(payload.len() <= u32::MAX as usize, "payload length exceeds 32 bits");
        self.payload = payload.to_vec();
    }

    /// Replaces the payload with `header` followed by `body` in a single
    /// allocation. Used when the payload starts with a sub-format header
    /// block, e.g. the URI abbreviation byte.
    pub fn set_payload_with_header(&mut self, header: &[u8], body: &[u8]) {
        let total = header.len() + body.len();
        assert!(total <= u32::MAX as usize, "payload length exceeds 32 bits");
        let mut payload = Vec::with_capacity(total);
        payload.extend_from_slice(header);
        payload.extend_from_slice(body);
        self.payload = payload;
    }

    /// `None` means the record carries no id field at all; that is distinct
    /// from a present, zero-length id.
    pub fn id(&self) -> Option<&[u8]> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: &[u8]) {
        assert!(id.len() <= 0xFF, "id length exceeds 255 bytes");
        self.id = Some(id.to_vec());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Encoded size in bytes. Recomputed on every call; nothing is cached
    /// across mutation.
    pub fn encoded_size(&self) -> usize {
        let mut size = 2; // header + type length
        size += if self.payload.len() <= 0xFF { 1 } else { 4 };
        if self.id.is_some() {
            size += 1;
        }
        size + self.record_type.len() + self.payload.len() + self.id.as_deref().map_or(0, <[u8]>::len)
    }

    fn header_byte(&self, is_first: bool, is_last: bool) -> u8 {
        let mut header = self.tnf as u8;
        if is_first {
            header |= FLAG_MB;
        }
        if is_last {
            header |= FLAG_ME;
        }
        // CF is never set: this codec does not produce chunked records
        if self.payload.len() <= 0xFF {
            header |= FLAG_SR;
        }
        if self.id.is_some() {
            header |= FLAG_IL;
        }
        header
    }

    /// Encodes the record into `buf` and returns the number of bytes
    /// written (always `encoded_size()`).
    ///
    /// # Panics
    /// If `buf` is smaller than `encoded_size()`. An undersized buffer is a
    /// contract violation by the caller, not a recoverable condition.
    pub fn encode_into(&self, buf: &mut [u8], is_first: bool, is_last: bool) -> usize {
        let size = self.encoded_size();
        assert!(
            buf.len() >= size,
            "encode buffer too small: {} < {}",
            buf.len(),
            size
        );

        buf[0] = self.header_byte(is_first, is_last);
        buf[1] = self.record_type.len() as u8;
        let mut at = 2;

        let payload_len = self.payload.len();
        if payload_len <= 0xFF {
            buf[at] = payload_len as u8;
            at += 1;
        } else {
            buf[at..at + 4].copy_from_slice(&(payload_len as u32).to_be_bytes());
            at += 4;
        }

        if let Some(id) = &self.id {
            buf[at] = id.len() as u8;
            at += 1;
        }

        buf[at..at + self.record_type.len()].copy_from_slice(&self.record_type);
        at += self.record_type.len();

        if let Some(id) = &self.id {
            buf[at..at + id.len()].copy_from_slice(id);
            at += id.len();
        }

        buf[at..at + payload_len].copy_from_slice(&self.payload);
        at + payload_len
    }

    /// Allocating form of `encode_into`.
    pub fn encode(&self, is_first: bool, is_last: bool) -> Vec<u8> {
        let mut buf = vec![0u8; self.encoded_size()];
        self.encode_into(&mut buf, is_first, is_last);
        buf
    }

    /// Decodes one record from the front of `buf`.
    ///
    /// The payload length field width is selected by the SR flag from the
    /// header, never by re-measuring. `buf` comes from tag memory and is
    /// untrusted: any declared length that overruns it is a `Truncated`
    /// error, never an out-of-bounds read or a panic.
    pub fn decode(buf: &[u8]) -> Result<DecodedRecord, NdefError> {
        need(buf, 0, 2)?;
        let header = buf[0];
        if header & FLAG_CF != 0 {
            return Err(NdefError::ChunkedRecord);
        }

        let is_first = header & FLAG_MB != 0;
        let is_last = header & FLAG_ME != 0;
        let short_record = header & FLAG_SR != 0;
        let has_id = header & FLAG_IL != 0;
        let tnf = Tnf::from_header_byte(header);

        let type_len = buf[1] as usize;
        let mut at = 2;

        let payload_len = if short_record {
            need(buf, at, 1)?;
            let len = buf[at] as usize;
            at += 1;
            len
        } else {
            need(buf, at, 4)?;
            let len = u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]) as usize;
            at += 4;
            len
        };

        let id_len = if has_id {
            need(buf, at, 1)?;
            let len = buf[at] as usize;
            at += 1;
            len
        } else {
            0
        };

        need(buf, at, type_len)?;
        let record_type = buf[at..at + type_len].to_vec();
        at += type_len;

        // id precedes payload, matching the encode order
        let id = if has_id {
            need(buf, at, id_len)?;
            let id = buf[at..at + id_len].to_vec();
            at += id_len;
            Some(id)
        } else {
            None
        };

        need(buf, at, payload_len)?;
        let payload = buf[at..at + payload_len].to_vec();
        at += payload_len;

        Ok(DecodedRecord {
            record: NdefRecord {
                tnf,
                record_type,
                payload,
                id,
            },
            consumed: at,
            is_first,
            is_last,
        })
    }
}

fn need(buf: &[u8], at: usize, n: usize) -> Result<(), NdefError> {
    let end = at.saturating_add(n);
    if end > buf.len() {
        return Err(NdefError::Truncated {
            needed: end,
            available: buf.len(),
        });
    }
    Ok(())
}
