// src/message.rs
use std::ops::Index;

use serde::Serialize;

use crate::error::NdefError;
use crate::record::{NdefRecord, Tnf};

/// An ordered sequence of NDEF records. Order matters on the wire: the
/// first record gets the MB flag, the last one gets ME.
///
/// A message with no records is legal and encodes as a single `Tnf::Empty`
/// record (`D0 00 00`), which is also what `erase` writes to a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NdefMessage {
    records: Vec<NdefRecord>,
}

impl NdefMessage {
    pub fn new() -> Self {
        NdefMessage {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: NdefRecord) {
        self.records.push(record);
    }

    pub fn add_empty_record(&mut self) {
        self.records.push(NdefRecord::new());
    }

    /// Appends a well-known Text record ("T"): status byte with the
    /// language code length, then the language code, then UTF-8 text.
    pub fn add_text_record(&mut self, text: &str) {
        let lang = b"en";
        let mut payload = Vec::with_capacity(1 + lang.len() + text.len());
        payload.push(lang.len() as u8); // status byte: UTF-8, language length
        payload.extend_from_slice(lang);
        payload.extend_from_slice(text.as_bytes());

        let mut record = NdefRecord::new();
        record.set_tnf(Tnf::WellKnown);
        record.set_type(b"T");
        record.set_payload(&payload);
        self.records.push(record);
    }

    /// Appends a well-known URI record ("U"). The abbreviation byte 0x00
    /// means the URI is stored unabbreviated.
    pub fn add_uri_record(&mut self, uri: &str) {
        let mut record = NdefRecord::new();
        record.set_tnf(Tnf::WellKnown);
        record.set_type(b"U");
        record.set_payload_with_header(&[0x00], uri.as_bytes());
        self.records.push(record);
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, index: usize) -> Option<&NdefRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[NdefRecord] {
        &self.records
    }

    /// Total encoded size, recomputed on demand (records are mutable).
    pub fn encoded_size(&self) -> usize {
        if self.records.is_empty() {
            return NdefRecord::new().encoded_size();
        }
        self.records.iter().map(NdefRecord::encoded_size).sum()
    }

    /// Serializes the sequence with MB on the first record and ME on the
    /// last. A single-record message carries both flags.
    pub fn encode(&self) -> Vec<u8> {
        if self.records.is_empty() {
            return NdefRecord::new().encode(true, true);
        }

        let mut buf = vec![0u8; self.encoded_size()];
        let mut at = 0;
        let last = self.records.len() - 1;
        for (i, record) in self.records.iter().enumerate() {
            at += record.encode_into(&mut buf[at..], i == 0, i == last);
        }
        buf
    }

    /// Decodes records one at a time until the record marked ME is reached
    /// or the buffer is exhausted. Truncated input fails cleanly.
    pub fn decode(buf: &[u8]) -> Result<NdefMessage, NdefError> {
        let mut records = Vec::new();
        let mut at = 0;

        while at < buf.len() {
            let decoded = NdefRecord::decode(&buf[at..])?;
            at += decoded.consumed;
            let is_last = decoded.is_last;
            records.push(decoded.record);
            if is_last {
                break;
            }
        }

        Ok(NdefMessage { records })
    }
}

impl Index<usize> for NdefMessage {
    type Output = NdefRecord;

    fn index(&self, index: usize) -> &NdefRecord {
        &self.records[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_record_message() -> NdefMessage {
        let mut message = NdefMessage::new();
        message.add_text_record("hello");
        message.add_uri_record("https://m5stack.com/");
        message.add_text_record("goodbye");
        message
    }

    #[test]
    fn framing_flags_on_three_records() {
        let message = three_record_message();
        let encoded = message.encode();

        let first = NdefRecord::decode(&encoded).unwrap();
        assert!(first.is_first);
        assert!(!first.is_last);

        let middle = NdefRecord::decode(&encoded[first.consumed..]).unwrap();
        assert!(!middle.is_first);
        assert!(!middle.is_last);

        let last = NdefRecord::decode(&encoded[first.consumed + middle.consumed..]).unwrap();
        assert!(!last.is_first);
        assert!(last.is_last);
    }

    #[test]
    fn roundtrip_preserves_order() {
        let message = three_record_message();
        let decoded = NdefMessage::decode(&message.encode()).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.record_count(), 3);
        assert_eq!(decoded[1].record_type(), b"U");
    }

    #[test]
    fn single_record_sets_both_flags() {
        let mut message = NdefMessage::new();
        message.add_text_record("only");
        let encoded = message.encode();
        assert_eq!(encoded[0] & 0xC0, 0xC0);
    }

    #[test]
    fn empty_message_encodes_as_empty_record() {
        let message = NdefMessage::new();
        assert_eq!(message.encode(), vec![0xD0, 0x00, 0x00]);
        assert_eq!(message.encoded_size(), 3);
    }

    #[test]
    fn empty_message_roundtrips_as_one_empty_record() {
        // the wire form of an erased tag: exactly one Tnf::Empty record
        let decoded = NdefMessage::decode(&NdefMessage::new().encode()).unwrap();
        assert_eq!(decoded.record_count(), 1);
        assert_eq!(decoded[0].tnf(), Tnf::Empty);
        assert!(decoded[0].record_type().is_empty());
        assert!(decoded[0].payload().is_empty());
        assert_eq!(decoded[0].id(), None);
    }

    #[test]
    fn encode_length_matches_encoded_size() {
        let message = three_record_message();
        assert_eq!(message.encode().len(), message.encoded_size());
    }

    #[test]
    fn decode_stops_at_message_end() {
        let mut encoded = three_record_message().encode();
        // trailing garbage after the ME record must be ignored
        encoded.extend_from_slice(&[0xFE, 0x00, 0x00]);
        let decoded = NdefMessage::decode(&encoded).unwrap();
        assert_eq!(decoded.record_count(), 3);
    }

    #[test]
    fn truncated_message_fails_cleanly() {
        let encoded = three_record_message().encode();
        let err = NdefMessage::decode(&encoded[..encoded.len() - 3]).unwrap_err();
        assert!(matches!(err, NdefError::Truncated { .. }));
    }

    #[test]
    fn text_record_payload_layout() {
        let mut message = NdefMessage::new();
        message.add_text_record("hi");
        let payload = message[0].payload();
        assert_eq!(payload, b"\x02enhi");
    }
}
