// src/tag.rs
use serde::Serialize;

use crate::message::NdefMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagType {
    MifareClassic1k,
    MifareClassicMini,
    MifareUltralight,
    Unknown,
}

/// Read-only snapshot of a tag, produced once per read cycle and never
/// retained across operations (the physical tag may be swapped between
/// polls).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NfcTag {
    uid: Vec<u8>,
    tag_type: TagType,
    message: Option<NdefMessage>,
}

impl NfcTag {
    pub fn new(uid: Vec<u8>, tag_type: TagType, message: Option<NdefMessage>) -> Self {
        NfcTag {
            uid,
            tag_type,
            message,
        }
    }

    pub fn uid(&self) -> &[u8] {
        &self.uid
    }

    pub fn uid_string(&self) -> String {
        hex::encode_upper(&self.uid)
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    /// A tag with no NDEF message is normal, not an error.
    pub fn has_ndef_message(&self) -> bool {
        self.message.is_some()
    }

    pub fn ndef_message(&self) -> Option<&NdefMessage> {
        self.message.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_formats_as_upper_hex() {
        let tag = NfcTag::new(vec![0xDE, 0xAD, 0xBE, 0xEF], TagType::MifareClassic1k, None);
        assert_eq!(tag.uid_string(), "DEADBEEF");
        assert!(!tag.has_ndef_message());
    }

    #[test]
    fn serializes_for_frontend_consumption() {
        let mut message = NdefMessage::new();
        message.add_text_record("hi");
        let tag = NfcTag::new(vec![0x01, 0x02], TagType::MifareClassic1k, Some(message));

        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["tag_type"], "MifareClassic1k");
        assert_eq!(json["uid"], serde_json::json!([1, 2]));
        assert_eq!(json["message"]["records"][0]["tnf"], "WellKnown");
    }
}
