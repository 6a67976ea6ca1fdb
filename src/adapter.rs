// src/adapter.rs
use log::debug;

use crate::classic::MifareClassic;
use crate::driver::{DEFAULT_KEY, MifareKey, TagDriver};
use crate::error::NdefError;
use crate::geometry::TagGeometry;
use crate::message::NdefMessage;
use crate::tag::{NfcTag, TagType};

/// High-level entry point: owns the driver and a sector key, dispatches
/// each operation to the engine for the tag family currently in the field.
pub struct NfcAdapter<D: TagDriver> {
    driver: D,
    key: MifareKey,
}

impl<D: TagDriver> NfcAdapter<D> {
    /// Adapter using the factory default key `FF FF FF FF FF FF`.
    pub fn new(driver: D) -> Self {
        Self::with_key(driver, DEFAULT_KEY)
    }

    /// Adapter using a custom sector key.
    pub fn with_key(driver: D, key: MifareKey) -> Self {
        NfcAdapter { driver, key }
    }

    /// Polls for a tag. `false` is the normal idle outcome.
    pub fn tag_present(&mut self) -> bool {
        self.driver.tag_present()
    }

    /// Reads the current tag into a snapshot. A tag without NDEF data
    /// yields a snapshot with no message.
    pub fn read(&mut self) -> Result<NfcTag, NdefError> {
        self.engine()?.read()
    }

    /// Writes `message` to the current tag, replacing any existing NDEF
    /// content.
    pub fn write(&mut self, message: &NdefMessage) -> Result<(), NdefError> {
        self.engine()?.write(message)
    }

    /// Erases the tag by writing an empty NDEF message.
    pub fn erase(&mut self) -> Result<(), NdefError> {
        self.engine()?.write(&NdefMessage::new())
    }

    /// Formats the tag with an empty NDEF TLV across the usable region.
    pub fn format(&mut self) -> Result<(), NdefError> {
        self.engine()?.format()
    }

    /// Restores manufacturer defaults. Destructive; not a format.
    pub fn clean(&mut self) -> Result<(), NdefError> {
        self.engine()?.clean()
    }

    fn engine(&mut self) -> Result<MifareClassic<&mut D>, NdefError> {
        let tag_type = self.driver.tag_type();
        let geometry = match tag_type {
            TagType::MifareClassic1k => TagGeometry::classic_1k(),
            TagType::MifareClassicMini => TagGeometry::classic_mini(),
            other => return Err(NdefError::UnsupportedTag(other)),
        };
        debug!("tag type {tag_type:?}, {} usable bytes", geometry.data_capacity());
        Ok(MifareClassic::new(&mut self.driver, geometry, self.key))
    }
}
