// src/classic.rs
//
// TLV container engine for MIFARE Classic family tags: maps an encoded
// NDEF message onto the tag's block layout and back. All hardware access
// goes through the TagDriver; this module owns no radio state.
use log::{debug, trace, warn};

use crate::driver::{KeyType, MifareKey, TagDriver};
use crate::error::NdefError;
use crate::geometry::TagGeometry;
use crate::message::NdefMessage;
use crate::tag::NfcTag;
use crate::tlv;

/// Factory sector trailer: default key A, transport access bits, default
/// key B. Written by `clean` only.
const FACTORY_TRAILER: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // key A
    0xFF, 0x07, 0x80, 0x69, // access bits + GPB
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // key B
];

/// Reads and writes the NDEF region of a Classic-family tag.
///
/// Every operation is synchronous and runs against the tag currently in the
/// field; nothing is cached across calls. A write that fails after some
/// blocks were persisted leaves the tag partially written — block storage
/// has no transactions — and the failure reports exactly which blocks were
/// confirmed (see `NdefError::WriteFailed`).
pub struct MifareClassic<D: TagDriver> {
    driver: D,
    geometry: TagGeometry,
    key: MifareKey,
}

impl<D: TagDriver> MifareClassic<D> {
    pub fn new(driver: D, geometry: TagGeometry, key: MifareKey) -> Self {
        MifareClassic {
            driver,
            geometry,
            key,
        }
    }

    pub fn geometry(&self) -> TagGeometry {
        self.geometry
    }

    /// Reads the tag and decodes its NDEF message into a snapshot.
    ///
    /// A tag with no NDEF TLV yields a snapshot without a message; that is
    /// the normal state of an unwritten tag. A TLV whose length overruns
    /// the usable region, or a message that fails to decode, is an error.
    pub fn read(&mut self) -> Result<NfcTag, NdefError> {
        let uid = self.driver.uid().to_vec();
        let tag_type = self.driver.tag_type();
        let image = self.read_image()?;

        match tlv::decode_tlv(&image) {
            Ok(info) => {
                debug!(
                    "NDEF TLV: {} byte message at offset {}",
                    info.message_length, info.message_start
                );
                let body = &image[info.message_start..info.message_start + info.message_length];
                let message = NdefMessage::decode(body)?;
                Ok(NfcTag::new(uid, tag_type, Some(message)))
            }
            Err(NdefError::NoTlv) => {
                debug!("tag {} has no NDEF TLV", hex::encode_upper(&uid));
                Ok(NfcTag::new(uid, tag_type, None))
            }
            Err(e) => Err(e),
        }
    }

    /// Encodes `message`, wraps it in a TLV and persists it block by block.
    ///
    /// Capacity is checked before any block is touched; `TagTooSmall` means
    /// the tag was not modified at all.
    pub fn write(&mut self, message: &NdefMessage) -> Result<(), NdefError> {
        let encoded = message.encode();
        let needed = tlv::buffer_size(encoded.len(), self.geometry.block_size);
        let capacity = self.geometry.data_capacity();
        if needed > capacity {
            return Err(NdefError::TagTooSmall { needed, capacity });
        }

        debug!(
            "writing {} byte message ({} bytes TLV-wrapped)",
            encoded.len(),
            needed
        );
        let buffer = tlv::wrap(&encoded, self.geometry.block_size);
        self.write_region(&buffer)
    }

    /// Installs an empty NDEF TLV (`03 00 FE`) across the whole usable
    /// region, zeroing everything behind it.
    pub fn format(&mut self) -> Result<(), NdefError> {
        let mut buffer = vec![0u8; self.geometry.data_capacity()];
        buffer[0] = tlv::TLV_NDEF_MESSAGE;
        buffer[1] = 0x00;
        buffer[2] = tlv::TLV_TERMINATOR;

        debug!("formatting: empty NDEF TLV over {} bytes", buffer.len());
        self.write_region(&buffer)
    }

    /// Restores manufacturer defaults: zeroes every data block and rewrites
    /// every sector trailer with the factory key and access bits.
    ///
    /// Destructive and irreversible; not a format. Sector 0 (manufacturer
    /// block + MAD) is left untouched.
    pub fn clean(&mut self) -> Result<(), NdefError> {
        warn!("factory clean: erasing data and restoring default trailers");

        let zero_block = vec![0u8; self.geometry.block_size];
        let mut written: Vec<u8> = Vec::new();
        let mut authed_sector = None;

        for block in self.geometry.first_data_block..self.geometry.total_blocks {
            self.auth_for(block, &mut authed_sector, &written)?;

            let data: &[u8] = if self.geometry.is_trailer(block) {
                &FACTORY_TRAILER
            } else {
                &zero_block
            };
            self.driver
                .write_block(block, data)
                .map_err(|source| NdefError::WriteFailed {
                    block,
                    written: written.clone(),
                    source: Box::new(source),
                })?;
            written.push(block);
        }

        debug!("clean complete, {} blocks rewritten", written.len());
        Ok(())
    }

    /// Reads data blocks in storage order into one linear image, stopping
    /// early once the full TLV-declared message is in hand.
    fn read_image(&mut self) -> Result<Vec<u8>, NdefError> {
        let block_size = self.geometry.block_size;
        let mut image = Vec::new();
        let mut authed_sector = None;

        for block in self.geometry.data_blocks().collect::<Vec<u8>>() {
            let sector = self.geometry.sector_start(block);
            if authed_sector != Some(sector) {
                self.driver.authenticate(block, &self.key, KeyType::A)?;
                authed_sector = Some(sector);
            }

            let data = self.driver.read_block(block)?;
            if data.len() < block_size {
                return Err(NdefError::Io {
                    block,
                    reason: format!("short read: {} of {} bytes", data.len(), block_size),
                });
            }
            trace!("block {block:2}: {}", hex::encode(&data[..block_size]));
            image.extend_from_slice(&data[..block_size]);

            // stop as soon as the declared message is fully in the image
            if tlv::decode_tlv(&image).is_ok() {
                break;
            }
        }

        Ok(image)
    }

    /// Writes a block-aligned buffer over the data blocks in storage order,
    /// authenticating at each sector boundary and skipping trailers.
    fn write_region(&mut self, buffer: &[u8]) -> Result<(), NdefError> {
        debug_assert_eq!(buffer.len() % self.geometry.block_size, 0);

        let mut written: Vec<u8> = Vec::new();
        let mut authed_sector = None;
        let mut chunks = buffer.chunks(self.geometry.block_size);

        for block in self.geometry.data_blocks().collect::<Vec<u8>>() {
            let Some(chunk) = chunks.next() else {
                break;
            };

            self.auth_for(block, &mut authed_sector, &written)?;
            self.driver
                .write_block(block, chunk)
                .map_err(|source| NdefError::WriteFailed {
                    block,
                    written: written.clone(),
                    source: Box::new(source),
                })?;
            written.push(block);
        }

        debug!("persisted blocks {written:?}");
        Ok(())
    }

    fn auth_for(
        &mut self,
        block: u8,
        authed_sector: &mut Option<u8>,
        written: &[u8],
    ) -> Result<(), NdefError> {
        let sector = self.geometry.sector_start(block);
        if *authed_sector == Some(sector) {
            return Ok(());
        }
        self.driver
            .authenticate(block, &self.key, KeyType::A)
            .map_err(|source| NdefError::WriteFailed {
                block,
                written: written.to_vec(),
                source: Box::new(source),
            })?;
        *authed_sector = Some(sector);
        Ok(())
    }
}
