// src/driver.rs
//
// The boundary to the hardware. The container engine owns no radio state:
// everything physical goes through this trait, one block at a time.
use crate::error::NdefError;
use crate::tag::TagType;

/// Block size for the tag families in scope.
pub const BLOCK_SIZE: usize = 16;

/// Opaque 6-byte sector key. Passed through to the tag, never derived or
/// attacked here.
pub type MifareKey = [u8; 6];

/// Transport key the factory ships Classic tags with.
pub const DEFAULT_KEY: MifareKey = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    A,
    B,
}

/// Block-granular access to one physical tag.
///
/// Implementations wrap a PC/SC card, an MFRC522, or (in tests) a plain
/// in-memory image. Errors are propagated unchanged; retry policy, if any,
/// belongs to the implementation or the caller.
pub trait TagDriver {
    /// Reads one block. Expected to return `BLOCK_SIZE` bytes for the
    /// families in scope.
    fn read_block(&mut self, block: u8) -> Result<Vec<u8>, NdefError>;

    /// Writes one block.
    fn write_block(&mut self, block: u8, data: &[u8]) -> Result<(), NdefError>;

    /// Authenticates the sector containing `block` with `key`.
    fn authenticate(&mut self, block: u8, key: &MifareKey, key_type: KeyType)
    -> Result<(), NdefError>;

    /// UID of the tag currently in the field.
    fn uid(&self) -> &[u8];

    /// Family of the tag currently in the field.
    fn tag_type(&self) -> TagType;

    /// Polls for tag presence. `false` is a normal, frequent outcome, not
    /// an error.
    fn tag_present(&mut self) -> bool;
}

impl<D: TagDriver + ?Sized> TagDriver for &mut D {
    fn read_block(&mut self, block: u8) -> Result<Vec<u8>, NdefError> {
        (**self).read_block(block)
    }

    fn write_block(&mut self, block: u8, data: &[u8]) -> Result<(), NdefError> {
        (**self).write_block(block, data)
    }

    fn authenticate(
        &mut self,
        block: u8,
        key: &MifareKey,
        key_type: KeyType,
    ) -> Result<(), NdefError> {
        (**self).authenticate(block, key, key_type)
    }

    fn uid(&self) -> &[u8] {
        (**self).uid()
    }

    fn tag_type(&self) -> TagType {
        (**self).tag_type()
    }

    fn tag_present(&mut self) -> bool {
        (**self).tag_present()
    }
}
