// src/geometry.rs
//
// Tag geometry as data instead of compiled-in constants, so multiple tag
// sub-families are supported by substitution.

/// Physical layout of a Classic-family tag: block size, sector stride and
/// the usable block range. The last block of every sector is the trailer
/// (keys + access bits) and is never data.
///
/// Only uniform-stride layouts are modeled; the 4K's mixed 4/16-block
/// sector map is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagGeometry {
    /// Bytes per block.
    pub block_size: usize,
    /// Blocks per sector (trailer stride).
    pub blocks_per_sector: u8,
    /// First block usable for the NDEF TLV. Sector 0 holds manufacturer
    /// data and the MAD, so Classic layouts start at block 4.
    pub first_data_block: u8,
    /// Total number of blocks on the tag.
    pub total_blocks: u8,
}

impl TagGeometry {
    /// MIFARE Classic 1K: 16 sectors of 4 blocks.
    pub const fn classic_1k() -> Self {
        TagGeometry {
            block_size: 16,
            blocks_per_sector: 4,
            first_data_block: 4,
            total_blocks: 64,
        }
    }

    /// MIFARE Classic Mini: 5 sectors of 4 blocks.
    pub const fn classic_mini() -> Self {
        TagGeometry {
            block_size: 16,
            blocks_per_sector: 4,
            first_data_block: 4,
            total_blocks: 20,
        }
    }

    /// Whether `block` is a sector trailer.
    pub fn is_trailer(&self, block: u8) -> bool {
        (block + 1) % self.blocks_per_sector == 0
    }

    /// First block of the sector containing `block`.
    pub fn sector_start(&self, block: u8) -> u8 {
        block - block % self.blocks_per_sector
    }

    /// Usable data blocks in storage order, trailers skipped.
    pub fn data_blocks(&self) -> impl Iterator<Item = u8> + '_ {
        (self.first_data_block..self.total_blocks).filter(|&b| !self.is_trailer(b))
    }

    /// First data block available for the TLV to begin in.
    pub fn ndef_start_block(&self) -> u8 {
        self.first_data_block
    }

    /// Usable capacity in bytes.
    pub fn data_capacity(&self) -> usize {
        self.data_blocks().count() * self.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_1k_trailers() {
        let geometry = TagGeometry::classic_1k();
        assert!(geometry.is_trailer(3));
        assert!(geometry.is_trailer(7));
        assert!(geometry.is_trailer(63));
        assert!(!geometry.is_trailer(4));
        assert!(!geometry.is_trailer(62));
    }

    #[test]
    fn data_blocks_skip_trailers() {
        let geometry = TagGeometry::classic_1k();
        let blocks: Vec<u8> = geometry.data_blocks().collect();
        assert_eq!(&blocks[..6], &[4, 5, 6, 8, 9, 10]);
        assert_eq!(blocks.len(), 45);
        assert!(blocks.iter().all(|&b| !geometry.is_trailer(b)));
    }

    #[test]
    fn classic_1k_capacity() {
        // 15 NDEF sectors x 3 data blocks x 16 bytes
        assert_eq!(TagGeometry::classic_1k().data_capacity(), 720);
    }

    #[test]
    fn classic_mini_capacity() {
        // 4 NDEF sectors x 3 data blocks x 16 bytes
        assert_eq!(TagGeometry::classic_mini().data_capacity(), 192);
    }

    #[test]
    fn ndef_starts_past_sector_zero() {
        let geometry = TagGeometry::classic_1k();
        assert_eq!(geometry.ndef_start_block(), 4);
        assert_eq!(geometry.data_blocks().next(), Some(4));
    }

    #[test]
    fn sector_start() {
        let geometry = TagGeometry::classic_1k();
        assert_eq!(geometry.sector_start(4), 4);
        assert_eq!(geometry.sector_start(6), 4);
        assert_eq!(geometry.sector_start(9), 8);
    }
}
