//! Card memory layout profiles
//!
//! MIFARE Classic sector size is not uniform: the first 32 sectors hold
//! 4 blocks each, sectors 32..40 on 4K cards hold 16. The mapping from
//! (sector, block-within-sector) to an absolute block address is therefore
//! an explicit, layout-parameterised pure function rather than an assumption
//! baked into the session.

use std::fmt;

use crate::error::{Error, Result};

/// Memory layout of the target card class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    /// MIFARE Classic 1K: 16 sectors of 4 blocks
    Classic1k,
    /// MIFARE Classic 4K: 32 sectors of 4 blocks, then 8 sectors of 16
    Classic4k,
}

impl CardLayout {
    /// Number of sectors on the card
    pub const fn sector_count(self) -> u8 {
        match self {
            Self::Classic1k => 16,
            Self::Classic4k => 40,
        }
    }

    /// Number of blocks in `sector`, or `None` if the sector does not exist
    pub const fn blocks_in_sector(self, sector: u8) -> Option<u8> {
        if sector >= self.sector_count() {
            None
        } else if sector < 32 {
            Some(4)
        } else {
            Some(16)
        }
    }

    /// Absolute block address of (`sector`, `block`)
    ///
    /// Pure mapping; out-of-range pairs are an error, never a wrap-around.
    pub fn block_address(self, sector: u8, block: u8) -> Result<u8> {
        match self.blocks_in_sector(sector) {
            Some(per_sector) if block < per_sector => {
                if sector < 32 {
                    Ok(sector * 4 + block)
                } else {
                    Ok(128 + (sector - 32) * 16 + block)
                }
            }
            _ => Err(Error::InvalidBlock {
                sector,
                block,
                layout: self,
            }),
        }
    }

    /// Sector containing the absolute block `address`
    pub const fn sector_of(self, address: u8) -> u8 {
        if address < 128 {
            address / 4
        } else {
            32 + (address - 128) / 16
        }
    }

    /// Whether `address` is a sector trailer (keys + access bits)
    pub const fn is_trailer(self, address: u8) -> bool {
        if address < 128 {
            address % 4 == 3
        } else {
            (address - 128) % 16 == 15
        }
    }
}

impl fmt::Display for CardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic1k => f.write_str("MIFARE Classic 1K"),
            Self::Classic4k => f.write_str("MIFARE Classic 4K"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_sector_addresses() {
        assert_eq!(CardLayout::Classic1k.block_address(0, 0).unwrap(), 0);
        assert_eq!(CardLayout::Classic1k.block_address(2, 1).unwrap(), 9);
        assert_eq!(CardLayout::Classic1k.block_address(15, 3).unwrap(), 63);
        assert_eq!(CardLayout::Classic4k.block_address(31, 3).unwrap(), 127);
    }

    #[test]
    fn high_sector_addresses_on_4k() {
        assert_eq!(CardLayout::Classic4k.block_address(32, 0).unwrap(), 128);
        assert_eq!(CardLayout::Classic4k.block_address(32, 15).unwrap(), 143);
        assert_eq!(CardLayout::Classic4k.block_address(39, 15).unwrap(), 255);
    }

    #[test]
    fn out_of_range_pairs_are_errors() {
        assert!(CardLayout::Classic1k.block_address(16, 0).is_err());
        assert!(CardLayout::Classic1k.block_address(2, 4).is_err());
        assert!(CardLayout::Classic4k.block_address(40, 0).is_err());
        assert!(CardLayout::Classic4k.block_address(32, 16).is_err());
        assert!(CardLayout::Classic4k.block_address(31, 4).is_err());
    }

    #[test]
    fn sector_of_inverts_block_address() {
        for layout in [CardLayout::Classic1k, CardLayout::Classic4k] {
            for sector in 0..layout.sector_count() {
                for block in 0..layout.blocks_in_sector(sector).unwrap() {
                    let address = layout.block_address(sector, block).unwrap();
                    assert_eq!(layout.sector_of(address), sector);
                }
            }
        }
    }

    #[test]
    fn trailer_detection() {
        assert!(CardLayout::Classic1k.is_trailer(3));
        assert!(!CardLayout::Classic1k.is_trailer(9));
        assert!(CardLayout::Classic4k.is_trailer(143));
        assert!(!CardLayout::Classic4k.is_trailer(128));
    }
}
