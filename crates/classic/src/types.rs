//! Card-facing value types: UID, sector keys, key slots, ATQA/SAK

use std::fmt;

use zeroize::Zeroize;

/// Card UID resolved by the anti-collision cascade
///
/// A UID spans one, two or three cascade levels (4, 7 or 10 bytes). It is
/// immutable once resolved and identifies the card only while it stays
/// powered in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uid {
    /// Single-size UID (one cascade level)
    Single([u8; 4]),
    /// Double-size UID (two cascade levels)
    Double([u8; 7]),
    /// Triple-size UID (three cascade levels)
    Triple([u8; 10]),
}

impl Uid {
    /// The raw UID bytes in transmission order
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Single(b) => b,
            Self::Double(b) => b,
            Self::Triple(b) => b,
        }
    }

    /// The four UID bytes the card uses during CRYPTO1 authentication
    ///
    /// These are the bytes of the final cascade level, i.e. the last four
    /// bytes of the UID.
    pub fn auth_bytes(&self) -> [u8; 4] {
        let bytes = self.as_bytes();
        let mut out = [0u8; 4];
        out.copy_from_slice(&bytes[bytes.len() - 4..]);
        out
    }

    /// Number of cascade levels this UID spans
    pub const fn cascade_levels(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Double(_) => 2,
            Self::Triple(_) => 3,
        }
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.as_bytes()))
    }
}

/// One of the two independent keys a sector carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    /// Key A
    A,
    /// Key B
    B,
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// 6-byte MIFARE Classic sector key
///
/// Supplied by the caller per authentication attempt and never persisted by
/// the core; the bytes are wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct SectorKey([u8; 6]);

impl SectorKey {
    /// The factory transport key `FF FF FF FF FF FF`
    pub const TRANSPORT: Self = Self([0xFF; 6]);

    /// Wrap raw key bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// The key bytes
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// The key as the 48-bit integer the cipher key schedule consumes
    pub(crate) fn as_u64(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &b| acc << 8 | b as u64)
    }
}

// Never print key material, not even in debug output.
impl fmt::Debug for SectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SectorKey(..)")
    }
}

/// Answer To Request (ATQA), two bytes announcing a card in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atqa(pub [u8; 2]);

/// Select Acknowledge (SAK)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sak(pub u8);

impl Sak {
    /// Whether the UID is incomplete and another cascade level must run
    pub const fn uid_incomplete(&self) -> bool {
        self.0 & rc522_iso14443::picc::SAK_UID_INCOMPLETE != 0
    }
}
