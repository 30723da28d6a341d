//! PICC command bytes and framing constants (ISO/IEC 14443-3A + MIFARE Classic)
//!
//! These byte values are the hardware compatibility contract with the card:
//! they must be reproduced exactly as the reader module forwards them over
//! the RF interface.

/// REQA: probe for cards in state IDLE (short frame)
pub const REQA: u8 = 0x26;
/// WUPA: probe for cards in state IDLE or HALT (short frame)
pub const WUPA: u8 = 0x52;

/// SELECT/ANTICOLLISION cascade level 1
pub const SEL_CL1: u8 = 0x93;
/// SELECT/ANTICOLLISION cascade level 2
pub const SEL_CL2: u8 = 0x95;
/// SELECT/ANTICOLLISION cascade level 3
pub const SEL_CL3: u8 = 0x97;

/// NVB for a full anticollision frame (no known UID bits)
pub const NVB_ANTICOLLISION: u8 = 0x20;
/// NVB for a complete select frame (40 known bits: UID + BCC)
pub const NVB_SELECT: u8 = 0x70;

/// Cascade tag: first byte of a cascade level when more levels follow
pub const CASCADE_TAG: u8 = 0x88;
/// SAK bit flagging an incomplete UID (another cascade level runs)
pub const SAK_UID_INCOMPLETE: u8 = 0x04;

/// HLTA: place the selected card in state HALT
pub const HLTA: u8 = 0x50;

/// MIFARE Classic AUTH with key slot A
pub const AUTH_KEY_A: u8 = 0x60;
/// MIFARE Classic AUTH with key slot B
pub const AUTH_KEY_B: u8 = 0x61;
/// MIFARE Classic 16-byte block read
pub const READ: u8 = 0x30;
/// MIFARE Classic 16-byte block write (two-step)
pub const WRITE: u8 = 0xA0;

/// MIFARE 4-bit acknowledge
pub const ACK: u8 = 0x0A;
