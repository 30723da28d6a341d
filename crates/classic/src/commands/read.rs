//! READ: fetch one 16-byte block of an authenticated sector

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{crc, picc};

use super::{CardCommand, DATA_TIMEOUT, require_len};
use crate::error::{Error, Result};

/// Block read: `[0x30, block] + CRC_A`, reply 16 data bytes + CRC_A
///
/// Only valid inside an authenticated session; the session ciphers the frame
/// and deciphers the reply before this parser sees it.
#[derive(Debug, Clone, Copy)]
pub struct ReadBlock {
    /// Absolute block address
    pub address: u8,
}

impl CardCommand for ReadBlock {
    type Output = [u8; 16];

    const MAX_RESPONSE: usize = 18;
    const TIMEOUT: Duration = DATA_TIMEOUT;

    fn frame(&self) -> Bytes {
        let mut frame = vec![picc::READ, self.address];
        crc::append_crc_a(&mut frame);
        Bytes::from(frame)
    }

    fn parse(&self, raw: &[u8]) -> Result<[u8; 16]> {
        require_len("READ", raw, 18)?;
        if !crc::check_crc_a(&raw[..18]) {
            return Err(Error::ChecksumMismatch { context: "READ" });
        }
        let mut data = [0u8; 16];
        data.copy_from_slice(&raw[..16]);
        Ok(data)
    }
}
