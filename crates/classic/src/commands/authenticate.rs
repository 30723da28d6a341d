//! AUTH: open the CRYPTO1 handshake for one sector key

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{crc, picc};

use super::{COMMAND_TIMEOUT, CardCommand, require_len};
use crate::error::Result;
use crate::types::KeySlot;

/// First pass of the three-pass authentication: `[0x60|0x61, block] + CRC_A`
///
/// The card answers with its 4-byte challenge nonce `nt`. The remaining two
/// passes are ciphered and driven by the session, not by this codec.
#[derive(Debug, Clone, Copy)]
pub struct Authenticate {
    /// Key slot to authenticate against
    pub slot: KeySlot,
    /// Absolute block address inside the target sector
    pub block: u8,
}

impl CardCommand for Authenticate {
    type Output = [u8; 4];

    const MAX_RESPONSE: usize = 4;
    const TIMEOUT: Duration = COMMAND_TIMEOUT;

    fn frame(&self) -> Bytes {
        let code = match self.slot {
            KeySlot::A => picc::AUTH_KEY_A,
            KeySlot::B => picc::AUTH_KEY_B,
        };
        let mut frame = vec![code, self.block];
        crc::append_crc_a(&mut frame);
        Bytes::from(frame)
    }

    fn parse(&self, raw: &[u8]) -> Result<[u8; 4]> {
        require_len("AUTH", raw, 4)?;
        let mut nt = [0u8; 4];
        nt.copy_from_slice(&raw[..4]);
        Ok(nt)
    }
}
