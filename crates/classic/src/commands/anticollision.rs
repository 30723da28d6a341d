//! ANTICOLLISION: read back one cascade level of UID bytes

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{crc, picc};

use super::{COMMAND_TIMEOUT, CardCommand, require_len};
use crate::error::{Error, Result};

/// Anticollision cascade level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeLevel {
    /// Cascade level 1 (SEL 0x93)
    One,
    /// Cascade level 2 (SEL 0x95)
    Two,
    /// Cascade level 3 (SEL 0x97)
    Three,
}

impl CascadeLevel {
    /// The SEL code byte for this level
    pub const fn sel_code(self) -> u8 {
        match self {
            Self::One => picc::SEL_CL1,
            Self::Two => picc::SEL_CL2,
            Self::Three => picc::SEL_CL3,
        }
    }

    /// The next cascade level, if any
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }
}

/// Full-frame anticollision for one cascade level (`[SEL, NVB=0x20]`)
///
/// The card answers with four UID/cascade bytes plus the BCC. The BCC must
/// verify; a mismatch means colliding cards garbled the reply and the cycle
/// is abandoned.
#[derive(Debug, Clone, Copy)]
pub struct AntiCollision {
    /// Cascade level to interrogate
    pub level: CascadeLevel,
}

impl CardCommand for AntiCollision {
    type Output = [u8; 5];

    const MAX_RESPONSE: usize = 5;
    const TIMEOUT: Duration = COMMAND_TIMEOUT;

    fn frame(&self) -> Bytes {
        Bytes::copy_from_slice(&[self.level.sel_code(), picc::NVB_ANTICOLLISION])
    }

    fn parse(&self, raw: &[u8]) -> Result<[u8; 5]> {
        require_len("ANTICOLLISION", raw, 5)?;
        let mut cln = [0u8; 5];
        cln.copy_from_slice(&raw[..5]);

        let uid_part: [u8; 4] = cln[..4].try_into().unwrap_or([0; 4]);
        if crc::bcc(&uid_part) != cln[4] {
            return Err(Error::ChecksumMismatch {
                context: "ANTICOLLISION",
            });
        }
        Ok(cln)
    }
}
