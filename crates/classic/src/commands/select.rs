//! SELECT: commit to one card by its (partial) UID

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{crc, picc};

use super::anticollision::CascadeLevel;
use super::{COMMAND_TIMEOUT, CardCommand, require_len};
use crate::error::{Error, Result};
use crate::types::Sak;

/// Select one cascade level: `[SEL, NVB=0x70, b0..b3, BCC] + CRC_A`
///
/// The card acknowledges with its SAK (plus CRC_A). A SAK with the cascade
/// bit set means the UID continues at the next level.
#[derive(Debug, Clone, Copy)]
pub struct Select {
    /// Cascade level being selected
    pub level: CascadeLevel,
    /// The five bytes returned by anticollision at this level (UID part + BCC)
    pub cln: [u8; 5],
}

impl CardCommand for Select {
    type Output = Sak;

    const MAX_RESPONSE: usize = 3;
    const TIMEOUT: Duration = COMMAND_TIMEOUT;

    fn frame(&self) -> Bytes {
        let mut frame = Vec::with_capacity(9);
        frame.push(self.level.sel_code());
        frame.push(picc::NVB_SELECT);
        frame.extend_from_slice(&self.cln);
        crc::append_crc_a(&mut frame);
        Bytes::from(frame)
    }

    fn parse(&self, raw: &[u8]) -> Result<Sak> {
        require_len("SELECT", raw, 3)?;
        if !crc::check_crc_a(&raw[..3]) {
            return Err(Error::ChecksumMismatch { context: "SELECT" });
        }
        Ok(Sak(raw[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout_and_crc() {
        let cln = [0x04, 0xA1, 0xB2, 0xC3, 0x04 ^ 0xA1 ^ 0xB2 ^ 0xC3];
        let frame = Select {
            level: CascadeLevel::One,
            cln,
        }
        .frame();

        assert_eq!(frame.len(), 9);
        assert_eq!(frame[0], 0x93);
        assert_eq!(frame[1], 0x70);
        assert_eq!(&frame[2..7], &cln);
        assert!(crc::check_crc_a(&frame));
    }

    #[test]
    fn parses_sak_with_valid_crc() {
        let cln = [0x88, 0x04, 0xA1, 0xB2, 0x88 ^ 0x04 ^ 0xA1 ^ 0xB2];
        let cmd = Select {
            level: CascadeLevel::One,
            cln,
        };

        let mut resp = vec![0x04];
        crc::append_crc_a(&mut resp);
        let sak = cmd.parse(&resp).unwrap();
        assert!(sak.uid_incomplete());

        resp[1] ^= 0x01;
        assert!(matches!(
            cmd.parse(&resp).unwrap_err(),
            Error::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn short_response_is_decode_error() {
        let cmd = Select {
            level: CascadeLevel::One,
            cln: [0; 5],
        };
        assert!(matches!(
            cmd.parse(&[0x08]).unwrap_err(),
            Error::ShortResponse { .. }
        ));
    }
}
