//! HLTA: put the card to sleep until it leaves and re-enters the field

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{crc, picc};

use super::{CardCommand, SHORT_TIMEOUT};
use crate::error::Result;

/// Halt frame `[0x50, 0x00] + CRC_A`
///
/// A halted card answers nothing; silence within the timeout is the success
/// path. Any bytes that do arrive are a NAK and simply ignored; halting is
/// best-effort and idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Halt;

impl CardCommand for Halt {
    type Output = ();

    const MAX_RESPONSE: usize = 1;
    const TIMEOUT: Duration = SHORT_TIMEOUT;
    const EXPECT_SILENCE: bool = true;

    fn frame(&self) -> Bytes {
        let mut frame = vec![picc::HLTA, 0x00];
        crc::append_crc_a(&mut frame);
        Bytes::from(frame)
    }

    fn parse(&self, _raw: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_bytes() {
        let frame = Halt.frame();
        assert_eq!(&frame[..2], &[0x50, 0x00]);
        assert_eq!(frame.len(), 4);
        assert!(crc::check_crc_a(&frame));
    }

    #[test]
    fn any_reply_parses_ok() {
        assert!(Halt.parse(&[]).is_ok());
        assert!(Halt.parse(&[0x04]).is_ok());
    }
}
