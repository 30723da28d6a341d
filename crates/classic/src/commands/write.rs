//! WRITE: two-step 16-byte block write

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{crc, picc};

use super::{CardCommand, DATA_TIMEOUT, parse_ack};
use crate::error::Result;

/// Step one: announce the write target (`[0xA0, block] + CRC_A`), ACK expected
#[derive(Debug, Clone, Copy)]
pub struct WriteBlock {
    /// Absolute block address
    pub address: u8,
}

impl CardCommand for WriteBlock {
    type Output = ();

    const MAX_RESPONSE: usize = 1;
    const TIMEOUT: Duration = DATA_TIMEOUT;

    fn frame(&self) -> Bytes {
        let mut frame = vec![picc::WRITE, self.address];
        crc::append_crc_a(&mut frame);
        Bytes::from(frame)
    }

    fn parse(&self, raw: &[u8]) -> Result<()> {
        parse_ack("WRITE", raw)
    }
}

/// Step two: the 16 data bytes plus CRC_A, ACK expected
#[derive(Debug, Clone, Copy)]
pub struct WriteData {
    /// Block contents to store
    pub data: [u8; 16],
}

impl CardCommand for WriteData {
    type Output = ();

    const MAX_RESPONSE: usize = 1;
    const TIMEOUT: Duration = DATA_TIMEOUT;

    fn frame(&self) -> Bytes {
        let mut frame = self.data.to_vec();
        crc::append_crc_a(&mut frame);
        Bytes::from(frame)
    }

    fn parse(&self, raw: &[u8]) -> Result<()> {
        parse_ack("WRITE DATA", raw)
    }
}
