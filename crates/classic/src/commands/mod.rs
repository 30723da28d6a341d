//! Command frame builders and response parsers
//!
//! One module per logical reader operation. Each command knows how to build
//! the exact byte sequence the card expects, the response budget (maximum
//! length and timeout), and how to parse the raw reply into a typed result
//! or a decode failure. Transmission itself lives in [`crate::ReaderLink`];
//! retries live in the poll orchestrator, never here.

pub mod anticollision;
pub mod authenticate;
pub mod halt;
pub mod read;
pub mod request;
pub mod select;
pub mod write;

pub use anticollision::{AntiCollision, CascadeLevel};
pub use authenticate::Authenticate;
pub use halt::Halt;
pub use read::ReadBlock;
pub use request::Request;
pub use select::Select;
pub use write::{WriteBlock, WriteData};

use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};

/// Round-trip budget for presence and short control frames
pub(crate) const SHORT_TIMEOUT: Duration = Duration::from_millis(150);
/// Round-trip budget for anticollision/select/authenticate exchanges
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_millis(250);
/// Round-trip budget for block data transfers
pub(crate) const DATA_TIMEOUT: Duration = Duration::from_secs(3);

/// A single card command: frame out, typed result in
pub trait CardCommand {
    /// Parsed response type
    type Output;

    /// Maximum number of response bytes this command can produce
    const MAX_RESPONSE: usize;

    /// Round-trip timeout for this command
    const TIMEOUT: Duration;

    /// Whether the card is expected to stay silent on success (halt);
    /// a read timeout is then the success path
    const EXPECT_SILENCE: bool = false;

    /// Build the exact frame the card expects
    fn frame(&self) -> Bytes;

    /// Parse the raw response bytes into the typed result
    fn parse(&self, raw: &[u8]) -> Result<Self::Output>;
}

/// Reject responses shorter than `expected` with a decode error
pub(crate) fn require_len(context: &'static str, raw: &[u8], expected: usize) -> Result<()> {
    if raw.len() < expected {
        return Err(Error::ShortResponse {
            context,
            expected,
            actual: raw.len(),
        });
    }
    Ok(())
}

/// Decode a 4-bit MIFARE acknowledge carried in one byte
pub(crate) fn parse_ack(context: &'static str, raw: &[u8]) -> Result<()> {
    require_len(context, raw, 1)?;
    let code = raw[0] & 0x0F;
    if code == rc522_iso14443::picc::ACK {
        Ok(())
    } else {
        Err(Error::Nak { code })
    }
}
