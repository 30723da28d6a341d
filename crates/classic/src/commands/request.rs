//! REQA: probe for a card in the field

use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::picc;

use super::{CardCommand, SHORT_TIMEOUT, require_len};
use crate::error::Result;
use crate::types::Atqa;

/// Presence request (REQA short frame)
///
/// Silence is the normal outcome when no card is in range; the caller maps
/// the read timeout to "absent", never to an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Request {
    /// Use WUPA instead of REQA, also waking halted cards
    pub wakeup: bool,
}

impl Request {
    /// Probe for idle cards only
    pub const fn new() -> Self {
        Self { wakeup: false }
    }

    /// Probe for idle and halted cards
    pub const fn wakeup() -> Self {
        Self { wakeup: true }
    }
}

impl CardCommand for Request {
    type Output = Atqa;

    const MAX_RESPONSE: usize = 2;
    const TIMEOUT: Duration = SHORT_TIMEOUT;

    fn frame(&self) -> Bytes {
        if self.wakeup {
            Bytes::from_static(&[picc::WUPA])
        } else {
            Bytes::from_static(&[picc::REQA])
        }
    }

    fn parse(&self, raw: &[u8]) -> Result<Atqa> {
        require_len("REQA", raw, 2)?;
        Ok(Atqa([raw[0], raw[1]]))
    }
}
