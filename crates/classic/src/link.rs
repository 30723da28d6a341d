//! Command transmission over the transport link
//!
//! [`ReaderLink`] owns the transport and executes one command at a time:
//! exactly one write followed by exactly one read per invocation, bounded by
//! the command's timeout. No retries happen here. Ciphered execution applies
//! the CRYPTO1 keystream transparently to the outgoing frame and the reply.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use rc522_iso14443::{LinkTransport, TransportError};
use tracing::trace;

use crate::commands::CardCommand;
use crate::crypto1::Crypto1;
use crate::error::Result;

/// Executes card commands over a [`LinkTransport`]
pub struct ReaderLink<T: LinkTransport> {
    transport: T,
}

impl<T: LinkTransport> fmt::Debug for ReaderLink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderLink").finish_non_exhaustive()
    }
}

impl<T: LinkTransport> ReaderLink<T> {
    /// Wrap an already-open transport
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Consume the link and hand the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// One write, one read
    pub(crate) fn transceive(
        &mut self,
        frame: &[u8],
        max_response: usize,
        timeout: Duration,
    ) -> std::result::Result<Bytes, TransportError> {
        trace!(frame = %hex::encode_upper(frame), "tx");
        self.transport.write(frame, timeout)?;
        let response = self.transport.read(max_response, timeout)?;
        trace!(response = %hex::encode_upper(&response), "rx");
        Ok(response)
    }

    /// Execute a plaintext command
    pub fn execute<C: CardCommand>(&mut self, command: &C) -> Result<C::Output> {
        let frame = command.frame();
        match self.transceive(&frame, C::MAX_RESPONSE, C::TIMEOUT) {
            Ok(raw) => command.parse(&raw),
            Err(TransportError::Timeout) if C::EXPECT_SILENCE => command.parse(&[]),
            Err(e) => Err(e.into()),
        }
    }

    /// Execute a command under an established CRYPTO1 session
    ///
    /// Every frame byte is XORed with one keystream byte on the way out and
    /// the reply deciphered the same way before parsing; both sides consume
    /// keystream in lockstep, checksums included.
    pub fn execute_ciphered<C: CardCommand>(
        &mut self,
        command: &C,
        cipher: &mut Crypto1,
    ) -> Result<C::Output> {
        let frame = command.frame();
        let ciphered: Vec<u8> = frame.iter().map(|&b| cipher.byte(0, false) ^ b).collect();

        match self.transceive(&ciphered, C::MAX_RESPONSE, C::TIMEOUT) {
            Ok(raw) => {
                let plain: Vec<u8> = raw.iter().map(|&b| cipher.byte(0, false) ^ b).collect();
                command.parse(&plain)
            }
            Err(TransportError::Timeout) if C::EXPECT_SILENCE => command.parse(&[]),
            Err(e) => Err(e.into()),
        }
    }
}
