//! Byte-stream transport abstraction
//!
//! The reader module is reached over a pre-established duplex byte channel
//! (typically USB-serial at a fixed symbol rate, 8 data bits, no parity,
//! 1 stop bit). The core never blocks indefinitely: every operation carries
//! an explicit timeout.

use std::time::Duration;

use bytes::Bytes;

/// Errors reported by a [`LinkTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The operation did not complete within the given timeout
    #[error("transport operation timed out")]
    Timeout,

    /// The underlying channel is gone (device unplugged, port closed)
    #[error("transport channel closed")]
    Closed,
}

impl TransportError {
    /// Whether this error ends the channel for good.
    ///
    /// A timeout is an ordinary outcome (cards are usually absent); only a
    /// closed channel is unrecoverable.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Duplex byte channel with timeout semantics
///
/// Implementations wrap an already-open serial port or an in-memory test
/// double. Exactly one `write` followed by one `read` makes up a command
/// round trip at the layer above; the transport itself carries no framing.
pub trait LinkTransport {
    /// Write all bytes to the channel within `timeout`
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransportError>;

    /// Read up to `max_len` bytes from the channel within `timeout`
    ///
    /// Returns the bytes that arrived, which may be fewer than `max_len`.
    /// An empty channel after `timeout` is [`TransportError::Timeout`].
    fn read(&mut self, max_len: usize, timeout: Duration) -> Result<Bytes, TransportError>;
}

impl<T: LinkTransport + ?Sized> LinkTransport for &mut T {
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransportError> {
        (**self).write(bytes, timeout)
    }

    fn read(&mut self, max_len: usize, timeout: Duration) -> Result<Bytes, TransportError> {
        (**self).read(max_len, timeout)
    }
}
