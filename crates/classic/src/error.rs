use rc522_iso14443::TransportError;

use crate::types::KeySlot;

/// Result type for MIFARE Classic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for MIFARE Classic operations
///
/// The taxonomy matters to the poll orchestrator: a malformed response is a
/// protocol decode error and must stay distinguishable from "no card in the
/// field" (a read timeout on REQA), and only a closed transport channel is
/// fatal to the poll loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (timeout mid-sequence or closed channel)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response shorter than the minimum the operation requires
    #[error("short response for {context}: expected {expected} bytes, got {actual}")]
    ShortResponse {
        /// Operation that received the response
        context: &'static str,
        /// Minimum length the operation requires
        expected: usize,
        /// Length actually received
        actual: usize,
    },

    /// CRC_A or BCC validation failed on a response
    #[error("checksum mismatch in {context} response")]
    ChecksumMismatch {
        /// Operation that received the response
        context: &'static str,
    },

    /// The card answered a 4-bit NAK where an ACK was required
    #[error("card answered NAK (0x{code:02X})")]
    Nak {
        /// The decoded NAK value
        code: u8,
    },

    /// The card did not acknowledge selection
    #[error("card did not acknowledge selection")]
    SelectFailed,

    /// The CRYPTO1 handshake did not complete; the key was rejected
    #[error("authentication failed for block {block} with key slot {slot}")]
    AuthFailed {
        /// Block address the authentication targeted
        block: u8,
        /// Key slot that was offered
        slot: KeySlot,
    },

    /// (sector, block) pair outside the card layout
    #[error("no block {block} in sector {sector} for {layout}")]
    InvalidBlock {
        /// Requested sector index
        sector: u8,
        /// Requested block-within-sector index
        block: u8,
        /// Layout the request was checked against
        layout: crate::CardLayout,
    },

    /// Block access outside the currently authenticated sector
    #[error("block {address} is outside authenticated sector {sector}; re-authenticate first")]
    SectorMismatch {
        /// Absolute block address requested
        address: u8,
        /// Sector the session is authenticated for
        sector: u8,
    },

    /// Operation issued from a session state that does not permit it
    #[error("operation `{operation}` is not legal in session state {state}")]
    BadState {
        /// The rejected operation
        operation: &'static str,
        /// The state the session was in
        state: &'static str,
    },
}

impl Error {
    /// Whether this error must end the poll loop
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_fatal())
    }

    /// Whether this error is a protocol decode failure (malformed, short or
    /// checksum-failing response), as opposed to card absence or key rejection
    pub const fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::ShortResponse { .. } | Self::ChecksumMismatch { .. }
        )
    }
}
