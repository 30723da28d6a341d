//! Milestone events emitted to the reporting sink
//!
//! The poll worker never touches consumer state directly; it only sends
//! these typed values over a channel. Display formatting belongs to the
//! consumer (typically a UI layer).

use crate::types::Uid;

/// One milestone of a poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A card answered the presence request and its UID was resolved
    CardDetected {
        /// The resolved UID
        uid: Uid,
    },
    /// The resolved card did not acknowledge selection
    SelectFailed,
    /// The key was rejected during the CRYPTO1 handshake
    AuthFailed,
    /// A block was written and acknowledged
    BlockWritten {
        /// Absolute block address
        address: u8,
    },
    /// A block write was not acknowledged
    BlockWriteFailed {
        /// Absolute block address
        address: u8,
    },
    /// A block was read back
    BlockRead {
        /// Absolute block address
        address: u8,
        /// The 16 block bytes
        data: [u8; 16],
    },
    /// The transport channel is gone; the poll loop has ended
    TransportFatal {
        /// Human-readable reason
        reason: String,
    },
}
