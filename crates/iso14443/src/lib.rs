//! Transport abstraction and ISO/IEC 14443-3A framing primitives
//!
//! This crate provides the foundational pieces for talking to an RC522-family
//! contactless reader module over an already-open byte-stream channel:
//!
//! - The [`LinkTransport`] trait, a duplex byte channel with timeout semantics
//! - The ISO14443-3A CRC (CRC_A) and the UID block-check character (BCC)
//! - PICC command bytes and framing constants shared by higher layers
//!
//! Channel setup (symbol rate, 8N1 framing, device enumeration) is the
//! collaborator's responsibility; this crate only consumes the open channel.
#![forbid(unsafe_code)]
#![warn(rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod crc;
pub mod picc;
pub mod transport;

pub use crc::{append_crc_a, bcc, check_crc_a, crc_a};
pub use transport::{LinkTransport, TransportError};
