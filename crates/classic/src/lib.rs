//! MIFARE Classic protocol and authentication engine for RC522 reader modules
//!
//! This crate drives a single MIFARE Classic card through its full lifecycle
//! over a byte-stream link to an RC522-family reader: presence detection,
//! anti-collision UID resolution, selection, CRYPTO1 sector authentication,
//! authenticated block read/write, and halt.
//!
//! ## Overview
//!
//! - [`commands`] builds and parses the exact command frames the card expects
//! - [`Crypto1`] implements the CRYPTO1 stream cipher used for the three-pass
//!   mutual authentication and for ciphering all traffic afterwards
//! - [`CardSession`] sequences one card's lifecycle and enforces legal
//!   transition ordering (authenticate before access, stop crypto before
//!   re-authenticating another sector)
//! - [`Poller`] runs the background loop that polls for cards, drives one
//!   session per detected card, and reports milestones to a channel sink
//!
//! The transport itself (serial port setup, USB enumeration) is out of scope;
//! callers hand over an already-open [`rc522_iso14443::LinkTransport`].
#![forbid(unsafe_code)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod commands;
mod crypto1;
mod error;
mod events;
mod layout;
mod link;
mod poller;
mod session;
mod types;

pub use crypto1::{Crypto1, odd_parity, prng_successor};
pub use error::{Error, Result};
pub use events::ReaderEvent;
pub use layout::CardLayout;
pub use link::ReaderLink;
pub use poller::{PollConfig, Poller, PollerHandle};
pub use session::CardSession;
pub use types::{Atqa, KeySlot, Sak, SectorKey, Uid};
