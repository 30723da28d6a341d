//! Card session state machine
//!
//! One session covers one card's lifecycle:
//!
//! ```text
//! Idle -> Requested -> Resolving -> Selected -> Authenticated -> (halt) -> Idle
//! ```
//!
//! Every error-absorbing transition lands back in `Idle` except a failed
//! authentication, which keeps the card selected so the caller can retry
//! another key. A session borrows the [`ReaderLink`] mutably, so at most one
//! session can drive a reader at any time; the single-session invariant is
//! enforced by construction, not by convention.

use rand::RngCore;
use rc522_iso14443::{TransportError, picc};
use tracing::{debug, warn};

use crate::commands::{
    AntiCollision, Authenticate, CardCommand, CascadeLevel, Halt, ReadBlock, Request, Select,
    WriteBlock, WriteData,
};
use crate::crypto1::{Crypto1, prng_successor};
use crate::error::{Error, Result};
use crate::layout::CardLayout;
use crate::link::ReaderLink;
use crate::types::{Atqa, KeySlot, SectorKey, Uid};
use rc522_iso14443::LinkTransport;

enum State {
    Idle,
    Requested,
    Selected {
        uid: Uid,
    },
    Authenticated {
        uid: Uid,
        sector: u8,
        slot: KeySlot,
        cipher: Crypto1,
    },
}

impl State {
    const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Requested => "Requested",
            Self::Selected { .. } => "Selected",
            Self::Authenticated { .. } => "Authenticated",
        }
    }
}

/// Drives one card through request, anti-collision, select, authentication
/// and authenticated block access
pub struct CardSession<'a, T: LinkTransport> {
    link: &'a mut ReaderLink<T>,
    layout: CardLayout,
    state: State,
}

impl<T: LinkTransport> std::fmt::Debug for CardSession<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardSession")
            .field("layout", &self.layout)
            .field("state", &self.state.name())
            .finish()
    }
}

impl<'a, T: LinkTransport> CardSession<'a, T> {
    /// Start a fresh session in `Idle`
    pub fn new(link: &'a mut ReaderLink<T>, layout: CardLayout) -> Self {
        Self {
            link,
            layout,
            state: State::Idle,
        }
    }

    /// UID of the card currently selected or authenticated, if any
    pub const fn uid(&self) -> Option<Uid> {
        match &self.state {
            State::Selected { uid } | State::Authenticated { uid, .. } => Some(*uid),
            _ => None,
        }
    }

    /// Whether a sector is currently authenticated
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, State::Authenticated { .. })
    }

    /// The (sector, key slot) pair currently authenticated, if any
    pub const fn authenticated_sector(&self) -> Option<(u8, KeySlot)> {
        match &self.state {
            State::Authenticated { sector, slot, .. } => Some((*sector, *slot)),
            _ => None,
        }
    }

    fn expect_state(&self, operation: &'static str, legal: bool) -> Result<()> {
        if legal {
            Ok(())
        } else {
            Err(Error::BadState {
                operation,
                state: self.state.name(),
            })
        }
    }

    /// Probe for a card in the field
    ///
    /// `Ok(None)` means nothing answered within the timeout, the normal
    /// outcome when no card is present. It is not an error.
    pub fn request(&mut self) -> Result<Option<Atqa>> {
        self.probe(Request::new())
    }

    /// Probe for a card, also waking halted cards (WUPA)
    ///
    /// A halted card ignores the ordinary presence request; this is how a
    /// session re-engages a card it halted itself, e.g. to authenticate a
    /// different sector with a fresh cipher.
    pub fn request_wakeup(&mut self) -> Result<Option<Atqa>> {
        self.probe(Request::wakeup())
    }

    fn probe(&mut self, command: Request) -> Result<Option<Atqa>> {
        self.expect_state("request", matches!(self.state, State::Idle))?;

        match self.link.execute(&command) {
            Ok(atqa) => {
                debug!(atqa = ?atqa.0, "card in field");
                self.state = State::Requested;
                Ok(Some(atqa))
            }
            Err(Error::Transport(TransportError::Timeout)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Run the anti-collision cascade and select the resolved card
    ///
    /// Chains cascade levels for 7/10-byte UIDs via the `0x88` cascade tag,
    /// validating the BCC at each level. Any failure aborts to `Idle`: the
    /// card is treated as having left the field for this cycle.
    pub fn resolve(&mut self) -> Result<Uid> {
        self.expect_state("resolve", matches!(self.state, State::Requested))?;

        match self.resolve_cascade() {
            Ok(uid) => {
                debug!(%uid, "card selected");
                self.state = State::Selected { uid };
                Ok(uid)
            }
            Err(e) => {
                self.state = State::Idle;
                Err(e)
            }
        }
    }

    fn resolve_cascade(&mut self) -> Result<Uid> {
        let mut uid_bytes: Vec<u8> = Vec::with_capacity(10);
        let mut level = CascadeLevel::One;

        loop {
            let cln = self.link.execute(&AntiCollision { level })?;
            let sak = match self.link.execute(&Select { level, cln }) {
                Ok(sak) => sak,
                Err(Error::Transport(TransportError::Timeout)) => {
                    return Err(Error::SelectFailed);
                }
                Err(e) => return Err(e),
            };

            if sak.uid_incomplete() {
                // A continuing level must open with the cascade tag
                if cln[0] != picc::CASCADE_TAG {
                    return Err(Error::ChecksumMismatch {
                        context: "ANTICOLLISION",
                    });
                }
                uid_bytes.extend_from_slice(&cln[1..4]);
                level = level.next().ok_or(Error::SelectFailed)?;
            } else {
                uid_bytes.extend_from_slice(&cln[..4]);
                break;
            }
        }

        match uid_bytes.len() {
            4 => Ok(Uid::Single(uid_bytes.try_into().map_err(|_| {
                Error::SelectFailed
            })?)),
            7 => Ok(Uid::Double(uid_bytes.try_into().map_err(|_| {
                Error::SelectFailed
            })?)),
            10 => Ok(Uid::Triple(uid_bytes.try_into().map_err(|_| {
                Error::SelectFailed
            })?)),
            _ => Err(Error::SelectFailed),
        }
    }

    /// Run the CRYPTO1 three-pass mutual authentication for the sector
    /// containing `block`
    ///
    /// On key rejection the card stays selected and the caller may retry with
    /// another key; only transport loss or a decode failure aborts to `Idle`.
    /// Re-authenticating a different sector requires [`Self::halt`] first;
    /// the machine never switches keys under an open cipher.
    pub fn authenticate(&mut self, slot: KeySlot, block: u8, key: &SectorKey) -> Result<()> {
        let uid = match &self.state {
            State::Selected { uid } => *uid,
            _ => {
                return Err(Error::BadState {
                    operation: "authenticate",
                    state: self.state.name(),
                });
            }
        };

        // Pass 1: plaintext auth command, card answers its challenge nt
        let nt_bytes = match self.link.execute(&Authenticate { slot, block }) {
            Ok(nt) => nt,
            Err(Error::Transport(TransportError::Timeout)) => {
                warn!(block, %slot, "no challenge from card, key rejected");
                return Err(Error::AuthFailed { block, slot });
            }
            Err(e) => {
                self.state = State::Idle;
                return Err(e);
            }
        };
        let nt = u32::from_be_bytes(nt_bytes);

        // Initialise the cipher and feed uid ^ nt forward
        let mut cipher = Crypto1::new(key);
        cipher.word(u32::from_be_bytes(uid.auth_bytes()) ^ nt, false);

        // Pass 2: {nr} {ar} with ar = suc64(nt)
        let mut nr = [0u8; 4];
        rand::rng().fill_bytes(&mut nr);

        let mut frame = [0u8; 8];
        for i in 0..4 {
            frame[i] = cipher.byte(nr[i], false) ^ nr[i];
        }
        let ar = prng_successor(nt, 64).to_be_bytes();
        for i in 0..4 {
            frame[4 + i] = cipher.byte(0, false) ^ ar[i];
        }

        let raw = match self
            .link
            .transceive(&frame, 4, <Authenticate as CardCommand>::TIMEOUT)
        {
            Ok(raw) => raw,
            Err(TransportError::Timeout) => {
                // A card that rejects the reader answer stays mute
                warn!(block, %slot, "card stayed silent on reader answer");
                return Err(Error::AuthFailed { block, slot });
            }
            Err(e) => {
                self.state = State::Idle;
                return Err(e.into());
            }
        };
        if raw.len() < 4 {
            self.state = State::Idle;
            return Err(Error::ShortResponse {
                context: "AUTH",
                expected: 4,
                actual: raw.len(),
            });
        }

        // Pass 3: decipher {at} and check it against suc96(nt)
        let mut at = [0u8; 4];
        for i in 0..4 {
            at[i] = cipher.byte(0, false) ^ raw[i];
        }
        if at != prng_successor(nt, 96).to_be_bytes() {
            warn!(block, %slot, "card answer failed validation");
            return Err(Error::AuthFailed { block, slot });
        }

        let sector = self.layout.sector_of(block);
        debug!(sector, %slot, "sector authenticated");
        self.state = State::Authenticated {
            uid,
            sector,
            slot,
            cipher,
        };
        Ok(())
    }

    /// Read the 16 bytes of `address` within the authenticated sector
    pub fn read_block(&mut self, address: u8) -> Result<[u8; 16]> {
        self.expect_state(
            "read_block",
            matches!(self.state, State::Authenticated { .. }),
        )?;
        self.check_sector(address)?;

        let State::Authenticated { cipher, .. } = &mut self.state else {
            unreachable!("state checked above");
        };
        match self.link.execute_ciphered(&ReadBlock { address }, cipher) {
            Ok(data) => Ok(data),
            Err(e) => {
                self.state = State::Idle;
                Err(e)
            }
        }
    }

    /// Write 16 bytes to `address` within the authenticated sector
    pub fn write_block(&mut self, address: u8, data: &[u8; 16]) -> Result<()> {
        self.expect_state(
            "write_block",
            matches!(self.state, State::Authenticated { .. }),
        )?;
        self.check_sector(address)?;

        let State::Authenticated { cipher, .. } = &mut self.state else {
            unreachable!("state checked above");
        };
        let announced = self.link.execute_ciphered(&WriteBlock { address }, cipher);
        let outcome = match announced {
            Ok(()) => self
                .link
                .execute_ciphered(&WriteData { data: *data }, cipher),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = State::Idle;
                Err(e)
            }
        }
    }

    /// Block access is only legal inside the authenticated sector; switching
    /// sectors requires an explicit halt and a fresh authentication.
    fn check_sector(&self, address: u8) -> Result<()> {
        if let State::Authenticated { sector, .. } = &self.state
            && self.layout.sector_of(address) != *sector
        {
            return Err(Error::SectorMismatch {
                address,
                sector: *sector,
            });
        }
        Ok(())
    }

    /// Halt the card and clear all cipher state
    ///
    /// Idempotent: from `Idle` this is a no-op, and the session always ends
    /// in `Idle` with no keystream retained. Only a closed channel is
    /// reported; a mute card is the expected answer to HLTA.
    pub fn halt(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let outcome = match state {
            State::Idle | State::Requested => Ok(()),
            State::Selected { .. } => self.link.execute(&Halt),
            State::Authenticated { mut cipher, .. } => {
                self.link.execute_ciphered(&Halt, &mut cipher)
            }
        };
        match outcome {
            Err(e) if e.is_fatal() => Err(e),
            _ => Ok(()),
        }
    }
}
