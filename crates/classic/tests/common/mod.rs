//! In-memory card stub used by the integration tests
//!
//! `SimulatedCard` implements [`LinkTransport`] and behaves like a single
//! MIFARE Classic card on the other end of the wire: it answers presence
//! requests, walks the anti-collision cascade for its UID, runs the card side
//! of the three-pass CRYPTO1 handshake with its own cipher instance, and
//! serves ciphered block reads and writes from a block map. Keeping a real
//! cipher on the card side means the reader and card keystreams are validated
//! against each other instead of against canned byte strings.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use bytes::Bytes;
use rc522_classic::{Crypto1, SectorKey, prng_successor};
use rc522_iso14443::{LinkTransport, TransportError, crc, picc};

const NT: u32 = 0x1A2B_3C4D;

pub(crate) struct SimulatedCard {
    uid: Vec<u8>,
    key_a: SectorKey,
    key_b: SectorKey,
    memory: HashMap<u8, [u8; 16]>,
    outbox: VecDeque<Bytes>,
    /// Card-side cipher, active once authentication completed
    cipher: Option<Crypto1>,
    /// Card cipher and nt between pass 1 and pass 2
    pending_auth: Option<(Crypto1, u32)>,
    /// Write target between the announce frame and the data frame
    write_pending: Option<u8>,
    halted: bool,
    present: bool,
    mute_select: bool,
    corrupt_at: bool,
}

impl SimulatedCard {
    pub(crate) fn new(uid: &[u8]) -> Self {
        assert!(matches!(uid.len(), 4 | 7 | 10), "unsupported UID length");
        Self {
            uid: uid.to_vec(),
            key_a: SectorKey::TRANSPORT,
            key_b: SectorKey::TRANSPORT,
            memory: HashMap::new(),
            outbox: VecDeque::new(),
            cipher: None,
            pending_auth: None,
            write_pending: None,
            halted: false,
            present: true,
            mute_select: false,
            corrupt_at: false,
        }
    }

    /// No card in the field at all
    pub(crate) fn absent(uid: &[u8]) -> Self {
        let mut card = Self::new(uid);
        card.present = false;
        card
    }

    pub(crate) fn with_key_a(mut self, key: SectorKey) -> Self {
        self.key_a = key;
        self
    }

    pub(crate) fn with_key_b(mut self, key: SectorKey) -> Self {
        self.key_b = key;
        self
    }

    pub(crate) fn with_block(mut self, address: u8, data: [u8; 16]) -> Self {
        self.memory.insert(address, data);
        self
    }

    /// Answer anti-collision but never acknowledge selection
    pub(crate) fn mute_select(mut self) -> Self {
        self.mute_select = true;
        self
    }

    /// Flip a bit in the card answer {at} of the handshake
    pub(crate) fn corrupt_auth_answer(mut self) -> Self {
        self.corrupt_at = true;
        self
    }

    pub(crate) fn block(&self, address: u8) -> Option<[u8; 16]> {
        self.memory.get(&address).copied()
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted
    }

    /// The frame each anti-collision cascade level answers with
    fn cascade(&self) -> Vec<[u8; 5]> {
        let chunks: Vec<Vec<u8>> = match self.uid.len() {
            4 => vec![self.uid.clone()],
            7 => vec![
                [&[picc::CASCADE_TAG], &self.uid[..3]].concat(),
                self.uid[3..].to_vec(),
            ],
            _ => vec![
                [&[picc::CASCADE_TAG], &self.uid[..3]].concat(),
                [&[picc::CASCADE_TAG], &self.uid[3..6]].concat(),
                self.uid[6..].to_vec(),
            ],
        };
        chunks
            .into_iter()
            .map(|part| {
                let bytes: [u8; 4] = part.try_into().unwrap();
                let mut cln = [0u8; 5];
                cln[..4].copy_from_slice(&bytes);
                cln[4] = crc::bcc(&bytes);
                cln
            })
            .collect()
    }

    fn uid_auth_word(&self) -> u32 {
        let tail: [u8; 4] = self.uid[self.uid.len() - 4..].try_into().unwrap();
        u32::from_be_bytes(tail)
    }

    /// Queue a reply, ciphering it if a session cipher is active
    fn reply(&mut self, plain: Vec<u8>) {
        let out: Vec<u8> = match &mut self.cipher {
            Some(cipher) => plain.iter().map(|&b| cipher.byte(0, false) ^ b).collect(),
            None => plain,
        };
        self.outbox.push_back(Bytes::from(out));
    }

    fn process(&mut self, raw: &[u8]) {
        // Pass 2 of the handshake arrives before the session cipher activates
        if raw.len() == 8 && self.pending_auth.is_some() {
            self.finish_auth(raw);
            return;
        }

        let frame: Vec<u8> = match &mut self.cipher {
            Some(cipher) => raw.iter().map(|&b| cipher.byte(0, false) ^ b).collect(),
            None => raw.to_vec(),
        };

        if self.cipher.is_some() {
            self.process_ciphered(&frame);
            return;
        }

        match frame.as_slice() {
            [code] if *code == picc::REQA => {
                if self.present && !self.halted {
                    self.reply(vec![0x04, 0x00]);
                }
            }
            [code] if *code == picc::WUPA => {
                if self.present {
                    self.halted = false;
                    self.reply(vec![0x04, 0x00]);
                }
            }
            [sel, nvb] if *nvb == picc::NVB_ANTICOLLISION => {
                if self.present
                    && !self.halted
                    && let Some(level) = sel_index(*sel)
                {
                    let cln = self.cascade().get(level).map(|c| c.to_vec());
                    if let Some(cln) = cln {
                        self.reply(cln);
                    }
                }
            }
            _ if frame.len() == 9 && frame[1] == picc::NVB_SELECT => {
                self.select(&frame);
            }
            _ if frame.len() == 4
                && (frame[0] == picc::AUTH_KEY_A || frame[0] == picc::AUTH_KEY_B)
                && crc::check_crc_a(&frame) =>
            {
                self.start_auth(frame[0]);
            }
            _ if frame.len() == 4 && frame[0] == picc::HLTA && crc::check_crc_a(&frame) => {
                self.halted = true;
            }
            _ => {}
        }
    }

    fn select(&mut self, frame: &[u8]) {
        if !crc::check_crc_a(frame) || self.mute_select {
            return;
        }
        let Some(level) = sel_index(frame[0]) else {
            return;
        };
        let cascade = self.cascade();
        // Only the exact UID bytes of this card earn an acknowledge
        if cascade.get(level).map(|c| &c[..]) != Some(&frame[2..7]) {
            return;
        }
        let sak = if level + 1 < cascade.len() {
            picc::SAK_UID_INCOMPLETE
        } else {
            0x08
        };
        let mut out = vec![sak];
        crc::append_crc_a(&mut out);
        self.reply(out);
    }

    fn start_auth(&mut self, code: u8) {
        let key = if code == picc::AUTH_KEY_A {
            &self.key_a
        } else {
            &self.key_b
        };
        let mut cipher = Crypto1::new(key);
        cipher.word(self.uid_auth_word() ^ NT, false);
        self.pending_auth = Some((cipher, NT));
        self.outbox.push_back(Bytes::copy_from_slice(&NT.to_be_bytes()));
    }

    /// Card side of pass 2/3: decipher {nr} {ar}, validate ar against
    /// suc64(nt), answer {at} = suc96(nt) under the now-shared keystream.
    fn finish_auth(&mut self, raw: &[u8]) {
        let (mut cipher, nt) = self.pending_auth.take().unwrap();

        for &enc in &raw[..4] {
            let _nr = cipher.byte(enc, true) ^ enc;
        }
        let mut ar = [0u8; 4];
        for (i, &enc) in raw[4..8].iter().enumerate() {
            ar[i] = cipher.byte(0, false) ^ enc;
        }
        if ar != prng_successor(nt, 64).to_be_bytes() {
            // Wrong key: the reader answer does not verify, stay silent
            return;
        }

        let at = prng_successor(nt, 96).to_be_bytes();
        let mut out = [0u8; 4];
        for i in 0..4 {
            out[i] = cipher.byte(0, false) ^ at[i];
        }
        if self.corrupt_at {
            out[0] ^= 0x20;
        }
        self.cipher = Some(cipher);
        self.outbox.push_back(Bytes::copy_from_slice(&out));
    }

    fn process_ciphered(&mut self, frame: &[u8]) {
        if let Some(address) = self.write_pending.take() {
            if frame.len() == 18 && crc::check_crc_a(frame) {
                let mut data = [0u8; 16];
                data.copy_from_slice(&frame[..16]);
                self.memory.insert(address, data);
                self.reply(vec![picc::ACK]);
            } else {
                self.reply(vec![0x04]);
            }
            return;
        }

        if frame.len() != 4 || !crc::check_crc_a(frame) {
            self.reply(vec![0x04]);
            return;
        }
        match frame[0] {
            code if code == picc::READ => {
                let data = self.memory.get(&frame[1]).copied().unwrap_or([0u8; 16]);
                let mut out = data.to_vec();
                crc::append_crc_a(&mut out);
                self.reply(out);
            }
            code if code == picc::WRITE => {
                self.write_pending = Some(frame[1]);
                self.reply(vec![picc::ACK]);
            }
            code if code == picc::HLTA => {
                self.halted = true;
                self.cipher = None;
            }
            _ => self.reply(vec![0x04]),
        }
    }
}

fn sel_index(sel: u8) -> Option<usize> {
    match sel {
        picc::SEL_CL1 => Some(0),
        picc::SEL_CL2 => Some(1),
        picc::SEL_CL3 => Some(2),
        _ => None,
    }
}

impl LinkTransport for SimulatedCard {
    fn write(&mut self, bytes: &[u8], _timeout: Duration) -> Result<(), TransportError> {
        self.process(bytes);
        Ok(())
    }

    fn read(&mut self, max_len: usize, _timeout: Duration) -> Result<Bytes, TransportError> {
        match self.outbox.pop_front() {
            Some(reply) if reply.len() > max_len => Ok(reply.slice(..max_len)),
            Some(reply) => Ok(reply),
            None => Err(TransportError::Timeout),
        }
    }
}

/// A transport whose channel is gone, for loss-of-reader scenarios
pub(crate) struct ClosedTransport;

impl LinkTransport for ClosedTransport {
    fn write(&mut self, _bytes: &[u8], _timeout: Duration) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }

    fn read(&mut self, _max_len: usize, _timeout: Duration) -> Result<Bytes, TransportError> {
        Err(TransportError::Closed)
    }
}
