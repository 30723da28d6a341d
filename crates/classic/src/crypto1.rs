//! CRYPTO1 stream cipher
//!
//! The proprietary MIFARE Classic cipher: a 48-bit LFSR kept as two
//! interleaved 24-bit halves, a two-layer nonlinear output filter, and the
//! card's 16-bit nonce generator. It is reproduced here faithfully: it is a
//! known-weak cipher and this module makes no attempt to strengthen it.
//!
//! During the three-pass handshake the register is advanced by feeding
//! handshake material (UID ⊕ nt, then the reader nonce) into the feedback
//! path; the `encrypted` flag covers nested authentication, where the fed
//! bits arrive already ciphered and the keystream bit has to be cancelled
//! back out. After authentication the cipher runs as a pure keystream
//! generator and frames are transformed byte-wise by XOR.

use crate::types::SectorKey;

const LF_POLY_ODD: u32 = 0x29CE5C;
const LF_POLY_EVEN: u32 = 0x870804;

#[inline]
const fn key_bit(key: u64, n: u32) -> u32 {
    ((key >> n) & 1) as u32
}

#[inline]
const fn parity32(x: u32) -> u32 {
    x.count_ones() & 1
}

/// The nonlinear output filter f(state), applied to the odd-indexed half
#[inline]
fn filter(x: u32) -> u8 {
    let mut f = 0u32;
    f |= (0xf22c0u32 >> (x & 0xf)) & 16;
    f |= (0x6c9c0u32 >> ((x >> 4) & 0xf)) & 8;
    f |= (0x3c8b0u32 >> ((x >> 8) & 0xf)) & 4;
    f |= (0x1e458u32 >> ((x >> 12) & 0xf)) & 2;
    f |= (0x0d938u32 >> ((x >> 16) & 0xf)) & 1;
    ((0xEC57E80Au32 >> f) & 1) as u8
}

/// CRYPTO1 cipher state
///
/// Owned exclusively by the active card session; a fresh instance is created
/// for every authentication attempt and discarded when the handshake fails
/// or the session is halted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crypto1 {
    odd: u32,
    even: u32,
}

impl Crypto1 {
    /// Initialise the register from a 6-byte sector key
    pub fn new(key: &SectorKey) -> Self {
        let key = key.as_u64();
        let mut odd = 0u32;
        let mut even = 0u32;
        let mut i = 47i32;
        while i > 0 {
            odd = odd << 1 | key_bit(key, ((i - 1) ^ 7) as u32);
            even = even << 1 | key_bit(key, (i ^ 7) as u32);
            i -= 2;
        }
        Self { odd, even }
    }

    /// Produce one keystream bit, feeding `input` into the feedback path
    ///
    /// With `encrypted` set the input bit is taken as ciphertext and the
    /// keystream bit is folded back in, so that both ends of a nested
    /// handshake advance through identical states.
    pub fn bit(&mut self, input: u8, encrypted: bool) -> u8 {
        let ret = filter(self.odd);

        let mut feed_in = (ret as u32) & (encrypted as u32);
        feed_in ^= (input & 1) as u32;
        feed_in ^= LF_POLY_ODD & self.odd;
        feed_in ^= LF_POLY_EVEN & self.even;

        self.even = (self.even << 1 | parity32(feed_in)) & 0xFFFFFF;
        std::mem::swap(&mut self.odd, &mut self.even);

        ret
    }

    /// Produce one keystream byte, feeding `input` bit by bit (LSB first)
    pub fn byte(&mut self, input: u8, encrypted: bool) -> u8 {
        let mut ret = 0u8;
        for i in 0..8 {
            ret |= self.bit((input >> i) & 1, encrypted) << i;
        }
        ret
    }

    /// Produce one keystream word, feeding `input` byte-wise MSB first
    pub fn word(&mut self, input: u32, encrypted: bool) -> u32 {
        let mut ret = 0u32;
        for (i, byte) in input.to_be_bytes().into_iter().enumerate() {
            ret |= (self.byte(byte, encrypted) as u32) << (24 - 8 * i);
        }
        ret
    }

    /// The next keystream bit without advancing the register
    ///
    /// Used for parity adjustment: the ciphered parity of a plaintext byte is
    /// `odd_parity(byte) ^ peek_bit()`.
    pub fn peek_bit(&self) -> u8 {
        filter(self.odd)
    }
}

/// Odd parity bit of a byte, as transmitted on the RF interface
pub const fn odd_parity(byte: u8) -> u8 {
    (byte.count_ones() as u8 + 1) & 1
}

/// Successor function of the card's 16-bit nonce LFSR
///
/// `prng_successor(nt, 64)` and `prng_successor(nt, 96)` are the expected
/// reader and card answers of the mutual authentication.
pub const fn prng_successor(x: u32, n: u32) -> u32 {
    let mut x = x.swap_bytes();
    let mut i = 0;
    while i < n {
        x = (x >> 1) | (((x >> 16) ^ (x >> 18) ^ (x >> 19) ^ (x >> 21)) << 31);
        i += 1;
    }
    x.swap_bytes()
}
