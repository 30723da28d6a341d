//! ISO/IEC 14443-3A checksums
//!
//! CRC_A protects select, authenticate, read, write and halt frames. It is
//! the 16-bit CRC with the reflected polynomial `0x8408`, preset `0x6363`,
//! appended least-significant byte first (ISO 14443-3 clause 6.2.4; the RC522
//! presets its CRC coprocessor to the same value). The BCC is the XOR block
//! check over the four UID bytes of one cascade level.

/// Compute CRC_A over `data`, returned `[lsb, msb]` in transmit order
pub fn crc_a(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0x6363;
    for &byte in data {
        let mut ch = byte ^ (crc as u8);
        ch ^= ch << 4;
        crc = (crc >> 8) ^ ((ch as u16) << 8) ^ ((ch as u16) << 3) ^ ((ch as u16) >> 4);
    }
    [crc as u8, (crc >> 8) as u8]
}

/// Append CRC_A to a frame in place
pub fn append_crc_a(frame: &mut Vec<u8>) {
    let crc = crc_a(frame);
    frame.extend_from_slice(&crc);
}

/// Verify that the last two bytes of `frame` are the CRC_A of the rest
///
/// Frames shorter than three bytes cannot carry a checksum and fail the check.
pub fn check_crc_a(frame: &[u8]) -> bool {
    if frame.len() < 3 {
        return false;
    }
    let (payload, tail) = frame.split_at(frame.len() - 2);
    crc_a(payload) == [tail[0], tail[1]]
}

/// Block check character: XOR over one cascade level's four UID bytes
pub fn bcc(uid_cln: &[u8; 4]) -> u8 {
    uid_cln.iter().fold(0, |acc, b| acc ^ b)
}
