//! # CRC-16/X.25 Implementation
//!
//! Frame-check sequence for AX.25 frames.
//!
//! **Polynomial**: 0x1021 (reflected: 0x8408)
//! **Initial Value**: 0xFFFF
//! **Reflected In/Out**: yes
//! **Final XOR**: 0xFFFF
//!
//! The FCS is appended to the frame least significant byte first.

/// CRC-16/X.25 polynomial, bit-reversed for the LSB-first algorithm
const CRC16_POLY_REFLECTED: u16 = 0x8408;

/// Initial register value
const CRC16_INIT: u16 = 0xFFFF;

/// Final XOR value
const CRC16_XOROUT: u16 = 0xFFFF;

/// Size of the FCS on the wire
pub const FCS_LEN: usize = 2;

/// Precomputed CRC16 lookup table for fast calculation
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate CRC-16/X.25 using lookup table
///
/// # Arguments
///
/// * `data` - Frame bytes without the trailing FCS
///
/// # Returns
///
/// * `u16` - Calculated checksum
///
/// # Examples
///
/// ```
/// use ax25_relay::ax25::crc::crc16_x25;
///
/// assert_eq!(crc16_x25(b"123456789"), 0x906E);
/// ```
pub fn crc16_x25(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;

    for &byte in data {
        crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize];
    }

    crc ^ CRC16_XOROUT
}

/// Compute the FCS octets to append to a frame (little-endian)
pub fn fcs(data: &[u8]) -> [u8; FCS_LEN] {
    crc16_x25(data).to_le_bytes()
}

/// Outcome of the decode-time FCS check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FcsStatus {
    /// Trailing two octets match the computed FCS
    Valid,

    /// Trailing two octets differ from the computed FCS
    Invalid { computed: u16, received: u16 },

    /// Frame is too short to carry an FCS
    Missing,
}

impl FcsStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, FcsStatus::Valid)
    }
}

/// Check the trailing FCS of a complete frame
///
/// # Arguments
///
/// * `frame` - Complete frame including the 2-byte FCS
///
/// # Returns
///
/// * `FcsStatus` - Whether the checksum matches
pub fn verify_fcs(frame: &[u8]) -> FcsStatus {
    if frame.len() < FCS_LEN {
        return FcsStatus::Missing;
    }

    let (body, trailer) = frame.split_at(frame.len() - FCS_LEN);
    let computed = crc16_x25(body);
    let received = u16::from_le_bytes([trailer[0], trailer[1]]);

    if computed == received {
        FcsStatus::Valid
    } else {
        FcsStatus::Invalid { computed, received }
    }
}

/// Bitwise CRC-16/X.25, reference for the table
#[cfg(test)]
fn crc16_x25_slow(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }

    crc ^ CRC16_XOROUT
}
