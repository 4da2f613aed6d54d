//! # AX.25 Address Codec
//!
//! Encodes and decodes the 7-octet address field.
//!
//! ```text
//! byte 0..5: ASCII callsign << 1, space padded
//! byte 6:    V R R S S S S L
//!            | | | |     | +-- last address (extension bit)
//!            | | | +-----+---- SSID (0-15)
//!            | +-+------------ reserved, set on transmit
//!            +---------------- via / has-been-repeated
//! ```

use super::protocol::*;
use crate::error::{Ax25Error, Result};

/// Flag bits applied while encoding an address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressFlags {
    /// Mark as last address of the field
    pub last: bool,

    /// Address of a repeater hop
    pub via: bool,

    /// Set the high bit of the SSID octet
    pub direct: bool,
}

/// Decode one address at `offset`
///
/// # Arguments
///
/// * `bytes` - Buffer holding the address field
/// * `offset` - Start of the 7-octet address
///
/// # Returns
///
/// * `Result<(Address, usize)>` - Decoded address and the octets consumed (always 7)
///
/// # Errors
///
/// Returns `MalformedAddress` if fewer than 7 octets remain after `offset`
pub fn decode_address(bytes: &[u8], offset: usize) -> Result<(Address, usize)> {
    let available = bytes.len().saturating_sub(offset);
    if available < ADDRESS_LEN {
        return Err(Ax25Error::MalformedAddress { offset, available });
    }

    let field = &bytes[offset..offset + ADDRESS_LEN];

    let callsign: String = field[..CALLSIGN_LEN]
        .iter()
        .map(|&b| ((b >> 1) & 0x7F) as char)
        .filter(|&c| c != ' ' && c != '\0' && c != '-')
        .collect();

    let ssid_octet = field[CALLSIGN_LEN];

    Ok((
        Address {
            callsign,
            ssid: (ssid_octet >> 1) & 0x0F,
            is_last: ssid_octet & MASK_LAST != 0,
        },
        ADDRESS_LEN,
    ))
}

/// Encode a callsign and SSID into 7 octets
///
/// The callsign is uppercased and space padded (or truncated) to 6 characters.
///
/// # Errors
///
/// * `InvalidSsid` if `ssid` > 15
/// * `InvalidCallsign` if the callsign contains non-ASCII characters
///
/// # Examples
///
/// ```
/// use ax25_relay::ax25::address::{encode_address, AddressFlags};
///
/// let octets = encode_address("n0call", 5, AddressFlags::default()).unwrap();
/// assert_eq!(octets[0], b'N' << 1);
/// assert_eq!(octets[6], 0b0110_1010);
/// ```
pub fn encode_address(callsign: &str, ssid: u8, flags: AddressFlags) -> Result<[u8; ADDRESS_LEN]> {
    if ssid > 15 {
        return Err(Ax25Error::InvalidSsid(ssid));
    }
    if !callsign.is_ascii() {
        return Err(Ax25Error::InvalidCallsign(callsign.to_string()));
    }

    let mut octets = [b' ' << 1; ADDRESS_LEN];
    for (slot, ch) in octets.iter_mut().zip(callsign.bytes().take(CALLSIGN_LEN)) {
        *slot = ch.to_ascii_uppercase() << 1;
    }

    let mut ssid_octet = (ssid << 1) | MASK_SSID_RESERVED;
    if flags.direct {
        ssid_octet |= MASK_VIA;
    }
    if !flags.direct && flags.via {
        ssid_octet &= !MASK_VIA;
    }
    if flags.last {
        ssid_octet |= MASK_LAST;
    }
    octets[CALLSIGN_LEN] = ssid_octet;

    Ok(octets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_known_bytes() {
        let octets = encode_address("MYCALL", 1, AddressFlags::default()).unwrap();
        assert_eq!(
            octets,
            [b'M' << 1, b'Y' << 1, b'C' << 1, b'A' << 1, b'L' << 1, b'L' << 1, 0x62]
        );
    }

    #[test]
    fn test_encode_pads_short_callsign() {
        let octets = encode_address("AB1", 0, AddressFlags::default()).unwrap();
        assert_eq!(&octets[3..6], &[0x40, 0x40, 0x40]);
    }

    #[test]
    fn test_encode_truncates_long_callsign() {
        let octets = encode_address("ABCDEFGH", 0, AddressFlags::default()).unwrap();
        assert_eq!(octets[5], b'F' << 1);
        let (decoded, _) = decode_address(&octets, 0).unwrap();
        assert_eq!(decoded.callsign, "ABCDEF");
    }

    #[test]
    fn test_encode_flags() {
        let direct_last = AddressFlags { last: true, via: true, direct: true };
        assert_eq!(encode_address("A", 0, direct_last).unwrap()[6], 0xE1);

        let via_last = AddressFlags { last: true, via: true, direct: false };
        assert_eq!(encode_address("A", 0, via_last).unwrap()[6], 0x61);

        let direct = AddressFlags { direct: true, ..Default::default() };
        assert_eq!(encode_address("A", 15, direct).unwrap()[6], 0x80 | 0x60 | 0x1E);
    }

    #[test]
    fn test_encode_invalid_ssid() {
        let result = encode_address("N0CALL", 16, AddressFlags::default());
        assert!(matches!(result, Err(Ax25Error::InvalidSsid(16))));
    }

    #[test]
    fn test_encode_non_ascii_callsign() {
        let result = encode_address("DÖ1AB", 0, AddressFlags::default());
        assert!(matches!(result, Err(Ax25Error::InvalidCallsign(_))));
    }

    #[test]
    fn test_decode_at_offset() {
        let mut buf = encode_address("MYCALL", 1, AddressFlags::default()).unwrap().to_vec();
        buf.extend_from_slice(&encode_address("N0CALL", 5, AddressFlags { last: true, ..Default::default() }).unwrap());

        let (dest, used) = decode_address(&buf, 0).unwrap();
        assert_eq!(used, 7);
        assert_eq!(dest, Address { callsign: "MYCALL".into(), ssid: 1, is_last: false });

        let (src, _) = decode_address(&buf, 7).unwrap();
        assert_eq!(src, Address { callsign: "N0CALL".into(), ssid: 5, is_last: true });
    }

    #[test]
    fn test_decode_drops_dash_and_nul() {
        let buf = [b'A' << 1, b'B' << 1, b'-' << 1, 0x00, b' ' << 1, b'C' << 1, 0x60];
        let (addr, _) = decode_address(&buf, 0).unwrap();
        assert_eq!(addr.callsign, "ABC");
    }

    #[test]
    fn test_decode_too_short() {
        let buf = [0x40u8; 10];
        let result = decode_address(&buf, 7);
        match result {
            Err(Ax25Error::MalformedAddress { offset, available }) => {
                assert_eq!(offset, 7);
                assert_eq!(available, 3);
            }
            other => panic!("Expected MalformedAddress, got: {:?}", other),
        }

        // Offset past the end must not panic
        assert!(decode_address(&buf, 64).is_err());
    }

    proptest! {
        #[test]
        fn prop_address_round_trip(
            callsign in "[A-Z0-9]{1,6}",
            ssid in 0u8..=15,
            last in any::<bool>(),
            via in any::<bool>(),
            direct in any::<bool>(),
        ) {
            let octets = encode_address(&callsign, ssid, AddressFlags { last, via, direct }).unwrap();
            let (decoded, used) = decode_address(&octets, 0).unwrap();
            prop_assert_eq!(used, 7);
            prop_assert_eq!(decoded.callsign, callsign);
            prop_assert_eq!(decoded.ssid, ssid);
            prop_assert_eq!(decoded.is_last, last);
        }
    }
}
