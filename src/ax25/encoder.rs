//! # AX.25 Frame Encoder
//!
//! Assembles address field, control, PID, info and FCS into a wire frame.

use bytes::{BufMut, BytesMut};

use super::address::{encode_address, AddressFlags};
use super::crc::{fcs, FCS_LEN};
use super::protocol::*;
use crate::error::Result;

/// Encode the address field of an outgoing frame
///
/// `to` goes first with no flags. `from` carries the direct bit and, when no
/// repeaters follow, the last-address bit. Each repeater is marked via; the
/// final one is marked last.
///
/// # Errors
///
/// Returns error if any address has an invalid SSID or callsign
pub fn encode_address_field(to: &Address, from: &Address, digipeaters: &[Address]) -> Result<BytesMut> {
    let mut field = BytesMut::with_capacity(ADDRESS_BLOCK_LEN + digipeaters.len() * ADDRESS_LEN);

    field.put_slice(&encode_address(&to.callsign, to.ssid, AddressFlags::default())?);

    if digipeaters.is_empty() {
        let flags = AddressFlags { last: true, via: true, direct: true };
        field.put_slice(&encode_address(&from.callsign, from.ssid, flags)?);
    } else {
        let flags = AddressFlags { direct: true, ..Default::default() };
        field.put_slice(&encode_address(&from.callsign, from.ssid, flags)?);

        let final_index = digipeaters.len() - 1;
        for (i, digi) in digipeaters.iter().enumerate() {
            let flags = AddressFlags { last: i == final_index, via: true, direct: false };
            field.put_slice(&encode_address(&digi.callsign, digi.ssid, flags)?);
        }
    }

    Ok(field)
}

/// Encode a complete AX.25 frame
///
/// # Arguments
///
/// * `to` - Wire destination
/// * `from` - Wire source
/// * `digipeaters` - Repeater path in routing order
/// * `frame_type` - Frame type; `I` frames get the "No Layer 3" PID
/// * `control` - Control octet (see [`super::control::build_control`])
/// * `payload` - Info field, appended verbatim
///
/// # Returns
///
/// * `Result<Vec<u8>>` - Frame including the little-endian FCS
///
/// # Examples
///
/// ```
/// use ax25_relay::ax25::encoder::encode_frame;
/// use ax25_relay::ax25::protocol::{Address, FrameType};
///
/// let to = Address::new("N0CALL", 5);
/// let from = Address::new("MYCALL", 1);
/// let frame = encode_frame(&to, &from, &[], FrameType::Ua, 0x73, &[]).unwrap();
/// assert_eq!(frame.len(), 17);
/// ```
pub fn encode_frame(
    to: &Address,
    from: &Address,
    digipeaters: &[Address],
    frame_type: FrameType,
    control: u8,
    payload: &[u8],
) -> Result<Vec<u8>> {
    let mut frame = encode_address_field(to, from, digipeaters)?;
    frame.reserve(1 + 1 + payload.len() + FCS_LEN);

    frame.put_u8(control);

    if frame_type == FrameType::I {
        frame.put_u8(PID_NO_LAYER3);
    }

    frame.put_slice(payload);

    let checksum = fcs(&frame);
    frame.put_slice(&checksum);

    Ok(frame.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ax25::crc::{verify_fcs, FcsStatus};

    fn peer() -> Address {
        Address::new("N0CALL", 5)
    }

    fn local() -> Address {
        Address::new("MYCALL", 1)
    }

    #[test]
    fn test_encode_direct_address_field() {
        let field = encode_address_field(&peer(), &local(), &[]).unwrap();
        assert_eq!(field.len(), 14);
        // to: reserved bits only
        assert_eq!(field[6], 0x60 | (5 << 1));
        // from: direct + last
        assert_eq!(field[13], 0x80 | 0x60 | (1 << 1) | 0x01);
    }

    #[test]
    fn test_encode_digipeater_field_marks_only_final() {
        let digis = vec![Address::new("RPT1", 0), Address::new("RPT2", 1), Address::new("RPT3", 2)];
        let field = encode_address_field(&peer(), &local(), &digis).unwrap();
        assert_eq!(field.len(), 35);

        // from: direct, not last
        assert_eq!(field[13] & MASK_LAST, 0);
        assert_eq!(field[13] & MASK_VIA, MASK_VIA);

        let ssid_octets = [field[20], field[27], field[34]];
        assert_eq!(ssid_octets[0] & MASK_LAST, 0);
        assert_eq!(ssid_octets[1] & MASK_LAST, 0);
        assert_eq!(ssid_octets[2] & MASK_LAST, MASK_LAST);
        for octet in ssid_octets {
            assert_eq!(octet & MASK_VIA, 0);
        }
    }

    #[test]
    fn test_encode_i_frame_has_pid_and_payload() {
        let frame = encode_frame(&peer(), &local(), &[], FrameType::I, 0x00, b"ok\r").unwrap();
        assert_eq!(frame.len(), 14 + 1 + 1 + 3 + 2);
        assert_eq!(frame[14], 0x00);
        assert_eq!(frame[15], PID_NO_LAYER3);
        assert_eq!(&frame[16..19], b"ok\r");
        assert_eq!(verify_fcs(&frame), FcsStatus::Valid);
    }

    #[test]
    fn test_encode_u_frame_has_no_pid() {
        let frame = encode_frame(&peer(), &local(), &[], FrameType::Disc, 0x53, &[]).unwrap();
        assert_eq!(frame.len(), 17);
        assert_eq!(frame[14], 0x53);
        assert_eq!(verify_fcs(&frame), FcsStatus::Valid);
    }

    #[test]
    fn test_encode_different_payload_different_fcs() {
        let a = encode_frame(&peer(), &local(), &[], FrameType::I, 0x00, b"a").unwrap();
        let b = encode_frame(&peer(), &local(), &[], FrameType::I, 0x00, b"b").unwrap();
        assert_ne!(a[a.len() - 2..], b[b.len() - 2..]);
    }

    #[test]
    fn test_encode_rejects_invalid_ssid() {
        let bad = Address::new("N0CALL", 20);
        assert!(encode_frame(&bad, &local(), &[], FrameType::Ua, 0x63, &[]).is_err());
    }
}
