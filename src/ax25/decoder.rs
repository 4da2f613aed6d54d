//! # AX.25 Frame Decoder
//!
//! Parses a received datagram into a [`Frame`]. The FCS is not checked here;
//! see [`super::crc::verify_fcs`].

use super::address::decode_address;
use super::control::classify;
use super::crc::FCS_LEN;
use super::protocol::*;
use crate::error::{Ax25Error, Result};

/// Decode a complete AX.25 frame
///
/// Repeater addresses are read only when the source address is not marked
/// last. Parsing of the repeater chain stops at an address marked last, when
/// 7 or fewer octets remain before the FCS, or when the next octet is `0x03`.
///
/// # Arguments
///
/// * `raw` - Frame bytes including the trailing FCS
///
/// # Returns
///
/// * `Result<Frame>` - Decoded frame, or error if malformed
///
/// # Errors
///
/// Returns error if:
/// - An address field is truncated
/// - More than 8 repeaters are present
/// - The control octet (or the PID of an I frame) is missing
pub fn decode_frame(raw: &[u8]) -> Result<Frame> {
    let (destination, used) = decode_address(raw, 0)?;
    let (source, _) = decode_address(raw, used)?;

    if raw.len() < MIN_FRAME_LEN {
        return Err(Ax25Error::FrameTooShort("missing control field".to_string()));
    }

    // Frame fields end where the FCS begins
    let body = &raw[..raw.len() - FCS_LEN];
    let mut rest = &body[ADDRESS_BLOCK_LEN..];
    let mut digipeaters = Vec::new();

    // 0x03 may equal a UI control octet, so it ends the chain
    let mut last = source.is_last;
    while !last && rest.len() > ADDRESS_LEN && rest[0] != CONTROL_UI {
        if digipeaters.len() == MAX_DIGIPEATERS {
            return Err(Ax25Error::TooManyDigipeaters(MAX_DIGIPEATERS));
        }
        let (digi, used) = decode_address(rest, 0)?;
        last = digi.is_last;
        digipeaters.push(digi);
        rest = &rest[used..];
    }

    let (&control, after_control) = rest
        .split_first()
        .ok_or_else(|| Ax25Error::FrameTooShort("missing control field".to_string()))?;
    let frame_type = classify(control);

    let (pid, info) = if frame_type == FrameType::I {
        let (&pid, info) = after_control
            .split_first()
            .ok_or_else(|| Ax25Error::FrameTooShort("I frame without PID".to_string()))?;
        (Some(Pid::from(pid)), Some(info.to_vec()))
    } else {
        (None, None)
    };

    Ok(Frame {
        destination,
        source,
        digipeaters,
        control,
        frame_type,
        pid,
        info,
    })
}
