//! # Control Field
//!
//! Classification and construction of the AX.25 control octet.
//!
//! ```text
//!            |7|6|5| 4 |3|2|1|0|
//! I frame:   N(R)  | P | N(S)|0|
//! S frame:   N(R)  |P/F|S S|0 1|
//! U frame:   M M M |P/F|M M|1 1|
//! ```

use super::protocol::*;

/// Largest sequence number in modulo-8 operation
pub const MAX_SEQUENCE: u8 = 7;

/// Broad control field format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    Information,
    Supervisory,
    Unnumbered,
}

/// Format of a control octet from its low bits
pub fn frame_class(control: u8) -> FrameClass {
    if control & 0x01 == 0x00 {
        FrameClass::Information
    } else if control & 0x03 == 0x01 {
        FrameClass::Supervisory
    } else {
        FrameClass::Unnumbered
    }
}

/// Classify a control octet
///
/// The poll/final bit is ignored for unnumbered frames. Octets matching no
/// known command or response become [`FrameType::Unknown`].
///
/// # Examples
///
/// ```
/// use ax25_relay::ax25::control::classify;
/// use ax25_relay::ax25::protocol::FrameType;
///
/// assert_eq!(classify(0x3F), FrameType::Sabm);
/// assert_eq!(classify(0x22), FrameType::I);
/// ```
pub fn classify(control: u8) -> FrameType {
    match frame_class(control) {
        FrameClass::Information => FrameType::I,
        FrameClass::Supervisory => match control & 0x0F {
            CONTROL_RR => FrameType::Rr,
            CONTROL_RNR => FrameType::Rnr,
            CONTROL_REJ => FrameType::Rej,
            CONTROL_SREJ => FrameType::Srej,
            _ => FrameType::Unknown(control),
        },
        FrameClass::Unnumbered => match control & MASK_U_FRAME {
            CONTROL_SABME => FrameType::Sabme,
            CONTROL_SABM => FrameType::Sabm,
            CONTROL_DISC => FrameType::Disc,
            CONTROL_DM => FrameType::Dm,
            CONTROL_UA => FrameType::Ua,
            CONTROL_FRMR => FrameType::Frmr,
            CONTROL_UI => FrameType::Ui,
            CONTROL_XID => FrameType::Xid,
            CONTROL_TEST => FrameType::Test,
            _ => FrameType::Unknown(control),
        },
    }
}

/// N(S) of an I frame control octet
pub fn send_sequence(control: u8) -> u8 {
    (control >> 1) & 0x07
}

/// N(R) of an I or S frame control octet
pub fn receive_sequence(control: u8) -> u8 {
    (control >> 5) & 0x07
}

/// Poll/final bit
pub fn is_poll(control: u8) -> bool {
    control & MASK_POLL != 0
}

/// Next sequence number, wrapping 7 to 0
pub fn next_sequence(seq: u8) -> u8 {
    if seq < MAX_SEQUENCE {
        seq + 1
    } else {
        0
    }
}

/// Build a control octet
///
/// I frames pack `(rx_seq << 5) | (tx_seq << 1)`; every other type uses its bare
/// constant. `poll` sets bit 4 on top of either.
pub fn build_control(frame_type: FrameType, tx_seq: u8, rx_seq: u8, poll: bool) -> u8 {
    let base = match frame_type {
        FrameType::I => ((rx_seq & 0x07) << 5) | ((tx_seq & 0x07) << 1),
        other => other.control_base(),
    };

    if poll {
        base | MASK_POLL
    } else {
        base
    }
}
