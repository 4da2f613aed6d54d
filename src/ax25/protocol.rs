//! # AX.25 Protocol Constants and Types
//!
//! Core protocol definitions for the AX.25 link layer.
//!
//! ```text
//! [dest:7][src:7]([digi:7] x 0..8)[control:1]([pid:1][info:0..256])[fcs:2]
//! ```

use std::fmt;

/// Callsign characters per address field
pub const CALLSIGN_LEN: usize = 6;

/// Encoded address length (callsign + SSID octet)
pub const ADDRESS_LEN: usize = CALLSIGN_LEN + 1;

/// Maximum number of digipeaters in the address field
pub const MAX_DIGIPEATERS: usize = 8;

/// Destination + source address fields
pub const ADDRESS_BLOCK_LEN: usize = 2 * ADDRESS_LEN;

/// Space reserved for a full digipeater chain
pub const DIGIPEATER_BLOCK_LEN: usize = MAX_DIGIPEATERS * ADDRESS_LEN;

/// Maximum packet length
pub const MAX_PACKET_LEN: usize = 255;

/// Maximum info field carried in one I frame
/// Packet length minus a full address field (with repeaters) and the FCS: 255 - (14 + 56 + 2) = 183
pub const MAX_INFO_LEN: usize = MAX_PACKET_LEN - (ADDRESS_BLOCK_LEN + DIGIPEATER_BLOCK_LEN + 2);

/// Smallest well-formed frame: two addresses, control, FCS
pub const MIN_FRAME_LEN: usize = ADDRESS_BLOCK_LEN + 1 + 2;

// I frame
pub const CONTROL_I: u8 = 0x00;

// S frames
pub const CONTROL_RR: u8 = 0x01;
pub const CONTROL_RNR: u8 = 0x05;
pub const CONTROL_REJ: u8 = 0x09;
pub const CONTROL_SREJ: u8 = 0x0D;

// U frames
pub const CONTROL_SABME: u8 = 0x6F;
pub const CONTROL_SABM: u8 = 0x2F;
pub const CONTROL_DISC: u8 = 0x43;
pub const CONTROL_DM: u8 = 0x0F;
pub const CONTROL_UA: u8 = 0x63;
pub const CONTROL_FRMR: u8 = 0x87;
pub const CONTROL_UI: u8 = 0x03;
pub const CONTROL_XID: u8 = 0xAF;
pub const CONTROL_TEST: u8 = 0xE3;

/// Has-been-repeated / command bit in the SSID octet
pub const MASK_VIA: u8 = 0x80;

/// Address extension bit: set on the last address of the field
pub const MASK_LAST: u8 = 0x01;

/// Reserved SSID bits, always set on transmit
pub const MASK_SSID_RESERVED: u8 = 0b0110_0000;

/// Poll/final bit of the control octet
pub const MASK_POLL: u8 = 0x10;

/// Clears the poll/final bit of an unnumbered control octet
pub const MASK_U_FRAME: u8 = 0xEF;

// Protocol identifiers
pub const PID_ISO_8208: u8 = 0x01;
pub const PID_COMPRESSED_TCP_IP: u8 = 0x06;
pub const PID_UNCOMPRESSED_TCP_IP: u8 = 0x07;
pub const PID_SEGMENTATION_FRAGMENT: u8 = 0x08;
pub const PID_TEXNET: u8 = 0xC3;
pub const PID_LINK_QUALITY: u8 = 0xC4;
pub const PID_APPLETALK: u8 = 0xCA;
pub const PID_APPLETALK_ARP: u8 = 0xCB;
pub const PID_ARPA_IP: u8 = 0xCC;
pub const PID_ARPA_ARP: u8 = 0xCD;
pub const PID_FLEXNET: u8 = 0xCE;
pub const PID_NET_ROM: u8 = 0xCF;
pub const PID_NO_LAYER3: u8 = 0xF0;

/// Station address: callsign plus SSID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Callsign, up to 6 characters, padding removed
    pub callsign: String,

    /// Secondary station identifier (0-15)
    pub ssid: u8,

    /// Last address in the address field
    pub is_last: bool,
}

impl Address {
    /// Create an address that is not marked last
    pub fn new(callsign: impl Into<String>, ssid: u8) -> Self {
        Self {
            callsign: callsign.into(),
            ssid,
            is_last: false,
        }
    }

    /// Compare callsign and SSID, ignoring the extension bit
    pub fn same_station(&self, callsign: &str, ssid: u8) -> bool {
        self.callsign == callsign && self.ssid == ssid
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid > 0 {
            write!(f, "{}-{}", self.callsign, self.ssid)
        } else {
            write!(f, "{}", self.callsign)
        }
    }
}

/// Frame type named by the control octet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Information
    I,
    /// Receive Ready
    Rr,
    /// Receive Not Ready
    Rnr,
    /// Reject
    Rej,
    /// Selective Reject
    Srej,
    /// Set Asynchronous Balanced Mode
    Sabm,
    /// Set Asynchronous Balanced Mode Extended
    Sabme,
    /// Disconnect
    Disc,
    /// Disconnected Mode
    Dm,
    /// Unnumbered Acknowledge
    Ua,
    /// Frame Reject
    Frmr,
    /// Unnumbered Information
    Ui,
    /// Exchange Identification
    Xid,
    /// Test
    Test,
    /// Control octet matching no known frame type (raw octet kept)
    Unknown(u8),
}

impl FrameType {
    /// Control octet for this frame type with poll clear and sequence numbers zero
    pub fn control_base(&self) -> u8 {
        match self {
            FrameType::I => CONTROL_I,
            FrameType::Rr => CONTROL_RR,
            FrameType::Rnr => CONTROL_RNR,
            FrameType::Rej => CONTROL_REJ,
            FrameType::Srej => CONTROL_SREJ,
            FrameType::Sabm => CONTROL_SABM,
            FrameType::Sabme => CONTROL_SABME,
            FrameType::Disc => CONTROL_DISC,
            FrameType::Dm => CONTROL_DM,
            FrameType::Ua => CONTROL_UA,
            FrameType::Frmr => CONTROL_FRMR,
            FrameType::Ui => CONTROL_UI,
            FrameType::Xid => CONTROL_XID,
            FrameType::Test => CONTROL_TEST,
            FrameType::Unknown(raw) => *raw,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, FrameType::Unknown(_))
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrameType::I => "I",
            FrameType::Rr => "RR",
            FrameType::Rnr => "RNR",
            FrameType::Rej => "REJ",
            FrameType::Srej => "SREJ",
            FrameType::Sabm => "SABM",
            FrameType::Sabme => "SABME",
            FrameType::Disc => "DISC",
            FrameType::Dm => "DM",
            FrameType::Ua => "UA",
            FrameType::Frmr => "FRMR",
            FrameType::Ui => "UI",
            FrameType::Xid => "XID",
            FrameType::Test => "TEST",
            FrameType::Unknown(raw) => return write!(f, "UNKNOWN(0x{:02X})", raw),
        };
        f.write_str(label)
    }
}

/// Layer 3 protocol identifier of an I frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pid {
    /// Bits 5..4 equal 01 or 10: an AX.25 layer 3 is implemented
    Layer3Implemented(u8),
    Iso8208,
    CompressedTcpIp,
    UncompressedTcpIp,
    SegmentationFragment,
    Texnet,
    LinkQuality,
    AppleTalk,
    AppleTalkArp,
    ArpaIp,
    ArpaArp,
    FlexNet,
    NetRom,
    NoLayer3,
    Unknown(u8),
}

impl From<u8> for Pid {
    fn from(pid: u8) -> Self {
        // Layer 3 pattern takes precedence over the table
        if matches!(pid & 0x30, 0x10 | 0x20) {
            return Pid::Layer3Implemented(pid);
        }

        match pid {
            PID_ISO_8208 => Pid::Iso8208,
            PID_COMPRESSED_TCP_IP => Pid::CompressedTcpIp,
            PID_UNCOMPRESSED_TCP_IP => Pid::UncompressedTcpIp,
            PID_SEGMENTATION_FRAGMENT => Pid::SegmentationFragment,
            PID_TEXNET => Pid::Texnet,
            PID_LINK_QUALITY => Pid::LinkQuality,
            PID_APPLETALK => Pid::AppleTalk,
            PID_APPLETALK_ARP => Pid::AppleTalkArp,
            PID_ARPA_IP => Pid::ArpaIp,
            PID_ARPA_ARP => Pid::ArpaArp,
            PID_FLEXNET => Pid::FlexNet,
            PID_NET_ROM => Pid::NetRom,
            PID_NO_LAYER3 => Pid::NoLayer3,
            other => Pid::Unknown(other),
        }
    }
}

impl Pid {
    /// Human-readable protocol name
    pub fn label(&self) -> &'static str {
        match self {
            Pid::Layer3Implemented(_) => "Layer 3 implemented",
            Pid::Iso8208 => "ISO 8208/CCITT X.25 PLP",
            Pid::CompressedTcpIp => "Compressed TCP/IP",
            Pid::UncompressedTcpIp => "Uncompressed TCP/IP",
            Pid::SegmentationFragment => "Segmentation Fragment",
            Pid::Texnet => "TEXNET Datagram Protocol",
            Pid::LinkQuality => "Link Quality Protocol",
            Pid::AppleTalk => "Appletalk",
            Pid::AppleTalkArp => "Appletalk ARP",
            Pid::ArpaIp => "ARPA Internet Protocol",
            Pid::ArpaArp => "ARPA Address Resolution",
            Pid::FlexNet => "Flexnet",
            Pid::NetRom => "NET/ROM",
            Pid::NoLayer3 => "No Layer 3",
            Pid::Unknown(_) => "UNKNOWN PID",
        }
    }
}

/// Decoded AX.25 frame (FCS not included)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Destination address
    pub destination: Address,

    /// Source address
    pub source: Address,

    /// Repeaters in routing order
    pub digipeaters: Vec<Address>,

    /// Raw control octet
    pub control: u8,

    /// Classified frame type
    pub frame_type: FrameType,

    /// Protocol identifier (I frames only)
    pub pid: Option<Pid>,

    /// Info field without FCS (I frames only)
    pub info: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_constants() {
        assert_eq!(ADDRESS_LEN, 7);
        assert_eq!(ADDRESS_BLOCK_LEN, 14);
        assert_eq!(DIGIPEATER_BLOCK_LEN, 56);
        assert_eq!(MAX_INFO_LEN, 183);
        assert_eq!(MIN_FRAME_LEN, 17);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address::new("N0CALL", 5).to_string(), "N0CALL-5");
        assert_eq!(Address::new("MYCALL", 0).to_string(), "MYCALL");
    }

    #[test]
    fn test_frame_type_display() {
        assert_eq!(FrameType::Sabm.to_string(), "SABM");
        assert_eq!(FrameType::Unknown(0x07).to_string(), "UNKNOWN(0x07)");
    }

    #[test]
    fn test_control_base_round_values() {
        assert_eq!(FrameType::Ua.control_base(), 0x63);
        assert_eq!(FrameType::Disc.control_base(), 0x43);
        assert_eq!(FrameType::Unknown(0x27).control_base(), 0x27);
    }

    #[test]
    fn test_pid_table() {
        assert_eq!(Pid::from(0xF0), Pid::NoLayer3);
        assert_eq!(Pid::from(0xCF), Pid::NetRom);
        assert_eq!(Pid::from(0xCC).label(), "ARPA Internet Protocol");
        assert_eq!(Pid::from(0x01).label(), "ISO 8208/CCITT X.25 PLP");
        assert_eq!(Pid::from(0xFF), Pid::Unknown(0xFF));
    }

    #[test]
    fn test_pid_layer3_pattern_precedes_table() {
        assert_eq!(Pid::from(0x10), Pid::Layer3Implemented(0x10));
        assert_eq!(Pid::from(0xA0).label(), "Layer 3 implemented");
        // 0x30 pattern is not a layer 3 marker
        assert_eq!(Pid::from(0x30), Pid::Unknown(0x30));
    }
}
