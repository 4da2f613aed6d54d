//! # Error Types
//!
//! Custom error types for the AX.25 relay using `thiserror`.

use std::net::SocketAddr;

use thiserror::Error;

/// Main error type for the AX.25 relay
#[derive(Debug, Error)]
pub enum Ax25Error {
    /// Fewer than 7 octets where an address field was expected
    #[error("Malformed address at offset {offset}: {available} bytes available, 7 required")]
    MalformedAddress { offset: usize, available: usize },

    /// SSID outside 0-15
    #[error("Invalid SSID {0}: must be between 0 and 15")]
    InvalidSsid(u8),

    /// Callsign that cannot be shifted into an address octet
    #[error("Invalid callsign {0:?}")]
    InvalidCallsign(String),

    /// Frame ends before a mandatory field
    #[error("Frame too short: {0}")]
    FrameTooShort(String),

    /// Address field carries more repeaters than AX.25 allows
    #[error("Too many digipeaters: more than {0} in address field")]
    TooManyDigipeaters(usize),

    /// Received FCS does not match the computed one
    #[error("Checksum mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    ChecksumMismatch { computed: u16, received: u16 },

    /// A frame was requested for a connection that has never seen a peer frame
    #[error("No addresses known for connection {0}")]
    UnknownPeer(String),

    /// UDP socket could not be bound
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Ax25Error {
    /// Whether the error concerns a single datagram and the link can keep running
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Ax25Error::MalformedAddress { .. }
                | Ax25Error::FrameTooShort(_)
                | Ax25Error::TooManyDigipeaters(_)
                | Ax25Error::ChecksumMismatch { .. }
        )
    }
}

/// Result type alias for the AX.25 relay
pub type Result<T> = std::result::Result<T, Ax25Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_errors_are_recoverable() {
        assert!(Ax25Error::MalformedAddress { offset: 7, available: 3 }.is_frame_error());
        assert!(Ax25Error::FrameTooShort("no control".into()).is_frame_error());
        assert!(Ax25Error::ChecksumMismatch { computed: 1, received: 2 }.is_frame_error());
        assert!(!Ax25Error::InvalidSsid(16).is_frame_error());
    }

    #[test]
    fn test_checksum_message_is_hex() {
        let err = Ax25Error::ChecksumMismatch { computed: 0x906E, received: 0x0001 };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: computed 0x906E, received 0x0001"
        );
    }
}
