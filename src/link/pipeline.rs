//! # Frame Pipeline
//!
//! Moves frames between wire bytes and the connection table: inbound frames
//! update the entry of the remote station, outbound frames are built from it.

use serde::Deserialize;
use tracing::{debug, warn};

use super::connection::{ConnectionKey, ConnectionTable};
use crate::ax25::control::{build_control, send_sequence, MAX_SEQUENCE};
use crate::ax25::crc::{verify_fcs, FcsStatus};
use crate::ax25::decoder::decode_frame;
use crate::ax25::encoder::encode_frame;
use crate::ax25::protocol::{Frame, FrameType};
use crate::error::{Ax25Error, Result};

/// Which address field names the remote station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySide {
    /// Frame received from the peer: the peer is the source
    Source,

    /// Frame produced locally: the peer is the destination
    Destination,
}

/// Handling of frames whose FCS does not match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Drop the frame
    #[default]
    Enforce,

    /// Log and process the frame anyway
    Ignore,
}

/// Decodes into and builds from a [`ConnectionTable`]
#[derive(Debug, Clone, Default)]
pub struct FramePipeline {
    checksum: ChecksumPolicy,
}

/// Info field as text: one char per octet, CR and LF removed
pub fn info_text(info: &[u8]) -> String {
    info.iter()
        .map(|&b| b as char)
        .filter(|&c| c != '\r' && c != '\n')
        .collect()
}

/// Text as info octets, the inverse of [`info_text`]; chars above U+00FF become `?`
pub fn text_octets(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()
}

/// Receive sequence number following a peer's N(S)
///
/// Kept as `txn + 1`, with 7 mapping to 0, rather than taken from AX.25
/// acknowledgement rules.
fn derive_rx_seq(control: u8) -> u8 {
    let txn = send_sequence(control);
    if txn < MAX_SEQUENCE {
        txn + 1
    } else {
        0
    }
}

impl FramePipeline {
    pub fn new(checksum: ChecksumPolicy) -> Self {
        Self { checksum }
    }

    /// Check the FCS and decode a frame without touching any connection
    ///
    /// # Returns
    ///
    /// * `Result<(Frame, FcsStatus)>` - Decoded frame and the FCS outcome
    ///
    /// # Errors
    ///
    /// Returns `ChecksumMismatch` under [`ChecksumPolicy::Enforce`], or any
    /// decoder error for a malformed frame
    pub fn parse(&self, raw: &[u8]) -> Result<(Frame, FcsStatus)> {
        let status = verify_fcs(raw);

        match (status, self.checksum) {
            (FcsStatus::Valid, _) => {}
            (FcsStatus::Invalid { computed, received }, ChecksumPolicy::Enforce) => {
                return Err(Ax25Error::ChecksumMismatch { computed, received });
            }
            (FcsStatus::Missing, ChecksumPolicy::Enforce) => {
                return Err(Ax25Error::FrameTooShort("no FCS".to_string()));
            }
            (status, ChecksumPolicy::Ignore) => {
                warn!("Processing frame with bad FCS ({:?})", status);
            }
        }

        Ok((decode_frame(raw)?, status))
    }

    /// Store a decoded frame on the connection of the remote station
    ///
    /// The connection's `source` is always the remote station and
    /// `destination` the local one, whichever side produced the frame.
    pub fn apply(&self, table: &mut ConnectionTable, frame: &Frame, raw: &[u8], side: KeySide) -> ConnectionKey {
        let (remote, local) = match side {
            KeySide::Source => (&frame.source, &frame.destination),
            KeySide::Destination => (&frame.destination, &frame.source),
        };
        let key = ConnectionKey::from(remote);
        let conn = table.get_or_create(&key);

        match side {
            KeySide::Source => conn.last_rx_frame = raw.to_vec(),
            KeySide::Destination => conn.last_tx_frame = raw.to_vec(),
        }

        conn.source = Some(remote.clone());
        conn.destination = Some(local.clone());
        conn.digipeaters = frame.digipeaters.clone();
        conn.last_frame_type = Some(frame.frame_type);
        conn.last_pid = frame.pid;
        conn.last_info_text = frame.info.as_deref().map(info_text).unwrap_or_default();

        if frame.frame_type == FrameType::I && side == KeySide::Source {
            conn.rx_seq = derive_rx_seq(frame.control);
        }

        debug!(
            "{} {} -> {} ({} digipeaters, PID {})",
            frame.frame_type,
            frame.source,
            frame.destination,
            frame.digipeaters.len(),
            frame.pid.map_or("none", |pid| pid.label())
        );

        key
    }

    /// Decode raw bytes into the connection table
    ///
    /// # Arguments
    ///
    /// * `table` - Connection table to update
    /// * `raw` - Frame including FCS
    /// * `side` - Address field holding the remote station
    ///
    /// # Returns
    ///
    /// * `Result<ConnectionKey>` - Key of the updated connection
    pub fn decode(&self, table: &mut ConnectionTable, raw: &[u8], side: KeySide) -> Result<ConnectionKey> {
        let (frame, _) = self.parse(raw)?;
        Ok(self.apply(table, &frame, raw, side))
    }

    /// Build a frame to the remote station of `key`
    ///
    /// I frames carry the connection's V(R)/V(S) and advance V(S). The frame
    /// is stored as the connection's last transmitted frame.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPeer` if no frame from the peer has been decoded yet,
    /// or an address error from the encoder
    pub fn build(
        &self,
        table: &mut ConnectionTable,
        key: &ConnectionKey,
        frame_type: FrameType,
        payload: &[u8],
        poll: bool,
    ) -> Result<Vec<u8>> {
        let conn = table.get_or_create(key);

        let (Some(peer), Some(local)) = (conn.source.as_ref(), conn.destination.as_ref()) else {
            return Err(Ax25Error::UnknownPeer(key.to_string()));
        };

        let control = build_control(frame_type, conn.tx_seq, conn.rx_seq, poll);
        let frame = encode_frame(peer, local, &conn.digipeaters, frame_type, control, payload)?;

        debug!("Built {} to {} ({} bytes, control 0x{:02X})", frame_type, peer, frame.len(), control);

        conn.last_tx_frame = frame.clone();
        if frame_type == FrameType::I {
            conn.advance_tx_seq();
        }

        Ok(frame)
    }
}
