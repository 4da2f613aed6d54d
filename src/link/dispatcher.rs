//! # Link Dispatcher
//!
//! Reacts to inbound frames addressed to the local station: accepts SABM,
//! feeds I frame text to a [`SessionHandler`], answers DISC, and sends the
//! resulting frames back to the datagram's sender.

use std::net::SocketAddr;

use tracing::{debug, error, info, warn};

use super::connection::{ConnectionKey, ConnectionTable, LinkState};
use super::handler::SessionHandler;
use super::pipeline::{text_octets, FramePipeline, KeySide};
use crate::ax25::protocol::{FrameType, MAX_INFO_LEN};
use crate::config::LinkConfig;
use crate::error::{Ax25Error, Result};
use crate::transport::DatagramIo;

/// Counters kept over the life of a dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    pub datagrams_received: u64,
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub fcs_failures: u64,
}

/// Single owner of the connection table
pub struct LinkDispatcher<H: SessionHandler> {
    callsign: String,
    ssid: u8,
    banner: Option<String>,
    motd: String,
    table: ConnectionTable,
    pipeline: FramePipeline,
    handler: H,
    stats: DispatcherStats,
}

/// Terminate `text` with CR unless it already is
fn terminate_line(mut text: String) -> String {
    if !text.ends_with('\r') {
        text.push('\r');
    }
    text
}

impl<H: SessionHandler> LinkDispatcher<H> {
    /// Create a dispatcher for the station configured in `config`
    pub fn new(config: &LinkConfig, handler: H) -> Self {
        let banner = config
            .banner
            .as_ref()
            .filter(|banner| !banner.is_empty())
            .map(|banner| terminate_line(banner.clone()));

        Self {
            callsign: config.callsign.to_ascii_uppercase(),
            ssid: config.ssid,
            banner,
            motd: format!(
                "Welcome to {}, {}\r",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            table: ConnectionTable::new(),
            pipeline: FramePipeline::new(config.checksum),
            handler,
            stats: DispatcherStats::default(),
        }
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.table
    }

    pub fn stats(&self) -> DispatcherStats {
        self.stats
    }

    /// Prompt shown after the welcome text and after every handled line
    pub fn prompt(&self, peer: &ConnectionKey) -> String {
        format!("{} de {}-{}> ", peer.callsign, self.callsign, self.ssid)
    }

    /// Handle one datagram and return the frames to send back, in order
    ///
    /// Malformed datagrams, frames for other stations and handler failures
    /// produce no frames. Nothing here is fatal to the receive loop.
    pub fn process(&mut self, datagram: &[u8]) -> Vec<Vec<u8>> {
        self.stats.datagrams_received += 1;

        match self.react(datagram) {
            Ok(frames) => frames,
            Err(e) => {
                if matches!(e, Ax25Error::ChecksumMismatch { .. }) {
                    self.stats.fcs_failures += 1;
                }
                self.stats.frames_dropped += 1;

                if e.is_frame_error() {
                    debug!("Dropping datagram ({} bytes): {}", datagram.len(), e);
                } else {
                    warn!("Failed to answer datagram: {}", e);
                }
                Vec::new()
            }
        }
    }

    fn react(&mut self, raw: &[u8]) -> Result<Vec<Vec<u8>>> {
        let (frame, status) = self.pipeline.parse(raw)?;
        if !status.is_valid() {
            self.stats.fcs_failures += 1;
        }

        if !frame.destination.same_station(&self.callsign, self.ssid) {
            debug!("Ignoring {} for {} from {}", frame.frame_type, frame.destination, frame.source);
            return Ok(Vec::new());
        }

        let key = ConnectionKey::from(&frame.source);
        let mut out = Vec::new();

        match frame.frame_type {
            FrameType::Sabm => {
                self.pipeline.apply(&mut self.table, &frame, raw, KeySide::Source);
                out.push(self.pipeline.build(&mut self.table, &key, FrameType::Ua, &[], true)?);
                self.table.set_state(&key, LinkState::Established);
                info!("Link established with {}", key);

                let motd = text_octets(&self.motd);
                out.push(self.send_text(&key, &motd)?);
                if let Some(banner) = self.banner.as_deref().map(text_octets) {
                    out.push(self.send_text(&key, &banner)?);
                }
                out.push(self.send_prompt(&key)?);
            }

            FrameType::I => {
                if self.table.state(&key) != LinkState::Established {
                    self.pipeline.apply(&mut self.table, &frame, raw, KeySide::Source);
                    out.push(self.pipeline.build(&mut self.table, &key, FrameType::Disc, &[], true)?);
                    self.table.remove(&key);
                    info!("Rejected I frame from {} without link", key);
                    return Ok(out);
                }

                self.pipeline.apply(&mut self.table, &frame, raw, KeySide::Source);
                let text = self
                    .table
                    .get(&key)
                    .map(|conn| conn.last_info_text.clone())
                    .unwrap_or_default();

                let reply = match self.handler.handle(&key.callsign, &text) {
                    Ok(reply) => reply,
                    Err(e) => {
                        error!("Handler failed for {}: {:#}", key, e);
                        self.stats.frames_dropped += 1;
                        return Ok(Vec::new());
                    }
                };

                if reply.disconnect {
                    out.push(self.pipeline.build(&mut self.table, &key, FrameType::Disc, &[], true)?);
                    self.table.remove(&key);
                    info!("Disconnected {} on request", key);
                    return Ok(out);
                }

                if !reply.response.is_empty() {
                    let response = text_octets(&terminate_line(reply.response));
                    for chunk in response.chunks(MAX_INFO_LEN) {
                        out.push(self.send_text(&key, chunk)?);
                    }
                }
                out.push(self.send_prompt(&key)?);
            }

            FrameType::Disc => {
                if self.table.state(&key) == LinkState::Established {
                    self.pipeline.apply(&mut self.table, &frame, raw, KeySide::Source);
                    out.push(self.pipeline.build(&mut self.table, &key, FrameType::Ua, &[], true)?);
                    self.table.remove(&key);
                    info!("Link with {} closed by peer", key);
                } else {
                    debug!("Ignoring DISC from {} without link", key);
                }
            }

            other => {
                if self.table.contains(&key) {
                    self.pipeline.apply(&mut self.table, &frame, raw, KeySide::Source);
                }
                if other.is_unknown() {
                    warn!("Unknown control field from {}: {}", key, other);
                } else {
                    debug!("No reply to {} from {}", other, key);
                }
            }
        }

        Ok(out)
    }

    fn send_text(&mut self, key: &ConnectionKey, text: &[u8]) -> Result<Vec<u8>> {
        self.pipeline.build(&mut self.table, key, FrameType::I, text, false)
    }

    fn send_prompt(&mut self, key: &ConnectionKey) -> Result<Vec<u8>> {
        let prompt = text_octets(&self.prompt(key));
        self.send_text(key, &prompt)
    }

    /// Receive datagrams until the socket fails, answering each to its sender
    ///
    /// # Errors
    ///
    /// Returns the first receive or send error; per-datagram protocol errors
    /// are logged and never end the loop
    pub async fn run<S: DatagramIo>(&mut self, socket: &mut S, recv_buffer_size: usize) -> Result<()> {
        let mut buf = vec![0u8; recv_buffer_size];

        loop {
            let (len, sender) = socket.recv_from(&mut buf).await?;
            debug!("Received {} bytes from {}", len, sender);

            let frames = self.process(&buf[..len]);
            self.send_all(socket, &frames, sender).await?;
        }
    }

    async fn send_all<S: DatagramIo>(&mut self, socket: &mut S, frames: &[Vec<u8>], target: SocketAddr) -> Result<()> {
        for frame in frames {
            socket.send_to(frame, target).await?;
            self.stats.frames_sent += 1;
        }
        Ok(())
    }
}
