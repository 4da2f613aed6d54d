//! # Connection Table
//!
//! Per-peer link state, keyed by the remote station's callsign and SSID.
//!
//! Entries are created on demand and removed explicitly on disconnect. There
//! is no expiry, so a table that sees many one-off peers grows for the life
//! of the process.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::ax25::control::next_sequence;
use crate::ax25::protocol::{Address, FrameType, Pid};

/// Identifies a connection by the remote station
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub callsign: String,
    pub ssid: u8,
}

impl ConnectionKey {
    pub fn new(callsign: impl Into<String>, ssid: u8) -> Self {
        Self {
            callsign: callsign.into(),
            ssid,
        }
    }
}

impl From<&Address> for ConnectionKey {
    fn from(address: &Address) -> Self {
        Self::new(address.callsign.clone(), address.ssid)
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.callsign, self.ssid)
    }
}

/// Session state of a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkState {
    /// No SABM handled yet
    #[default]
    Unknown,

    /// SABM acknowledged, I frames accepted
    Established,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Unknown => f.write_str("UNKNOWN"),
            LinkState::Established => f.write_str("ESTABLISHED"),
        }
    }
}

/// Protocol and session state of one peer
#[derive(Debug, Clone, Default)]
pub struct Connection {
    /// Source of the last inbound frame (the peer)
    pub source: Option<Address>,

    /// Destination of the last inbound frame (the local station)
    pub destination: Option<Address>,

    /// Repeater path of the last inbound frame
    pub digipeaters: Vec<Address>,

    /// Next send sequence number V(S)
    pub tx_seq: u8,

    /// Next expected receive sequence number V(R)
    pub rx_seq: u8,

    pub state: LinkState,

    /// Most recent raw frame received
    pub last_rx_frame: Vec<u8>,

    /// Most recent raw frame built for sending
    pub last_tx_frame: Vec<u8>,

    /// Info field of the last I frame, CR/LF removed
    pub last_info_text: String,

    pub last_pid: Option<Pid>,

    pub last_frame_type: Option<FrameType>,
}

impl Connection {
    /// Advance V(S) after an I frame, wrapping 7 to 0
    pub fn advance_tx_seq(&mut self) {
        self.tx_seq = next_sequence(self.tx_seq);
    }

    pub fn is_established(&self) -> bool {
        self.state == LinkState::Established
    }
}

/// Registry of connections owned by the link dispatcher
#[derive(Debug, Default)]
pub struct ConnectionTable {
    connections: HashMap<ConnectionKey, Connection>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `key`, inserting a fresh one with both sequence numbers at zero
    pub fn get_or_create(&mut self, key: &ConnectionKey) -> &mut Connection {
        self.connections.entry(key.clone()).or_insert_with(|| {
            debug!("Creating connection entry for {}", key);
            Connection::default()
        })
    }

    pub fn get(&self, key: &ConnectionKey) -> Option<&Connection> {
        self.connections.get(key)
    }

    /// Delete the entry; later access to `key` starts from a fresh connection
    pub fn remove(&mut self, key: &ConnectionKey) -> Option<Connection> {
        let removed = self.connections.remove(key);
        if removed.is_some() {
            debug!("Removed connection entry for {}", key);
        }
        removed
    }

    pub fn contains(&self, key: &ConnectionKey) -> bool {
        self.connections.contains_key(key)
    }

    /// Current state, `Unknown` when no entry exists
    pub fn state(&self, key: &ConnectionKey) -> LinkState {
        self.connections
            .get(key)
            .map(|conn| conn.state)
            .unwrap_or_default()
    }

    /// Set the state of `key` (creating the entry if needed) and return it
    pub fn set_state(&mut self, key: &ConnectionKey, state: LinkState) -> LinkState {
        let conn = self.get_or_create(key);
        conn.state = state;
        conn.state
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_starts_at_zero() {
        let mut table = ConnectionTable::new();
        let key = ConnectionKey::new("N0CALL", 5);

        let conn = table.get_or_create(&key);
        assert_eq!(conn.tx_seq, 0);
        assert_eq!(conn.rx_seq, 0);
        assert_eq!(conn.state, LinkState::Unknown);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_or_create_returns_existing() {
        let mut table = ConnectionTable::new();
        let key = ConnectionKey::new("N0CALL", 5);

        table.get_or_create(&key).tx_seq = 4;
        assert_eq!(table.get_or_create(&key).tx_seq, 4);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_then_recreate_is_fresh() {
        let mut table = ConnectionTable::new();
        let key = ConnectionKey::new("N0CALL", 5);

        table.get_or_create(&key).tx_seq = 6;
        table.set_state(&key, LinkState::Established);
        assert!(table.remove(&key).is_some());
        assert!(!table.contains(&key));
        assert!(table.remove(&key).is_none());

        let conn = table.get_or_create(&key);
        assert_eq!(conn.tx_seq, 0);
        assert_eq!(conn.state, LinkState::Unknown);
    }

    #[test]
    fn test_state_defaults_to_unknown() {
        let mut table = ConnectionTable::new();
        let key = ConnectionKey::new("N0CALL", 5);

        assert_eq!(table.state(&key), LinkState::Unknown);
        assert_eq!(table.state(&key).to_string(), "UNKNOWN");
        assert!(table.is_empty(), "state lookup must not insert");

        assert_eq!(table.set_state(&key, LinkState::Established), LinkState::Established);
        assert_eq!(table.state(&key).to_string(), "ESTABLISHED");
    }

    #[test]
    fn test_keys_use_exact_match() {
        let mut table = ConnectionTable::new();
        table.get_or_create(&ConnectionKey::new("N0CALL", 5));

        assert!(!table.contains(&ConnectionKey::new("N0CALL", 0)));
        assert!(!table.contains(&ConnectionKey::new("N0CAL", 5)));
        assert!(table.contains(&ConnectionKey::new("N0CALL", 5)));
    }

    #[test]
    fn test_advance_tx_seq_wraps() {
        let mut conn = Connection::default();
        for expected in [1, 2, 3, 4, 5, 6, 7, 0] {
            conn.advance_tx_seq();
            assert_eq!(conn.tx_seq, expected);
        }
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ConnectionKey::new("N0CALL", 5).to_string(), "N0CALL-5");
        let key = ConnectionKey::from(&Address::new("MYCALL", 1));
        assert_eq!(key, ConnectionKey::new("MYCALL", 1));
    }
}
