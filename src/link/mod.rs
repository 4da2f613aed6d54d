//! # Link Layer Module
//!
//! Connection bookkeeping and frame dispatch on top of the AX.25 codec.
//!
//! This module handles:
//! - Per-peer connection state and sequence numbers
//! - Decoding into and building from the connection table
//! - Reacting to SABM, I and DISC frames
//! - Handing line input to a session handler

pub mod connection;
pub mod dispatcher;
pub mod handler;
pub mod pipeline;

pub use connection::{Connection, ConnectionKey, ConnectionTable, LinkState};
pub use dispatcher::{DispatcherStats, LinkDispatcher};
pub use handler::{SessionHandler, SessionReply};
pub use pipeline::{ChecksumPolicy, FramePipeline, KeySide};
