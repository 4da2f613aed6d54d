//! # AX.25 Relay Library
//!
//! AX.25 link layer carried over UDP, with a line-oriented command shell.
//!
//! This library provides the frame codec, per-peer connection state, and a
//! dispatcher that answers SABM, I and DISC frames for one local station.

pub mod ax25;
pub mod config;
pub mod error;
pub mod link;
pub mod shell;
pub mod transport;
