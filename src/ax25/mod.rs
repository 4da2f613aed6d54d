//! # AX.25 Protocol Module
//!
//! Implementation of the AX.25 link-layer frame format.
//!
//! This module handles:
//! - Callsign/SSID address encoding and decoding
//! - Control field classification (I, S and U frames) and sequence numbers
//! - CRC-16/X.25 frame-check sequence
//! - Whole-frame decoding and encoding

pub mod protocol;
pub mod address;
pub mod control;
pub mod encoder;
pub mod decoder;
pub mod crc;
