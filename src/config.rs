//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use crate::ax25::protocol::{CALLSIGN_LEN, MAX_PACKET_LEN};
use crate::error::{Ax25Error, Result};
use crate::link::pipeline::ChecksumPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub link: LinkConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// AX.25 link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Local station callsign
    pub callsign: String,

    #[serde(default)]
    pub ssid: u8,

    /// Greeting sent after the welcome line on connect
    #[serde(default)]
    pub banner: Option<String>,

    #[serde(default)]
    pub checksum: ChecksumPolicy,

    #[serde(default = "default_recv_buffer_size")]
    pub recv_buffer_size: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files; console only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// Default value functions
fn default_bind_address() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 10090 }
fn default_recv_buffer_size() -> usize { 2048 }
fn default_log_level() -> String { "info".to_string() }

impl LinkConfig {
    /// Local UDP endpoint
    ///
    /// # Errors
    ///
    /// Returns error if `bind_address` is not an IP address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            Ax25Error::Config(toml::de::Error::custom(format!(
                "bind_address {:?} is not an IP address",
                self.bind_address
            )))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ax25_relay::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let link = &self.link;

        if link.callsign.is_empty() || link.callsign.len() > CALLSIGN_LEN {
            return Err(Ax25Error::Config(
                toml::de::Error::custom("callsign must be 1 to 6 characters")
            ));
        }

        if !link.callsign.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Ax25Error::Config(
                toml::de::Error::custom("callsign may contain only letters and digits")
            ));
        }

        if link.ssid > 15 {
            return Err(Ax25Error::Config(
                toml::de::Error::custom("ssid must be between 0 and 15")
            ));
        }

        if link.port == 0 {
            return Err(Ax25Error::Config(
                toml::de::Error::custom("port must be between 1 and 65535")
            ));
        }

        link.socket_addr()?;

        if link.recv_buffer_size < MAX_PACKET_LEN || link.recv_buffer_size > 65535 {
            return Err(Ax25Error::Config(
                toml::de::Error::custom(format!(
                    "recv_buffer_size must be between {} and 65535",
                    MAX_PACKET_LEN
                ))
            ));
        }

        if let Some(banner) = &link.banner {
            if !banner.is_ascii() {
                return Err(Ax25Error::Config(
                    toml::de::Error::custom("banner must be ASCII text")
                ));
            }
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(Ax25Error::Config(
                toml::de::Error::custom("logging level must be one of: trace, debug, info, warn, error")
            ));
        }

        if matches!(&self.logging.directory, Some(dir) if dir.is_empty()) {
            return Err(Ax25Error::Config(
                toml::de::Error::custom("logging directory cannot be empty when set")
            ));
        }

        Ok(())
    }
}
