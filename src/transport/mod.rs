//! # Datagram Transport Module
//!
//! Carries AX.25 frames in UDP datagrams, one frame per datagram.
//!
//! This module handles:
//! - Binding the local UDP endpoint
//! - Async receive/send of raw frames
//! - A trait seam so the dispatcher can run against a mock socket

pub mod datagram;

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, info};

pub use datagram::DatagramIo;

use crate::error::{Ax25Error, Result};

/// UDP endpoint of the AX.25 link
pub struct UdpLink {
    /// Bound socket
    socket: UdpSocket,
    /// Address actually bound (resolves port 0)
    local_addr: SocketAddr,
}

impl std::fmt::Debug for UdpLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpLink")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

impl UdpLink {
    /// Bind the link endpoint
    ///
    /// # Arguments
    ///
    /// * `addr` - Local address and port (port 0 picks a free port)
    ///
    /// # Returns
    ///
    /// * `Result<UdpLink>` - Bound endpoint
    ///
    /// # Errors
    ///
    /// Returns `Bind` if the address is unavailable or already in use
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ax25_relay::transport::UdpLink;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let link = UdpLink::bind("127.0.0.1:10090".parse()?).await?;
    ///     println!("Listening on {}", link.local_addr());
    ///     Ok(())
    /// }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        debug!("Binding UDP socket on {}", addr);

        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| Ax25Error::Bind { addr, source })?;
        let local_addr = socket.local_addr()?;

        info!("AX.25 link listening on {}", local_addr);
        Ok(Self { socket, local_addr })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl DatagramIo for UdpLink {
    async fn recv_from(&mut self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }

    async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> std::io::Result<usize> {
        let sent = self.socket.send_to(data, target).await?;
        debug!("Sent frame ({} bytes) to {}", sent, target);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn test_bind_resolves_port() {
        let link = UdpLink::bind(loopback()).await.unwrap();
        assert_ne!(link.local_addr().port(), 0);
        assert!(format!("{:?}", link).contains("UdpLink"));
    }

    #[tokio::test]
    async fn test_bind_in_use_returns_error() {
        let first = UdpLink::bind(loopback()).await.unwrap();
        let result = UdpLink::bind(first.local_addr()).await;

        match result {
            Err(Ax25Error::Bind { addr, .. }) => assert_eq!(addr, first.local_addr()),
            other => panic!("Expected Bind error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_datagram_exchange() {
        let mut a = UdpLink::bind(loopback()).await.unwrap();
        let mut b = UdpLink::bind(loopback()).await.unwrap();

        let sent = a.send_to(b"\x9c\x94\x6e", b.local_addr()).await;
        tokio_test::assert_ok!(sent);

        let mut buf = [0u8; 64];
        let (len, from) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"\x9c\x94\x6e");
        assert_eq!(from, a.local_addr());
    }
}
