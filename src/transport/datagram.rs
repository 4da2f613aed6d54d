//! Trait abstraction for datagram socket operations to enable testing

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;

/// Trait for datagram I/O operations
#[async_trait]
pub trait DatagramIo: Send {
    /// Receive one datagram into `buf`
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    /// Send one datagram to `target`
    async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> io::Result<usize>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock datagram socket for testing
    ///
    /// Serves queued inbound datagrams in order, then fails with
    /// `ConnectionAborted` so a receive loop under test terminates.
    #[derive(Clone)]
    pub struct MockDatagramIo {
        pub inbound: Arc<Mutex<VecDeque<(Vec<u8>, SocketAddr)>>>,
        pub sent_data: Arc<Mutex<Vec<(Vec<u8>, SocketAddr)>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockDatagramIo {
        pub fn new() -> Self {
            Self {
                inbound: Arc::new(Mutex::new(VecDeque::new())),
                sent_data: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn push_inbound(&self, data: Vec<u8>, from: SocketAddr) {
            self.inbound.lock().unwrap().push_back((data, from));
        }

        pub fn get_sent_data(&self) -> Vec<(Vec<u8>, SocketAddr)> {
            self.sent_data.lock().unwrap().clone()
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl DatagramIo for MockDatagramIo {
        async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            let next = self.inbound.lock().unwrap().pop_front();
            match next {
                Some((data, from)) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok((len, from))
                }
                None => Err(io::Error::new(
                    io::ErrorKind::ConnectionAborted,
                    "Mock inbound queue exhausted",
                )),
            }
        }

        async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> io::Result<usize> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent_data.lock().unwrap().push((data.to_vec(), target));
            Ok(data.len())
        }
    }
}
