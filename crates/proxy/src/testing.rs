//! Dialers for unit tests

use std::io;
use std::net::SocketAddrV4;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{duplex, DuplexStream};

use crate::Dialer;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Hands out one end of an in-memory pipe; the test keeps the other end
pub struct PairDialer {
    stream: Mutex<Option<DuplexStream>>,
    dialed: Mutex<Vec<SocketAddrV4>>,
}

impl PairDialer {
    pub fn new() -> (Self, DuplexStream) {
        let (proxy_end, upstream_end) = duplex(PIPE_CAPACITY);
        let dialer = Self {
            stream: Mutex::new(Some(proxy_end)),
            dialed: Mutex::new(Vec::new()),
        };
        (dialer, upstream_end)
    }

    pub fn dialed(&self) -> Vec<SocketAddrV4> {
        self.dialed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialer for PairDialer {
    type Stream = DuplexStream;

    async fn dial(&self, addr: SocketAddrV4) -> io::Result<DuplexStream> {
        self.dialed.lock().unwrap().push(addr);
        self.stream
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::AddrInUse, "pair already dialed"))
    }
}

/// Always refuses
pub struct FailingDialer;

#[async_trait]
impl Dialer for FailingDialer {
    type Stream = DuplexStream;

    async fn dial(&self, _addr: SocketAddrV4) -> io::Result<DuplexStream> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
    }
}

/// Never completes
pub struct PendingDialer;

#[async_trait]
impl Dialer for PendingDialer {
    type Stream = DuplexStream;

    async fn dial(&self, _addr: SocketAddrV4) -> io::Result<DuplexStream> {
        std::future::pending().await
    }
}
