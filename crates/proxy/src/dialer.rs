//! Upstream connector

use std::io;
use std::net::{SocketAddr, SocketAddrV4};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::warn;

/// Opens a duplex connection to a CONNECT destination.
///
/// The address is always a literal IPv4 socket address; implementations must
/// not resolve names.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    async fn dial(&self, addr: SocketAddrV4) -> io::Result<Self::Stream>;
}

/// Dials destinations over TCP
#[derive(Debug, Clone)]
pub struct TcpDialer {
    nodelay: bool,
}

impl TcpDialer {
    pub fn new() -> Self {
        Self { nodelay: true }
    }

    /// Set `TCP_NODELAY` on dialed sockets
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&self, addr: SocketAddrV4) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(SocketAddr::V4(addr)).await?;
        if let Err(e) = stream.set_nodelay(self.nodelay) {
            warn!("Failed to set TCP_NODELAY on upstream {}: {}", addr, e);
        }
        Ok(stream)
    }
}
