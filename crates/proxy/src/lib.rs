//! SockCraft Proxy
//!
//! SOCKS4 CONNECT sessions: handshake, upstream dial, and bidirectional relay.
//!
//! ## Session lifecycle
//!
//! 1. Read the CONNECT request from the client
//! 2. Decode it (version 4, command CONNECT)
//! 3. Dial the destination through a [`Dialer`]
//! 4. Reply granted or rejected
//! 5. Relay bytes both ways until either side closes, then close both
//!
//! Every session owns its two connections. Failures end the session they
//! occur in and nothing else.

mod dialer;
mod error;
mod handshake;
mod relay;
mod server;
mod session;

#[cfg(test)]
mod testing;

pub use dialer::{Dialer, TcpDialer};
pub use error::{DialError, HandshakeError, ProxyError, Result, Side, TransferError};
pub use handshake::{handshake, Established};
pub use relay::{relay, RelayOutcome};
pub use server::Socks4Server;
pub use session::handle_client;

use std::time::Duration;

/// Read buffer for the CONNECT request (header plus a typical user-id)
pub const HANDSHAKE_BUFFER_SIZE: usize = 128;

/// Default per-read buffer for each relay direction
pub const DEFAULT_RELAY_BUFFER_SIZE: usize = 512;

/// Default deadline for dialing the destination
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-session proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Deadline for the upstream dial; `None` waits for the OS
    pub connect_timeout: Option<Duration>,
    /// Bytes read per relay chunk
    pub relay_buffer_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            relay_buffer_size: DEFAULT_RELAY_BUFFER_SIZE,
        }
    }
}
