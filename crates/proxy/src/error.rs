use std::fmt;
use std::io;
use std::net::SocketAddrV4;
use std::time::Duration;

use thiserror::Error;

use sockcraft_core::DecodeError;

/// One end of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Client,
    Upstream,
}

impl Side {
    /// The end bytes read on this side are written to
    pub fn peer(self) -> Side {
        match self {
            Side::Client => Side::Upstream,
            Side::Upstream => Side::Client,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Client => f.write_str("client"),
            Side::Upstream => f.write_str("upstream"),
        }
    }
}

/// Destination could not be reached
#[derive(Error, Debug)]
pub enum DialError {
    #[error("Dial {addr} failed: {source}")]
    Io {
        addr: SocketAddrV4,
        #[source]
        source: io::Error,
    },

    #[error("Dial {addr} timed out after {timeout:?}")]
    Timeout { addr: SocketAddrV4, timeout: Duration },
}

/// I/O failure while relaying; ends the session, never retried
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Read from {side} failed: {source}")]
    Read {
        side: Side,
        #[source]
        source: io::Error,
    },

    #[error("Write to {side} failed: {source}")]
    Write {
        side: Side,
        #[source]
        source: io::Error,
    },
}

/// Handshake ended without an established upstream
#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("Reading connect request failed: {0}")]
    Read(#[source] io::Error),

    #[error("Client closed before sending a connect request")]
    EmptyRequest,

    #[error("Invalid connect request: {0}")]
    Decode(#[from] DecodeError),

    #[error("Upstream connect failed: {0}")]
    Dial(#[from] DialError),

    #[error("Sending reply failed: {0}")]
    Reply(#[source] io::Error),
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Bind failed: {0}")]
    Bind(#[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
