use thiserror::Error;

/// Errors raised while decoding a client's CONNECT request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed request of {len} bytes")]
    Malformed { len: usize },

    #[error("Only SOCKS4 supported, client sent version {0}")]
    UnsupportedVersion(u8),

    #[error("Only CONNECT (1) supported, client sent command {0}")]
    UnsupportedCommand(u8),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
