//! Handshake reply encoding

/// Length of every SOCKS4 reply
pub const REPLY_LEN: usize = 8;

/// Reply status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplyStatus {
    /// Request granted
    Granted = 0x5A,
    /// Request rejected or failed
    Rejected = 0x5B,
}

/// Reply sent to the client once the CONNECT attempt is decided.
///
/// DSTPORT and DSTIP are zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeReply {
    pub status: ReplyStatus,
}

impl HandshakeReply {
    pub fn granted() -> Self {
        Self { status: ReplyStatus::Granted }
    }

    pub fn rejected() -> Self {
        Self { status: ReplyStatus::Rejected }
    }

    pub fn is_granted(&self) -> bool {
        self.status == ReplyStatus::Granted
    }

    pub fn to_bytes(&self) -> [u8; REPLY_LEN] {
        [0x00, self.status as u8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    }
}

impl From<bool> for HandshakeReply {
    fn from(granted: bool) -> Self {
        if granted {
            Self::granted()
        } else {
            Self::rejected()
        }
    }
}

/// Encode the reply for a grant/reject decision
pub fn encode(granted: bool) -> [u8; REPLY_LEN] {
    HandshakeReply::from(granted).to_bytes()
}
