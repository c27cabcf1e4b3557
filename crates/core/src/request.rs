//! CONNECT request decoding

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::{DecodeError, Result};

/// Protocol version carried in every SOCKS4 request
pub const SOCKS4_VERSION: u8 = 0x04;

/// Fixed-size prefix of a request: VN, CD, DSTPORT, DSTIP
pub const REQUEST_HEADER_LEN: usize = 8;

/// SOCKS4 command code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    /// Establish a TCP stream to the destination
    Connect = 0x01,
    /// Listen for an inbound connection (not supported)
    Bind = 0x02,
}

impl CommandKind {
    /// Wire code for this command
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a wire code to a known command
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Connect),
            0x02 => Some(Self::Bind),
            _ => None,
        }
    }
}

/// Decoded SOCKS4 CONNECT request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    version: u8,
    command: CommandKind,
    address: Ipv4Addr,
    port: u16,
    user_id: Vec<u8>,
}

impl ConnectRequest {
    /// Build a CONNECT request for `destination`
    pub fn new(destination: SocketAddrV4, user_id: impl Into<Vec<u8>>) -> Self {
        Self {
            version: SOCKS4_VERSION,
            command: CommandKind::Connect,
            address: *destination.ip(),
            port: destination.port(),
            user_id: user_id.into(),
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn command(&self) -> CommandKind {
        self.command
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Raw user-id bytes, without the NUL terminator
    pub fn user_id(&self) -> &[u8] {
        &self.user_id
    }

    /// Destination as a socket address, ready to dial
    pub fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.port)
    }

    /// Serialize to the client-side wire form, user-id NUL-terminated
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(REQUEST_HEADER_LEN + self.user_id.len() + 1);
        buf.push(self.version);
        buf.push(self.command.code());
        buf.extend_from_slice(&self.port.to_be_bytes());
        buf.extend_from_slice(&self.address.octets());
        buf.extend_from_slice(&self.user_id);
        buf.push(0x00);
        buf
    }
}

/// Decode a CONNECT request from the bytes a client sent.
///
/// Only the 8-byte header is required. Anything after it is taken as the
/// user-id up to the first NUL; a missing terminator is tolerated.
pub fn decode(bytes: &[u8]) -> Result<ConnectRequest> {
    decode_frame(bytes).map(|(request, _)| request)
}

/// Like [`decode`], also returning how many bytes the request occupied.
///
/// Bytes past the user-id terminator belong to the stream that follows the
/// handshake and must be forwarded, not dropped. Without a terminator the
/// whole input is consumed, so a caller reading from a socket must keep
/// reading until the NUL shows up before trusting the split.
pub fn decode_frame(bytes: &[u8]) -> Result<(ConnectRequest, usize)> {
    if bytes.len() < REQUEST_HEADER_LEN {
        return Err(DecodeError::Malformed { len: bytes.len() });
    }

    let version = bytes[0];
    if version != SOCKS4_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let command = match CommandKind::from_code(bytes[1]) {
        Some(CommandKind::Connect) => CommandKind::Connect,
        _ => return Err(DecodeError::UnsupportedCommand(bytes[1])),
    };

    let port = u16::from_be_bytes([bytes[2], bytes[3]]);
    let address = Ipv4Addr::new(bytes[4], bytes[5], bytes[6], bytes[7]);

    let tail = &bytes[REQUEST_HEADER_LEN..];
    let (user_id, consumed) = match tail.iter().position(|&b| b == 0x00) {
        Some(nul) => (tail[..nul].to_vec(), REQUEST_HEADER_LEN + nul + 1),
        None => (tail.to_vec(), bytes.len()),
    };

    let request = ConnectRequest {
        version,
        command,
        address,
        port,
        user_id,
    };

    Ok((request, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_REQUEST: [u8; 8] = [0x04, 0x01, 0x1F, 0x90, 0x7F, 0x00, 0x00, 0x01];

    #[test]
    fn test_decode_fixed_header() {
        let req = decode(&SCENARIO_REQUEST).unwrap();
        assert_eq!(req.version(), 4);
        assert_eq!(req.command(), CommandKind::Connect);
        assert_eq!(req.port(), 8080);
        assert_eq!(req.address(), Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(req.address().to_string(), "127.0.0.1");
        assert!(req.user_id().is_empty());
    }

    #[test]
    fn test_decode_port_is_big_endian() {
        let mut bytes = SCENARIO_REQUEST;
        bytes[2] = 0x01;
        bytes[3] = 0x02;
        assert_eq!(decode(&bytes).unwrap().port(), 0x0102);
    }

    #[test]
    fn test_decode_user_id() {
        let mut bytes = SCENARIO_REQUEST.to_vec();
        bytes.extend_from_slice(b"alice\0");
        let req = decode(&bytes).unwrap();
        assert_eq!(req.user_id(), b"alice");
    }

    #[test]
    fn test_decode_ignores_bytes_after_nul() {
        let mut bytes = SCENARIO_REQUEST.to_vec();
        bytes.extend_from_slice(b"bob\0GET / HTTP/1.0");
        let req = decode(&bytes).unwrap();
        assert_eq!(req.user_id(), b"bob");
    }

    #[test]
    fn test_decode_frame_reports_consumed_bytes() {
        let mut bytes = SCENARIO_REQUEST.to_vec();
        bytes.extend_from_slice(b"bob\0PING");
        let (req, consumed) = decode_frame(&bytes).unwrap();
        assert_eq!(req.user_id(), b"bob");
        assert_eq!(&bytes[consumed..], b"PING");

        let (_, consumed) = decode_frame(&SCENARIO_REQUEST).unwrap();
        assert_eq!(consumed, REQUEST_HEADER_LEN);
    }

    #[test]
    fn test_decode_unterminated_user_id() {
        let mut bytes = SCENARIO_REQUEST.to_vec();
        bytes.extend_from_slice(b"carol");
        let req = decode(&bytes).unwrap();
        assert_eq!(req.user_id(), b"carol");
    }

    #[test]
    fn test_decode_short_input_is_malformed() {
        for len in 0..REQUEST_HEADER_LEN {
            let err = decode(&SCENARIO_REQUEST[..len]).unwrap_err();
            assert_eq!(err, DecodeError::Malformed { len });
        }
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        for version in [0x00, 0x03, 0x05, 0xFF] {
            let mut bytes = SCENARIO_REQUEST;
            bytes[0] = version;
            assert_eq!(decode(&bytes).unwrap_err(), DecodeError::UnsupportedVersion(version));
        }
    }

    #[test]
    fn test_decode_version_checked_before_command() {
        let bytes = [0x05, 0x02, 0x00, 0x50, 0x0A, 0x00, 0x00, 0x01];
        assert_eq!(decode(&bytes).unwrap_err(), DecodeError::UnsupportedVersion(5));
    }

    #[test]
    fn test_decode_rejects_bind_and_unknown_commands() {
        for command in [0x00, 0x02, 0x03, 0x7F] {
            let mut bytes = SCENARIO_REQUEST;
            bytes[1] = command;
            assert_eq!(decode(&bytes).unwrap_err(), DecodeError::UnsupportedCommand(command));
        }
    }

    #[test]
    fn test_to_bytes_then_decode() {
        let destinations = [
            SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 8080),
            SocketAddrV4::new(Ipv4Addr::new(10, 1, 2, 3), 1),
            SocketAddrV4::new(Ipv4Addr::new(255, 255, 255, 255), u16::MAX),
            SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        ];

        for dst in destinations {
            let req = ConnectRequest::new(dst, b"user".to_vec());
            let decoded = decode(&req.to_bytes()).unwrap();
            assert_eq!(decoded, req);
            assert_eq!(decoded.destination(), dst);
        }
    }

    #[test]
    fn test_to_bytes_layout() {
        let req = ConnectRequest::new(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 8080), Vec::new());
        assert_eq!(req.to_bytes(), [0x04, 0x01, 0x1F, 0x90, 0x7F, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_command_codes() {
        assert_eq!(CommandKind::Connect.code(), 1);
        assert_eq!(CommandKind::Bind.code(), 2);
        assert_eq!(CommandKind::from_code(1), Some(CommandKind::Connect));
        assert_eq!(CommandKind::from_code(2), Some(CommandKind::Bind));
        assert_eq!(CommandKind::from_code(9), None);
    }
}
