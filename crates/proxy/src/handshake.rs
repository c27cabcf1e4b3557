//! SOCKS4 CONNECT handshake
//!
//! Runs one session through:
//!
//! ```text
//! AwaitingRequest -> Decoding -> Connecting -> Established
//!                       |            |
//!                  DecodeFailed   Rejected
//! ```
//!
//! A reply is written only once the request has decoded: granted when the
//! dial succeeds, rejected when it fails. Unreadable or undecodable requests
//! get no reply.

use std::net::SocketAddrV4;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use sockcraft_core::{
    decode, decode_frame, ConnectRequest, DecodeError, HandshakeReply, REQUEST_HEADER_LEN,
};

use crate::{DialError, Dialer, HandshakeError, HANDSHAKE_BUFFER_SIZE};

/// A granted session, ready to relay
pub struct Established<U> {
    /// Connection to the requested destination
    pub upstream: U,
    /// The decoded request
    pub request: ConnectRequest,
    /// Client bytes that arrived behind the request in the same read
    pub early_data: Vec<u8>,
}

/// Perform the handshake on `client`, dialing through `dialer`.
///
/// On error the upstream (if one was opened) has already been dropped.
pub async fn handshake<C, D>(
    client: &mut C,
    dialer: &D,
    connect_timeout: Option<Duration>,
) -> std::result::Result<Established<D::Stream>, HandshakeError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    D: Dialer,
{
    let mut buffer = [0u8; HANDSHAKE_BUFFER_SIZE];
    let n = read_request(client, &mut buffer).await?;

    let (request, consumed) = decode_frame(&buffer[..n])?;
    let destination = request.destination();

    trace!(
        "SOCKS4 request {:?} (user-id {:?})",
        request,
        String::from_utf8_lossy(request.user_id())
    );
    debug!("SOCKS4 CONNECT to {}", destination);

    let upstream = match dial(dialer, destination, connect_timeout).await {
        Ok(upstream) => upstream,
        Err(e) => {
            if let Err(reply_err) = send_reply(client, HandshakeReply::rejected()).await {
                debug!("Failed to send rejection for {}: {}", destination, reply_err);
            }
            return Err(e.into());
        }
    };

    send_reply(client, HandshakeReply::granted())
        .await
        .map_err(HandshakeError::Reply)?;

    Ok(Established {
        upstream,
        request,
        early_data: buffer[consumed..n].to_vec(),
    })
}

/// Read the request into `buffer`, returning how many bytes were filled.
///
/// The header must arrive in the first read. A user-id that has started but
/// has no NUL yet is read to completion, so that none of it leaks into the
/// relayed stream. Running out of buffer or hitting EOF first is `Malformed`.
async fn read_request<C>(
    client: &mut C,
    buffer: &mut [u8; HANDSHAKE_BUFFER_SIZE],
) -> std::result::Result<usize, HandshakeError>
where
    C: AsyncRead + Unpin,
{
    let mut filled = client.read(&mut buffer[..]).await.map_err(HandshakeError::Read)?;
    if filled == 0 {
        return Err(HandshakeError::EmptyRequest);
    }

    // Reject a bad header before waiting on a user-id
    decode(&buffer[..filled.min(REQUEST_HEADER_LEN)])?;

    while filled > REQUEST_HEADER_LEN && !buffer[REQUEST_HEADER_LEN..filled].contains(&0x00) {
        if filled == buffer.len() {
            return Err(DecodeError::Malformed { len: filled }.into());
        }

        let n = client
            .read(&mut buffer[filled..])
            .await
            .map_err(HandshakeError::Read)?;
        if n == 0 {
            return Err(DecodeError::Malformed { len: filled }.into());
        }
        trace!("user-id continued with {} more bytes", n);
        filled += n;
    }

    Ok(filled)
}

async fn dial<D: Dialer>(
    dialer: &D,
    addr: SocketAddrV4,
    connect_timeout: Option<Duration>,
) -> std::result::Result<D::Stream, DialError> {
    let connect = dialer.dial(addr);

    let result = match connect_timeout {
        Some(timeout) => tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| DialError::Timeout { addr, timeout })?,
        None => connect.await,
    };

    result.map_err(|source| DialError::Io { addr, source })
}

async fn send_reply<C>(client: &mut C, reply: HandshakeReply) -> std::io::Result<()>
where
    C: AsyncWrite + Unpin,
{
    client.write_all(&reply.to_bytes()).await?;
    client.flush().await?;
    trace!(
        "sent {} reply",
        if reply.is_granted() { "granted" } else { "rejected" }
    );
    Ok(())
}
