//! One client connection, from handshake to teardown

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{handshake, relay, Dialer, ProxyConfig, RelayOutcome, Result, Side, TransferError};

/// Handle one client connection to completion.
///
/// The session owns `client` and, once dialed, the upstream connection. Both
/// are closed by the time this returns, whatever the outcome.
pub async fn handle_client<C, D>(
    mut client: C,
    peer_addr: SocketAddr,
    dialer: &D,
    config: &ProxyConfig,
) -> Result<RelayOutcome>
where
    C: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    D: Dialer,
{
    let established = match handshake(&mut client, dialer, config.connect_timeout).await {
        Ok(established) => established,
        Err(e) => {
            warn!("SOCKS4 handshake from {} failed: {}", peer_addr, e);
            return Err(e.into());
        }
    };

    let destination = established.request.destination();
    let mut upstream = established.upstream;

    info!("Proxying: {} → {}", peer_addr, destination);

    if !established.early_data.is_empty() {
        if let Err(source) = upstream.write_all(&established.early_data).await {
            warn!("Forwarding early data to {} failed: {}", destination, source);
            return Err(TransferError::Write {
                side: Side::Upstream,
                source,
            }
            .into());
        }
    }

    let outcome = relay(client, upstream, config.relay_buffer_size).await;

    match &outcome.error {
        Some(e) => warn!("Session {} → {} ended: {}", peer_addr, destination, e),
        None => debug!(
            "Session {} → {} closed by {} ({} bytes up, {} bytes down)",
            peer_addr, destination, outcome.closed_by, outcome.bytes_to_upstream, outcome.bytes_to_client
        ),
    }

    Ok(outcome)
}
