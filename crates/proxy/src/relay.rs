//! Bidirectional relay
//!
//! Each connection gets a reader task that pushes chunks into its own
//! bounded channel. A single loop drains both channels and writes every
//! chunk in full to the opposite connection. The first EOF, read error, or
//! write error ends the loop, and the loop alone tears both connections
//! down, so each is closed exactly once whichever side failed first.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::{Side, TransferError};

/// What a reader task observed
enum ReadEvent {
    Data(Bytes),
    Closed,
    Failed(std::io::Error),
}

/// How a relay ended
#[derive(Debug)]
pub struct RelayOutcome {
    /// Bytes written to the upstream connection
    pub bytes_to_upstream: u64,
    /// Bytes written to the client connection
    pub bytes_to_client: u64,
    /// Side whose read or write ended the session
    pub closed_by: Side,
    /// Failure that ended the session; `None` on a clean EOF
    pub error: Option<TransferError>,
}

/// Relay between `client` and `upstream` until either ends, then close both.
///
/// `buffer_size` bounds every read. Chunks are forwarded in read order per
/// direction; a reader cannot get more than one chunk ahead of the writer.
pub async fn relay<C, U>(client: C, upstream: U, buffer_size: usize) -> RelayOutcome
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    U: AsyncRead + AsyncWrite + Send + 'static,
{
    let buffer_size = buffer_size.max(1);

    let (client_r, mut client_w) = tokio::io::split(client);
    let (upstream_r, mut upstream_w) = tokio::io::split(upstream);

    let (client_tx, mut client_rx) = mpsc::channel(1);
    let (upstream_tx, mut upstream_rx) = mpsc::channel(1);

    let client_reader = spawn_reader(client_r, buffer_size, client_tx);
    let upstream_reader = spawn_reader(upstream_r, buffer_size, upstream_tx);

    let mut bytes_to_upstream = 0u64;
    let mut bytes_to_client = 0u64;

    let (closed_by, error) = loop {
        let (from, event) = tokio::select! {
            event = client_rx.recv() => (Side::Client, event),
            event = upstream_rx.recv() => (Side::Upstream, event),
        };

        let chunk = match event {
            Some(ReadEvent::Data(chunk)) => chunk,
            Some(ReadEvent::Closed) | None => {
                trace!("{} closed", from);
                break (from, None);
            }
            Some(ReadEvent::Failed(source)) => {
                break (from, Some(TransferError::Read { side: from, source }));
            }
        };

        let to = from.peer();
        let written = match to {
            Side::Upstream => forward(&mut upstream_w, &chunk).await,
            Side::Client => forward(&mut client_w, &chunk).await,
        };

        match written {
            Ok(()) => match to {
                Side::Upstream => bytes_to_upstream += chunk.len() as u64,
                Side::Client => bytes_to_client += chunk.len() as u64,
            },
            Err(source) => break (to, Some(TransferError::Write { side: to, source })),
        }
    };

    // Teardown: stop both readers, then shut down and drop both write halves.
    drop(client_rx);
    drop(upstream_rx);
    client_reader.abort();
    upstream_reader.abort();
    let _ = client_reader.await;
    let _ = upstream_reader.await;

    if let Err(e) = client_w.shutdown().await {
        trace!("client shutdown: {}", e);
    }
    if let Err(e) = upstream_w.shutdown().await {
        trace!("upstream shutdown: {}", e);
    }

    RelayOutcome {
        bytes_to_upstream,
        bytes_to_client,
        closed_by,
        error,
    }
}

fn spawn_reader<R>(mut reader: R, buffer_size: usize, tx: mpsc::Sender<ReadEvent>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; buffer_size];
        loop {
            let event = match reader.read(&mut buf).await {
                Ok(0) => ReadEvent::Closed,
                Ok(n) => ReadEvent::Data(Bytes::copy_from_slice(&buf[..n])),
                Err(e) => ReadEvent::Failed(e),
            };
            let terminal = !matches!(event, ReadEvent::Data(_));
            if tx.send(event).await.is_err() || terminal {
                break;
            }
        }
    })
}

async fn forward<W>(writer: &mut W, chunk: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(chunk).await?;
    writer.flush().await
}
