//! SOCKS4 listener
//!
//! Accepts client connections and runs each one as an independent session
//! task. A failing session is logged and never affects the accept loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::{handle_client, Dialer, ProxyConfig, ProxyError, Result, TcpDialer};

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// SOCKS4 proxy server
pub struct Socks4Server<D = TcpDialer> {
    listen_addr: SocketAddr,
    config: Arc<ProxyConfig>,
    dialer: Arc<D>,
    /// Handle for the listener task
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Socks4Server<TcpDialer> {
    /// Create a server that dials destinations over TCP
    pub fn new(listen_addr: SocketAddr, config: ProxyConfig) -> Self {
        Self::with_dialer(listen_addr, config, TcpDialer::new())
    }
}

impl<D: Dialer + 'static> Socks4Server<D> {
    /// Create a server with a custom upstream dialer
    pub fn with_dialer(listen_addr: SocketAddr, config: ProxyConfig, dialer: D) -> Self {
        Self {
            listen_addr,
            config: Arc::new(config),
            dialer: Arc::new(dialer),
            handle: None,
        }
    }

    /// Bind and start accepting connections.
    ///
    /// Returns immediately; the server runs in a background task.
    pub async fn start(&mut self) -> Result<()> {
        let listener = TcpListener::bind(self.listen_addr)
            .await
            .map_err(ProxyError::Bind)?;
        let actual_addr = listener.local_addr()?;
        info!("SOCKS4 proxy listening on {}", actual_addr);
        self.listen_addr = actual_addr;

        let config = self.config.clone();
        let dialer = self.dialer.clone();

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        info!("Accepted new connection: {}", peer_addr);
                        let config = config.clone();
                        let dialer = dialer.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, peer_addr, &*dialer, &config).await {
                                debug!("SOCKS4 connection from {} ended: {}", peer_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("SOCKS4 accept error: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }
        });

        self.handle = Some(handle);
        Ok(())
    }

    /// Stop accepting connections. Sessions already running finish on their own.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("SOCKS4 proxy stopped");
        }
    }

    /// Whether the accept loop is running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Get the listening address (the bound one once started)
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }
}

impl<D> Drop for Socks4Server<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
