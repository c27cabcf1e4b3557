//! SockCraft CLI
//!
//! Runs the SOCKS4 proxy until interrupted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sockcraft_logging::LogLevel;
use sockcraft_proxy::Socks4Server;
use sockcraft_settings::Settings;

/// SockCraft - SOCKS4 CONNECT proxy
#[derive(Parser, Debug)]
#[command(name = "sockcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on (overrides the settings file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to listen on (overrides the settings file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Upstream connect timeout in seconds, 0 to disable
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective settings back to the settings file and exit
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.proxy.port = port;
        }
        if let Some(listen) = &self.listen {
            settings.proxy.listen_addr = listen.clone();
        }
        if let Some(secs) = self.connect_timeout {
            settings.proxy.connect_timeout_secs = (secs > 0).then_some(secs);
        }
        if self.verbose {
            settings.log.level = LogLevel::Debug.to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load_or_default().context("loading default settings")?,
    };
    cli.apply(&mut settings);

    let level: LogLevel = settings
        .log
        .level
        .parse()
        .context("invalid log level in settings")?;
    sockcraft_logging::init(level);

    match settings.config_path() {
        Some(path) if path.exists() => info!("Loaded settings from {}", path.display()),
        Some(path) => info!("No settings file at {}, using defaults", path.display()),
        None => info!("Using default settings"),
    }

    if cli.save_config {
        settings.save().context("saving settings")?;
        return Ok(());
    }

    let listen_addr = settings.proxy.socket_addr()?;
    let mut server = Socks4Server::with_dialer(
        listen_addr,
        settings.proxy.to_proxy_config(),
        settings.proxy.dialer(),
    );
    server
        .start()
        .await
        .with_context(|| format!("unable to start listening on {}", listen_addr))?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Received shutdown signal");

    server.stop();
    Ok(())
}
