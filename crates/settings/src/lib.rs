//! SockCraft Settings
//!
//! Configuration for the SockCraft proxy binary.
//!
//! ## Features
//!
//! - Listen address and port
//! - Upstream connect timeout, relay buffer size and `TCP_NODELAY`
//! - Default log level
//! - JSON file storage under `~/.sockcraft`
//!
//! ## Usage
//!
//! ```no_run
//! use sockcraft_settings::Settings;
//!
//! let mut settings = Settings::load_or_default()?;
//! settings.proxy.port = 1080;
//! settings.save()?;
//! # Ok::<(), sockcraft_settings::SettingsError>(())
//! ```

mod config;

pub use config::{LogSettings, ProxySettings, Settings};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),

    #[error("Invalid listen address: {0}")]
    InvalidListenAddr(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Directory holding SockCraft configuration
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sockcraft")
}

/// Get the default settings file path
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}
