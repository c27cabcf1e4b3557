//! Configuration types

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use sockcraft_proxy::{ProxyConfig, TcpDialer};

use crate::{default_settings_path, Result, SettingsError};

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Proxy settings
    #[serde(default)]
    pub proxy: ProxySettings,

    /// Logging settings
    #[serde(default)]
    pub log: LogSettings,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the default path, or create defaults
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.to_path_buf());
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.to_path_buf());
            Ok(settings)
        }
    }

    /// File these settings were loaded from, and where [`Settings::save`] writes
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Save settings to the configured path
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Proxy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Interface to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream connect timeout in seconds (`null` to wait for the OS)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: Option<u64>,

    /// Bytes read per relay chunk
    #[serde(default = "default_relay_buffer_size")]
    pub relay_buffer_size: usize,

    /// Set `TCP_NODELAY` on upstream connections
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_connect_timeout() -> Option<u64> {
    Some(sockcraft_proxy::DEFAULT_CONNECT_TIMEOUT.as_secs())
}

fn default_relay_buffer_size() -> usize {
    sockcraft_proxy::DEFAULT_RELAY_BUFFER_SIZE
}

fn default_nodelay() -> bool {
    true
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            relay_buffer_size: default_relay_buffer_size(),
            nodelay: default_nodelay(),
        }
    }
}

impl ProxySettings {
    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .map_err(|_| SettingsError::InvalidListenAddr(self.listen_addr.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Per-session configuration for the proxy
    pub fn to_proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            relay_buffer_size: self.relay_buffer_size,
        }
    }

    /// Dialer for upstream connections
    pub fn dialer(&self) -> TcpDialer {
        TcpDialer::new().nodelay(self.nodelay)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default level when `RUST_LOG` is unset (error/warn/info/debug/trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("sockcraft-settings-{}-{}", name, std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.proxy.listen_addr, "0.0.0.0");
        assert_eq!(settings.proxy.port, 8080);
        assert_eq!(settings.proxy.connect_timeout_secs, Some(10));
        assert_eq!(settings.proxy.relay_buffer_size, 512);
        assert!(settings.proxy.nodelay);
        assert_eq!(settings.log.level, "info");
        assert!(settings.config_path().is_none());
    }

    #[test]
    fn test_socket_addr() {
        let proxy = ProxySettings {
            listen_addr: "127.0.0.1".to_string(),
            port: 1080,
            ..Default::default()
        };
        assert_eq!(proxy.socket_addr().unwrap(), "127.0.0.1:1080".parse().unwrap());

        let bad = ProxySettings {
            listen_addr: "localhost".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad.socket_addr(), Err(SettingsError::InvalidListenAddr(_))));
    }

    #[test]
    fn test_to_proxy_config() {
        let mut proxy = ProxySettings::default();
        let config = proxy.to_proxy_config();
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.relay_buffer_size, 512);

        proxy.connect_timeout_secs = None;
        assert_eq!(proxy.to_proxy_config().connect_timeout, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"proxy": {"port": 1080}}"#).unwrap();
        assert_eq!(settings.proxy.port, 1080);
        assert_eq!(settings.proxy.listen_addr, "0.0.0.0");
        assert_eq!(settings.proxy.connect_timeout_secs, Some(10));
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_nodelay_can_be_turned_off() {
        let settings: Settings = serde_json::from_str(r#"{"proxy": {"nodelay": false}}"#).unwrap();
        assert!(!settings.proxy.nodelay);
        assert_eq!(settings.proxy.port, 8080);
    }

    #[test]
    fn test_null_timeout_disables_deadline() {
        let settings: Settings =
            serde_json::from_str(r#"{"proxy": {"connect_timeout_secs": null}}"#).unwrap();
        assert_eq!(settings.proxy.connect_timeout_secs, None);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = temp_settings_path("missing");
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.proxy.port, 8080);
        assert_eq!(settings.config_path(), Some(path.as_path()));
    }

    #[test]
    fn test_save_writes_back_to_loaded_path() {
        let path = temp_settings_path("save-back");
        let mut settings = Settings::load_from(&path).unwrap();
        settings.proxy.nodelay = false;
        settings.save().unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert!(!loaded.proxy.nodelay);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_settings_path("save");
        let mut settings = Settings::default();
        settings.proxy.port = 9050;
        settings.log.level = "debug".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.proxy.port, 9050);
        assert_eq!(loaded.log.level, "debug");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_settings_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Settings::load_from(&path), Err(SettingsError::ParseError(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
