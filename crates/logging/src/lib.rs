//! SockCraft Logging
//!
//! Shared `tracing` subscriber setup for SockCraft binaries.
//!
//! `RUST_LOG` takes precedence when set. Otherwise the requested level
//! applies to SockCraft crates (every target starting with `sockcraft`),
//! while dependencies stay at `warn` or quieter.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{fmt as fmt_layer, prelude::*, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

pub type Result<T> = std::result::Result<T, LoggingError>;

/// Verbosity for the default filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn default_directive(&self) -> String {
        let others = (*self).min(Self::Warn);
        format!("{},sockcraft={}", others.as_str(), self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(LoggingError::UnknownLevel(s.to_string())),
        }
    }
}

fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.default_directive()))
}

/// Install the global subscriber, failing if one is already set
pub fn try_init(level: LogLevel) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt_layer::layer())
        .with(filter_for(level))
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;
    tracing::debug!("Logging initialized at {}", level);
    Ok(())
}

/// Install the global subscriber, ignoring an existing one
pub fn init(level: LogLevel) {
    let _ = try_init(level);
}
