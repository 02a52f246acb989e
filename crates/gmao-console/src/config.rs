//! Console configuration loading.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::ConsoleError;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:9001";
pub const DEFAULT_POLL_MS: u64 = 50;
pub const DEFAULT_RECONNECT_BASE_MS: u64 = 500;
pub const DEFAULT_RECONNECT_CAP_MS: u64 = 30_000;
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 10;

/// Validated console settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub server_url: SmolStr,
    pub poll_interval: Duration,
    pub log_level: SmolStr,
    pub log_file: Option<PathBuf>,
    pub reconnect: ReconnectPolicy,
}

/// Exponential backoff schedule for reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub cap_delay: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (zero-based), without jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(20);
        let base_ms = self.base_delay.as_millis() as u64;
        let cap_ms = self.cap_delay.as_millis() as u64;
        Duration::from_millis(base_ms.saturating_mul(factor).min(cap_ms))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(DEFAULT_RECONNECT_BASE_MS),
            cap_delay: Duration::from_millis(DEFAULT_RECONNECT_CAP_MS),
            max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server_url: SmolStr::new(DEFAULT_SERVER_URL),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            log_level: SmolStr::new("info"),
            log_file: None,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            ConsoleError::InvalidConfig(format!("{}: {err}", path.display()).into())
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConsoleError> {
        let raw: ConsoleToml = toml::from_str(text)
            .map_err(|err| ConsoleError::InvalidConfig(format!("console.toml: {err}").into()))?;
        raw.into_config()
    }

    /// Loads `path` when given, else `console.toml` from the working
    /// directory when present, else built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConsoleError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new("console.toml");
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConsoleToml {
    server: Option<ServerSection>,
    console: Option<ConsoleSection>,
    reconnect: Option<ReconnectSection>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConsoleSection {
    poll_ms: Option<u64>,
    log_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReconnectSection {
    base_ms: Option<u64>,
    cap_ms: Option<u64>,
    max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LogSection {
    level: Option<String>,
}

impl ConsoleToml {
    fn into_config(self) -> Result<ConsoleConfig, ConsoleError> {
        let defaults = ConsoleConfig::default();

        let url = self
            .server
            .and_then(|section| section.url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        if !url.starts_with("ws://") {
            return Err(ConsoleError::InvalidConfig(
                format!("server.url must start with ws:// (got '{url}')").into(),
            ));
        }

        let console_section = self.console.unwrap_or(ConsoleSection {
            poll_ms: None,
            log_file: None,
        });
        let poll_ms = console_section.poll_ms.unwrap_or(DEFAULT_POLL_MS);
        if poll_ms == 0 {
            return Err(ConsoleError::InvalidConfig(
                "console.poll_ms must be at least 1".into(),
            ));
        }

        let reconnect_section = self.reconnect.unwrap_or(ReconnectSection {
            base_ms: None,
            cap_ms: None,
            max_attempts: None,
        });
        let base_ms = reconnect_section
            .base_ms
            .unwrap_or(DEFAULT_RECONNECT_BASE_MS);
        let cap_ms = reconnect_section.cap_ms.unwrap_or(DEFAULT_RECONNECT_CAP_MS);
        let max_attempts = reconnect_section
            .max_attempts
            .unwrap_or(DEFAULT_RECONNECT_MAX_ATTEMPTS);
        if base_ms == 0 {
            return Err(ConsoleError::InvalidConfig(
                "reconnect.base_ms must be at least 1".into(),
            ));
        }
        if cap_ms < base_ms {
            return Err(ConsoleError::InvalidConfig(
                format!("reconnect.cap_ms ({cap_ms}) must be at least reconnect.base_ms ({base_ms})").into(),
            ));
        }
        if max_attempts == 0 {
            return Err(ConsoleError::InvalidConfig(
                "reconnect.max_attempts must be at least 1".into(),
            ));
        }

        let level = self
            .log
            .and_then(|section| section.level)
            .unwrap_or_else(|| defaults.log_level.to_string());
        if level.parse::<tracing::Level>().is_err() {
            return Err(ConsoleError::InvalidConfig(
                format!("invalid log.level '{level}'").into(),
            ));
        }

        Ok(ConsoleConfig {
            server_url: SmolStr::new(url),
            poll_interval: Duration::from_millis(poll_ms),
            log_level: SmolStr::new(level),
            log_file: console_section.log_file.map(PathBuf::from),
            reconnect: ReconnectPolicy {
                base_delay: Duration::from_millis(base_ms),
                cap_delay: Duration::from_millis(cap_ms),
                max_attempts,
            },
        })
    }
}
