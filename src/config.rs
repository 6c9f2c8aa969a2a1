//! Configuration management for rawdha-notify
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer defaults, a `rawdha-notify.toml` file,
//! environment variables and command-line arguments.

use crate::cli::Cli;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rawdha-notify.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the inbound event server.
    pub server: ServerConfig,
    /// Configuration for the push messaging service.
    pub messaging: MessagingConfig,
    /// Document patterns each handler subscribes to.
    pub triggers: TriggersConfig,
    /// Configuration for the Prometheus exporter.
    pub metrics: MetricsConfig,
}

/// Configuration for the inbound event server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the event endpoint listens on.
    pub listen_address: SocketAddr,
}

/// Configuration for the push messaging service.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MessagingConfig {
    /// Base URL of the FCM HTTP v1 API.
    pub endpoint: String,
    /// The Firebase project that owns the topics.
    pub project_id: Option<String>,
    /// Fixed OAuth2 bearer token. When unset, tokens are minted from Google
    /// application default credentials and refreshed before they expire.
    pub access_token: Option<String>,
    /// Request timeout for a single send, in milliseconds.
    pub timeout_ms: u64,
    /// Log notifications instead of sending them.
    pub dry_run: bool,
}

impl MessagingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Document patterns each handler subscribes to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TriggersConfig {
    pub announcements: String,
    pub notifications: String,
}

/// Configuration for the Prometheus exporter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_address: SocketAddr,
}

impl Config {
    /// Loads the application configuration.
    ///
    /// Sources are merged in order: defaults, the TOML file, `RAWDHA_`
    /// environment variables (nested keys separated by `__`), then CLI flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // e.g. RAWDHA_MESSAGING__ACCESS_TOKEN=...
            .merge(Env::prefixed("RAWDHA_").split("__"))
            .merge(cli.clone())
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that cannot be expressed through types alone.
    pub fn validate(&self) -> Result<()> {
        if self.messaging.timeout_ms == 0 {
            bail!("messaging.timeout_ms must be greater than zero");
        }
        if self.messaging.endpoint.is_empty() {
            bail!("messaging.endpoint must not be empty");
        }
        if !self.messaging.dry_run
            && self.messaging.project_id.as_deref().unwrap_or("").is_empty()
        {
            bail!("messaging.project_id is required unless messaging.dry_run is set");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            messaging: MessagingConfig::default(),
            triggers: TriggersConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: ([0, 0, 0, 0], 8080).into(),
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://fcm.googleapis.com".to_string(),
            project_id: None,
            access_token: None,
            timeout_ms: 10_000,
            dry_run: false,
        }
    }
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            announcements: "announcements/{announcementId}".to_string(),
            notifications: "notifications/{notificationId}".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: ([0, 0, 0, 0], 9090).into(),
        }
    }
}
