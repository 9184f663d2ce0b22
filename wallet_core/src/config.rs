//! Wallet configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::WalletError;
use crate::settings::WalletSettings;

/// Configuration for the wallet services.
///
/// Can be loaded from a TOML file via [`WalletConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Base URL of the node REST API.
    #[serde(default = "default_node_host")]
    pub node_host: String,

    /// Base URL of the explorer REST API.
    #[serde(default = "default_explorer_api_host")]
    pub explorer_api_host: String,

    /// Whether every send must be confirmed by PIN / biometrics.
    #[serde(default = "default_true")]
    pub require_auth: bool,

    /// Total timeout of one HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Transactions fetched per explorer page.
    #[serde(default = "default_sync_page_limit")]
    pub sync_page_limit: u32,

    /// Period of the background address sync, in seconds.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_node_host() -> String {
    "http://127.0.0.1:22973".to_string()
}

fn default_explorer_api_host() -> String {
    "http://127.0.0.1:9090".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_sync_page_limit() -> u32 {
    20
}

fn default_sync_interval_secs() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            WalletError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Reject values the services cannot run with.
    pub fn validate(&self) -> Result<(), WalletError> {
        for (name, url) in [
            ("node_host", &self.node_host),
            ("explorer_api_host", &self.explorer_api_host),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(WalletError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if !matches!(self.log_format.to_ascii_lowercase().as_str(), "human" | "json") {
            return Err(WalletError::Config(format!(
                "log_format must be \"human\" or \"json\", got {:?}",
                self.log_format
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(WalletError::Config("request_timeout_secs must be non-zero".into()));
        }
        if self.sync_page_limit == 0 {
            return Err(WalletError::Config("sync_page_limit must be non-zero".into()));
        }
        if self.sync_interval_secs == 0 {
            return Err(WalletError::Config("sync_interval_secs must be non-zero".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// The settings the send path reads.
    pub fn settings(&self) -> WalletSettings {
        WalletSettings {
            require_auth: self.require_auth,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            node_host: default_node_host(),
            explorer_api_host: default_explorer_api_host(),
            require_auth: default_true(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            sync_page_limit: default_sync_page_limit(),
            sync_interval_secs: default_sync_interval_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
