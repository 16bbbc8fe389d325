use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Session lifetime when `session.ttl` is not set.
pub const DEFAULT_SESSION_TTL: &str = "12h";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// A config pointing at `url` with every other setting at its default.
    pub fn with_store_url(url: impl Into<String>) -> Self {
        Self {
            store: StoreConfig {
                url: url.into(),
                api_key: None,
                timeout_secs: None,
            },
            export: ExportConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Connection to the managed backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) key sent as the `apikey` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory for exported workbooks. Defaults to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl ExportConfig {
    pub fn dir_or_cwd(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// How long a login stays valid, in humantime form (`12h`, `1d`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl SessionConfig {
    pub fn ttl_duration(&self) -> Result<Duration> {
        let raw = self.ttl.as_deref().unwrap_or(DEFAULT_SESSION_TTL);
        humantime::parse_duration(raw)
            .with_context(|| format!("Invalid session ttl '{}'", raw))
    }
}
