pub mod init;
mod schema;

pub use schema::{Config, ExportConfig, SessionConfig, StoreConfig, DEFAULT_SESSION_TTL};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub const ENV_STORE_URL: &str = "PSIKOTES_STORE_URL";
pub const ENV_API_KEY: &str = "PSIKOTES_API_KEY";

/// Get the config directory path (~/.config/psikotes/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("psikotes"))
}

/// Get the default config file path (~/.config/psikotes/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file, then apply environment overrides.
///
/// When the file does not exist, `PSIKOTES_STORE_URL` alone is enough to
/// run with defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    load_config_with(path, |key| std::env::var(key).ok())
}

pub fn load_config_with<F>(path: Option<PathBuf>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        serde_saphyr::from_str::<Config>(&content).with_context(|| {
            format!("Failed to parse config: invalid YAML in {}", config_path.display())
        })?
    } else if let Some(url) = env(ENV_STORE_URL) {
        tracing::debug!(path = %config_path.display(), "no config file, using environment");
        Config::with_store_url(url)
    } else {
        anyhow::bail!(
            "Config file not found at {}. Run `psikotes init` or set {}",
            config_path.display(),
            ENV_STORE_URL
        );
    };

    apply_env_overrides(&mut config, env);
    Ok(config)
}

/// Environment variables win over the file.
pub fn apply_env_overrides<F>(config: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_STORE_URL).filter(|v| !v.trim().is_empty()) {
        config.store.url = url;
    }
    if let Some(key) = env(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.store.api_key = Some(key);
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let url = config.store.url.trim();
    if url.is_empty() {
        errors.push("store.url: must not be empty".to_string());
    } else {
        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(format!(
                "store.url: unsupported scheme '{}' (expected http or https)",
                parsed.scheme()
            )),
            Err(e) => errors.push(format!("store.url: invalid '{}' - {}", url, e)),
        }
    }

    if config.store.timeout_secs == Some(0) {
        errors.push("store.timeout_secs: must be greater than zero".to_string());
    }

    match config.session.ttl_duration() {
        Ok(ttl) if ttl.is_zero() => errors.push("session.ttl: must be greater than zero".to_string()),
        Ok(_) => {}
        Err(e) => errors.push(format!("session.ttl: {:#}", e)),
    }

    if let Some(dir) = &config.export.dir {
        if dir.exists() && !dir.is_dir() {
            errors.push(format!("export.dir: {} is not a directory", dir.display()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
