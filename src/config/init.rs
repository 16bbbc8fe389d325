use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{
    get_config_path, validate_config, Config, ExportConfig, SessionConfig, StoreConfig,
    DEFAULT_SESSION_TTL,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    Ok(parse_yes_no(&input, default_yes))
}

fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        default_yes
    } else {
        matches!(input.as_str(), "y" | "yes" | "ya")
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Psikotes Configuration");
    println!("======================");
    println!();
    println!("Test records are kept in a hosted database. Enter the project URL");
    println!("and its public API key (both shown in the project's API settings).");
    println!();

    let url = loop {
        let input = prompt("Store URL (e.g. https://xyz.supabase.co): ")?;
        let candidate = Config::with_store_url(input.clone());
        match validate_config(&candidate) {
            Ok(()) => break input,
            Err(errors) => {
                for error in errors {
                    println!("  Invalid: {}", error);
                }
            }
        }
    };

    let api_key = rpassword::prompt_password("Public API key (input hidden, blank to skip): ")
        .context("Failed to read API key")?;
    let api_key = Some(api_key.trim().to_string()).filter(|k| !k.is_empty());

    println!();
    let timeout_secs: u64 = loop {
        let input = prompt_with_default("Request timeout in seconds", "30")?;
        match input.parse::<u64>() {
            Ok(v) if v > 0 => break v,
            _ => println!("  Invalid: must be a positive whole number. Try again."),
        }
    };

    let ttl = loop {
        let input = prompt_with_default("Stay logged in for", DEFAULT_SESSION_TTL)?;
        match humantime::parse_duration(&input) {
            Ok(d) if !d.is_zero() => break input,
            Ok(_) => println!("  Invalid: must be longer than zero. Try again."),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    let export_dir = prompt_with_default("Directory for exported spreadsheets", ".")?;

    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let config = Config {
        store: StoreConfig {
            url,
            api_key,
            timeout_secs: Some(timeout_secs),
        },
        export: ExportConfig {
            dir: Some(PathBuf::from(export_dir)).filter(|d| d.as_os_str() != "."),
        },
        session: SessionConfig {
            ttl: Some(ttl).filter(|t| t != DEFAULT_SESSION_TTL),
        },
    };

    write_config(&config, &config_path)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `psikotes login` to start a session.");

    Ok(())
}

/// Serialize `config` as YAML, creating parent directories as needed.
pub fn write_config(config: &Config, path: &std::path::Path) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, &yaml)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("", true));
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("Y", false));
        assert!(parse_yes_no("ya", false));
        assert!(!parse_yes_no("nope", true));
    }

    #[test]
    fn test_written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::with_store_url("https://abc.supabase.co");
        config.store.api_key = Some("anon".to_string());
        config.session.ttl = Some("1d".to_string());

        write_config(&config, &path).unwrap();
        let loaded = crate::config::load_config_with(Some(path), |_| None).unwrap();
        assert_eq!(loaded, config);
    }
}
