mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Parse configuration from TOML text without touching the environment
pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./vidiform.toml", "~/.config/vidiform/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(TMDB_API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.tmdb.api_key = key;
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.tmdb.timeout_secs == 0 {
        anyhow::bail!("TMDB timeout cannot be 0");
    }

    if config.tmdb.base_url.trim().is_empty() {
        anyhow::bail!("TMDB base URL cannot be empty");
    }

    if config.import.concurrency == 0 {
        anyhow::bail!("Import concurrency must be at least 1");
    }

    if config.import.ffprobe_path.as_os_str().is_empty() {
        anyhow::bail!("ffprobe path cannot be empty");
    }

    if !config.tmdb.has_api_key() {
        tracing::debug!("No TMDB API key configured; enrichment is disabled");
    }

    Ok(())
}
