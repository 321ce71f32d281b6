use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use vidiform_common::ExportFormat;

/// Environment variable that overrides `tmdb.api_key`.
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// API key for TMDB. Leave empty and set `TMDB_API_KEY` instead to keep
    /// the key out of config files.
    #[serde(default)]
    pub api_key: String,

    /// ISO-639-1 language tag sent with every request
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Upper bound for a single enrichment lookup, in seconds
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

impl TmdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_lookup_timeout() -> u64 {
    10
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_tmdb_base_url(),
            timeout_secs: default_lookup_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Number of files extracted concurrently. Files are still appended in
    /// input order.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
}

fn default_concurrency() -> usize {
    1
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            ffprobe_path: default_ffprobe_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_format")]
    pub default_format: ExportFormat,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_format() -> ExportFormat {
    ExportFormat::Json
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: default_format(),
        }
    }
}
