// src/config.rs

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_render_wait_ms")]
    pub render_wait_ms: u64,
    #[serde(default = "default_variant_window")]
    pub variant_window: usize,  // Variants tried per platform, in priority order
    #[serde(default)]
    pub deep_scan: bool,
    #[serde(default)]
    pub extended_variants: bool,
    #[serde(default = "default_use_browser")]
    pub use_browser: bool,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_delay_ms() -> u64 { 500 }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_render_wait_ms() -> u64 { 2000 }
fn default_variant_window() -> usize { 3 }
fn default_use_browser() -> bool { true }
fn default_results_dir() -> String { "results".to_string() }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            render_wait_ms: default_render_wait_ms(),
            variant_window: default_variant_window(),
            deep_scan: false,
            extended_variants: false,
            use_browser: default_use_browser(),
            results_dir: default_results_dir(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BreachConfig {
    #[serde(default = "default_breach_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_breach_api_url() -> String {
    "https://haveibeenpwned.com/api/v3".to_string()
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            api_url: default_breach_api_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub breach: BreachConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    /// Load `path` if given; otherwise load `default_path` when it exists,
    /// falling back to built-in defaults.
    pub fn load(path: Option<&Path>, default_path: &Path) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if default_path.exists() => Self::from_file(default_path),
            None => Ok(Self::default()),
        }
    }
}
