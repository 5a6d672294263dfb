//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$LORESHELL_CONFIG` (environment variable)
//! 2. `~/.config/loreshell/config.toml` (Linux/macOS)
//!    `%APPDATA%\loreshell\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::{DEFAULT_SEARCH_MAX_RESULTS, DEFAULT_SERIES_MAX_RESULTS};
use crate::thread::context::DEFAULT_MAX_QUOTE_LINES;
use crate::thread::ThreadOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    /// Which archive to talk to, and how.
    pub archive: ArchiveConfig,
    pub thread: ThreadConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Root URL of the public-inbox instance.
    pub base_url: String,
    /// Inbox name; required for archives other than lore.kernel.org.
    pub inbox: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Keep messages from CI robots.
    pub include_bots: bool,
    /// Trailing lines kept from each quote block.
    pub max_quote_lines: usize,
    /// Where patch diffs are written (default: `<tmp>/loreshell`).
    pub diff_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default hit count for `search` (1-100).
    pub max_results: usize,
    /// Default feed size for `series` (1-200).
    pub series_max_results: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lore.kernel.org".to_string(),
            inbox: None,
            timeout_secs: 20,
            user_agent: concat!("loreshell/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            include_bots: false,
            max_quote_lines: DEFAULT_MAX_QUOTE_LINES,
            diff_dir: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_SEARCH_MAX_RESULTS,
            series_max_results: DEFAULT_SERIES_MAX_RESULTS,
        }
    }
}

impl ThreadConfig {
    pub fn options(&self) -> ThreadOptions {
        ThreadOptions {
            include_bots: self.include_bots,
            max_quote_lines: self.max_quote_lines,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Write the configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(path)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("LORESHELL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("loreshell").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loreshell")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("loreshell.log")
}

/// Return the directory patch diffs are written to.
pub fn diff_dir(config: &Config) -> PathBuf {
    config
        .thread
        .diff_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("loreshell"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.archive.base_url, "https://lore.kernel.org");
        assert_eq!(cfg.archive.timeout_secs, 20);
        assert!(cfg.archive.user_agent.starts_with("loreshell/"));
        assert!(!cfg.thread.include_bots);
        assert_eq!(cfg.thread.max_quote_lines, 5);
        assert_eq!(cfg.search.max_results, 20);
        assert_eq!(cfg.search.series_max_results, 50);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.archive.inbox = Some("gcc-patches".into());
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.archive.inbox.as_deref(), Some("gcc-patches"));
        assert_eq!(parsed.search.max_results, cfg.search.max_results);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[archive]
base_url = "https://inbox.sourceware.org"
inbox = "libc-alpha"

[thread]
include_bots = true
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.archive.base_url, "https://inbox.sourceware.org");
        assert_eq!(cfg.archive.inbox.as_deref(), Some("libc-alpha"));
        assert!(cfg.thread.include_bots);
        // Other fields use defaults
        assert_eq!(cfg.archive.timeout_secs, 20);
        assert_eq!(cfg.thread.max_quote_lines, 5);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_thread_options_from_config() {
        let cfg: Config = toml::from_str("[thread]\nmax_quote_lines = 2\n").unwrap();
        let options = cfg.thread.options();
        assert_eq!(options.max_quote_lines, 2);
        assert!(!options.include_bots);
    }

    #[test]
    fn test_paths() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/var/cache/x"));
        cfg.thread.diff_dir = Some(PathBuf::from("/srv/diffs"));
        assert_eq!(log_file_path(&cfg), PathBuf::from("/var/cache/x/loreshell.log"));
        assert_eq!(diff_dir(&cfg), PathBuf::from("/srv/diffs"));
        assert!(diff_dir(&Config::default()).ends_with("loreshell"));
    }
}
