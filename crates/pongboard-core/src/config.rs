// Configuration loading and parsing (pongboard.toml).
//
// Lookup order: $PONGBOARD_CONFIG, ./config/pongboard.toml, then the platform
// config directory. When no file exists the built-in defaults are used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::DEFAULT_TTL;

pub const CONFIG_ENV_VAR: &str = "PONGBOARD_CONFIG";
const CONFIG_FILE_NAME: &str = "pongboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
}

/// Where the club's CSV exports are published.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL the CSV files are served under, without a trailing slash.
    pub base_url: String,
    /// Federation club number used in the export file names.
    pub club: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173/backend".into(),
            club: "08940073".into(),
        }
    }
}

impl SourceConfig {
    pub fn competitors_url(&self) -> String {
        self.file_url("competitors")
    }

    pub fn matches_url(&self) -> String {
        self.file_url("rencontres")
    }

    pub fn licenses_url(&self) -> String {
        self.file_url("licenses")
    }

    fn file_url(&self, stem: &str) -> String {
        format!(
            "{}/{}_{}.csv",
            self.base_url.trim_end_matches('/'),
            stem,
            self.club
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("pongboard/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Seconds between report runs; 0 runs once and exits.
    pub refresh_secs: u64,
    pub format: ReportFormat,
    /// Bypass the cache on every run.
    pub no_cache: bool,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate the config file at `path`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let config = parse_config(&text).map_err(|e| match e {
        ConfigError::ParseError { source, .. } => ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate config text. Missing sections and keys take defaults.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: PathBuf::new(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Locate and load the config file, falling back to defaults when none of
/// the candidate locations has one. An explicit `$PONGBOARD_CONFIG` that
/// points nowhere is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
        return load_config_from(Path::new(&explicit));
    }

    for candidate in candidate_paths() {
        if candidate.is_file() {
            return load_config_from(&candidate);
        }
        debug!("No config at {}", candidate.display());
    }

    info!("No config file found, using defaults");
    let config = Config::default();
    validate(&config)?;
    Ok(config)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config").join(CONFIG_FILE_NAME)];
    if let Some(dirs) = ProjectDirs::from("org", "pongboard", "pongboard") {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    paths
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.source.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "source.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    if config.source.club.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "source.club".into(),
            message: "must not be empty".into(),
        });
    }

    let positive: &[(&str, u64)] = &[
        ("http.timeout_secs", config.http.timeout_secs),
        ("cache.ttl_secs", config.cache.ttl_secs),
    ];
    for (field, value) in positive {
        if *value == 0 {
            return Err(ConfigError::ValidationError {
                field: field.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
