//! Application configuration for instructgen.
//!
//! User config lives at `~/.instructgen/instructgen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::cache::Ttl;
use crate::error::{InstructGenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "instructgen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".instructgen";

/// Default durable cache database file name.
const CACHE_DB_NAME: &str = "cache.db";

/// Catalog listing endpoint (awesome-copilot `instructions` directory).
pub const DEFAULT_CATALOG_URL: &str =
    "https://api.github.com/repos/github/awesome-copilot/contents/instructions";

/// File-name suffix identifying instruction templates.
pub const TEMPLATE_SUFFIX: &str = ".instructions.md";

/// Conventional name of the generated artifact.
pub const OUTPUT_FILE_NAME: &str = "copilot-instructions.md";

// ---------------------------------------------------------------------------
// Config structs (matching instructgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Durable cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Output artifact settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory listing endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Suffix a file name must carry to count as a template.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Minutes a cached listing stays valid.
    #[serde(default = "default_list_ttl_mins")]
    pub list_ttl_mins: u32,

    /// Transport-level request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the env var holding an optional API token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            suffix: default_suffix(),
            list_ttl_mins: default_list_ttl_mins(),
            timeout_secs: default_timeout_secs(),
            token_env: default_token_env(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_CATALOG_URL.into()
}
fn default_suffix() -> String {
    TEMPLATE_SUFFIX.into()
}
fn default_list_ttl_mins() -> u32 {
    30
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path to the durable cache database (defaults to `~/.instructgen/cache.db`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the generated file.
    #[serde(default = "default_output_file")]
    pub file_name: String,

    /// Directory the generated file is written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: default_output_file(),
            dir: default_output_dir(),
        }
    }
}

fn default_output_file() -> String {
    OUTPUT_FILE_NAME.into()
}
fn default_output_dir() -> String {
    ".".into()
}

// ---------------------------------------------------------------------------
// Catalog options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime catalog configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Directory listing endpoint.
    pub base_url: String,
    /// Template file-name suffix.
    pub suffix: String,
    /// Validity window of the persisted listing.
    pub list_ttl: Ttl,
    /// Transport-level request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional bearer token sent with catalog requests.
    pub token: Option<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CatalogOptions {
    fn from(config: &AppConfig) -> Self {
        let token = std::env::var(&config.catalog.token_env)
            .ok()
            .filter(|t| !t.is_empty());
        Self {
            base_url: config.catalog.base_url.clone(),
            suffix: config.catalog.suffix.clone(),
            list_ttl: Ttl::Within(TimeDelta::minutes(i64::from(config.catalog.list_ttl_mins))),
            timeout_secs: config.catalog.timeout_secs,
            token,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.instructgen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InstructGenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.instructgen/instructgen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve the durable cache database path, honouring `[cache] db_path`.
pub fn cache_db_path(config: &AppConfig) -> Result<PathBuf> {
    match &config.cache.db_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(config_dir()?.join(CACHE_DB_NAME)),
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InstructGenError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        InstructGenError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject configs the catalog client cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    url::Url::parse(&config.catalog.base_url).map_err(|e| {
        InstructGenError::config(format!(
            "invalid catalog base_url '{}': {e}",
            config.catalog.base_url
        ))
    })?;
    if config.catalog.suffix.is_empty() {
        return Err(InstructGenError::config("catalog suffix must not be empty"));
    }
    if config.output.file_name.trim().is_empty() {
        return Err(InstructGenError::config("output file_name must not be empty"));
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InstructGenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InstructGenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InstructGenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
