//! Application configuration for InsolvencyCheck.
//!
//! User config lives at `~/.insolvencycheck/insolvencycheck.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{InsolvencyCheckError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "insolvencycheck.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".insolvencycheck";

// ---------------------------------------------------------------------------
// Config structs (matching insolvencycheck.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Corporate registry API settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Legal-notices site settings.
    #[serde(default)]
    pub gazette: GazetteConfig,

    /// Shared HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[registry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// API base URL.
    #[serde(default = "default_registry_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Filing-history page size. Only the first page is read.
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,

    /// How a search result is chosen from the name search.
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            api_key_env: default_api_key_env(),
            items_per_page: default_items_per_page(),
            match_policy: MatchPolicy::default(),
        }
    }
}

fn default_registry_url() -> String {
    "https://api.company-information.service.gov.uk".into()
}
fn default_api_key_env() -> String {
    "COMPANIES_HOUSE_API_KEY".into()
}
fn default_items_per_page() -> u32 {
    100
}

/// Which name-search result becomes the canonical identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Take the first search result as-is.
    #[default]
    First,
    /// Take the first result whose title equals the query (case-insensitive).
    Exact,
}

/// `[gazette]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteConfig {
    /// Site base URL; notice links are resolved against it.
    #[serde(default = "default_gazette_url")]
    pub base_url: String,

    /// Maximum number of notices taken from the result page.
    #[serde(default = "default_max_notices")]
    pub max_notices: usize,
}

impl Default for GazetteConfig {
    fn default() -> Self {
        Self {
            base_url: default_gazette_url(),
            max_notices: default_max_notices(),
        }
    }
}

fn default_gazette_url() -> String {
    "https://www.thegazette.co.uk".into()
}
fn default_max_notices() -> usize {
    5
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory generated reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Reporting-party identity block printed on the cover page, one entry per line.
    #[serde(default = "default_produced_by")]
    pub produced_by: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            produced_by: default_produced_by(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_produced_by() -> Vec<String> {
    vec![
        "Pali Ltd".into(),
        "2-4 Croxteth Avenue".into(),
        "Wallasey".into(),
        "CH44 5UL".into(),
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.insolvencycheck/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InsolvencyCheckError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.insolvencycheck/insolvencycheck.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
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
    let content = std::fs::read_to_string(path).map_err(|e| InsolvencyCheckError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        InsolvencyCheckError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InsolvencyCheckError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InsolvencyCheckError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InsolvencyCheckError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the registry API key from the configured env var.
pub fn api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.registry.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(InsolvencyCheckError::config(format!(
            "registry API key not found. Set the {var_name} environment variable.\n\
             Register for a key at https://developer.company-information.service.gov.uk"
        ))),
    }
}

/// Parse a configured base URL, naming the offending setting on failure.
pub fn parse_base_url(setting: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| InsolvencyCheckError::config(format!("invalid {setting} '{value}': {e}")))
}
