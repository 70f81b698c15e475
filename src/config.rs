//! Configuration for the record store and the catalog.
//!
//! Settings are read from `storefront.toml` and may be overridden by
//! environment variables (file → environment).
//!
//! # Configuration File Format
//!
//! ```toml
//! [github]
//! api_base_url = "https://api.github.com"
//! owner = "learneverythingandtryit"
//! repo = "bumable-store"
//! user_agent = "bumable-store"
//! per_page = 100
//! token_env = "GITHUB_TOKEN"
//!
//! [catalog]
//! snapshot_dir = ".storefront"
//! snapshot_key = "bumable_products"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "storefront.toml";

const ENV_API_BASE_URL: &str = "STOREFRONT_GITHUB_API";
const ENV_OWNER: &str = "STOREFRONT_GITHUB_OWNER";
const ENV_REPO: &str = "STOREFRONT_GITHUB_REPO";
const ENV_SNAPSHOT_DIR: &str = "STOREFRONT_SNAPSHOT_DIR";

/// GitHub repository used as the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Page size for issue listings (GitHub caps this at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "learneverythingandtryit".to_string()
}

fn default_repo() -> String {
    "bumable-store".to_string()
}

fn default_user_agent() -> String {
    "bumable-store".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            owner: default_owner(),
            repo: default_repo(),
            user_agent: default_user_agent(),
            per_page: default_per_page(),
            token_env: default_token_env(),
        }
    }
}

/// Where the catalog snapshot lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(".storefront")
}

fn default_snapshot_key() -> String {
    crate::catalog::DEFAULT_SNAPSHOT_KEY.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            snapshot_key: default_snapshot_key(),
        }
    }
}

/// The complete storefront.toml configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl StoreConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse storefront.toml")
    }

    /// Load `storefront.toml` from `dir`, or defaults when it doesn't exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Full resolution for a project directory: `.env`, then the config
    /// file, then environment overrides.
    pub fn resolve(dir: &Path) -> Result<Self> {
        // A missing .env is normal.
        let _ = dotenvy::from_path(dir.join(".env"));

        let mut config = Self::load_or_default(dir)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize storefront.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Environment variables override file settings.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            self.github.api_base_url = url;
        }
        if let Ok(owner) = std::env::var(ENV_OWNER) {
            self.github.owner = owner;
        }
        if let Ok(repo) = std::env::var(ENV_REPO) {
            self.github.repo = repo;
        }
        if let Ok(dir) = std::env::var(ENV_SNAPSHOT_DIR) {
            self.catalog.snapshot_dir = PathBuf::from(dir);
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.github.owner.trim().is_empty() {
            warnings.push("github.owner is empty".to_string());
        }
        if self.github.repo.trim().is_empty() {
            warnings.push("github.repo is empty".to_string());
        }
        if !(1..=100).contains(&self.github.per_page) {
            warnings.push(format!(
                "github.per_page {} is outside 1..=100 and will be clamped",
                self.github.per_page
            ));
        }
        if self.catalog.snapshot_key.trim().is_empty() {
            warnings.push("catalog.snapshot_key is empty".to_string());
        }

        warnings
    }
}
