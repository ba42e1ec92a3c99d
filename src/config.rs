//! Configuration file handling for stamps.
//!
//! The configuration file is stored at `$STAMPS_HOME/config.json` and contains the settings for the
//! suggestion service and, optionally, a replacement denomination catalog. Every field has a
//! default, so the program also works when the file has never been created.

use crate::model::{Catalog, Denomination};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

const APP_NAME: &str = "stamps";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_REGION: &str = "Hong Kong";
const DEFAULT_CURRENCY: &str = "HKD";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$STAMPS_HOME` and from there it loads `$STAMPS_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    catalog: Catalog,
}

impl Config {
    /// Creates the home directory, if needed, and writes a `config.json` with default settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the stamps home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file already exists at '{}'",
                config_path.display()
            )
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        Self::from_parts(root, config_path, config_file)
    }

    /// This will
    /// - validate that `stamps_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(stamps_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = stamps_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The stamps home directory is missing")?;
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Self::from_parts(root, config_path, config_file)
    }

    /// Loads the config file if it exists, otherwise uses the defaults without touching the
    /// filesystem. A config file that exists but is invalid is still an error.
    pub async fn load_or_default(stamps_home: impl Into<PathBuf>) -> Result<Self> {
        let root = stamps_home.into();
        if root.join(CONFIG_JSON).is_file() {
            return Self::load(root).await;
        }
        debug!(
            "No config file in '{}', using default settings",
            root.display()
        );
        let config_path = root.join(CONFIG_JSON);
        Self::from_parts(root, config_path, ConfigFile::default())
    }

    fn from_parts(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Result<Self> {
        let endpoint = Url::parse(&config_file.endpoint)
            .with_context(|| format!("Invalid endpoint URL '{}'", config_file.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("The endpoint URL must use http or https, got '{endpoint}'")
        }
        if config_file.model.trim().is_empty() {
            bail!("The model name must not be empty")
        }
        let catalog = match &config_file.denominations {
            Some(list) => Catalog::new(list.clone()).with_context(|| {
                format!("Invalid denominations in '{}'", config_path.display())
            })?,
            None => Catalog::default(),
        };
        Ok(Self {
            root,
            config_path,
            config_file,
            catalog,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> &str {
        &self.config_file.model
    }

    pub fn endpoint(&self) -> &str {
        &self.config_file.endpoint
    }

    /// The place whose postal rates the suggestion service is asked about.
    pub fn region(&self) -> &str {
        &self.config_file.region
    }

    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// An upper bound on a single suggestion request, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.config_file
            .request_timeout_secs
            .map(Duration::from_secs)
    }
}

impl Default for Config {
    /// Default settings rooted at the current directory. Nothing is read or written.
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            config_path: PathBuf::from(CONFIG_JSON),
            config_file: ConfigFile::default(),
            catalog: Catalog::default(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "stamps",
///   "config_version": 1,
///   "model": "gemini-3-flash-preview",
///   "endpoint": "https://generativelanguage.googleapis.com/",
///   "region": "Hong Kong",
///   "currency": "HKD",
///   "request_timeout_secs": 30,
///   "denominations": [
///     { "id": "d1", "value": 0.1, "label": "$0.1", "color": "slate-100" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "stamps"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The Gemini model used for suggestions
    #[serde(default = "default_model")]
    model: String,

    /// Base URL of the Gemini API
    #[serde(default = "default_endpoint")]
    endpoint: String,

    /// The place whose postage rates are asked about
    #[serde(default = "default_region")]
    region: String,

    /// The currency suggestions are priced in
    #[serde(default = "default_currency")]
    currency: String,

    /// Give up on a suggestion request after this many seconds. No limit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,

    /// Replaces the built-in denomination catalog when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    denominations: Option<Vec<Denomination>>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            model: default_model(),
            endpoint: default_endpoint(),
            region: default_region(),
            currency: default_currency(),
            request_timeout_secs: None,
            denominations: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
