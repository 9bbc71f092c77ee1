//! Configuration loading for rostermatch.
//! Reads rostermatch.toml from the current directory or the path in ROSTERMATCH_CONFIG.
//! Without a file the built-in defaults reproduce the stock run.

use rostermatch_ingestion::paper_set::DEFAULT_CATEGORIES;
use rostermatch_ingestion::sources::arxiv::{ARXIV_OAI_URL, DEFAULT_MAX_RETRY_AFTER};
use rostermatch_ingestion::sources::roster::{DEFAULT_MEMBER_SELECTOR, DEFAULT_ROSTER_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub arxiv: ArxivConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_roster_url")]
    pub url: String,
    #[serde(default = "default_member_selector")]
    pub selector: String,
    /// When set, names are read from this file instead of scraping `url`.
    pub names_file: Option<PathBuf>,
}

fn default_roster_url()      -> String { DEFAULT_ROSTER_URL.to_string() }
fn default_member_selector() -> String { DEFAULT_MEMBER_SELECTOR.to_string() }

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            url: default_roster_url(),
            selector: default_member_selector(),
            names_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    #[serde(default = "default_oai_url")]
    pub base_url: String,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_max_retry_after")]
    pub max_retry_after: u32,
}

fn default_oai_url()         -> String { ARXIV_OAI_URL.to_string() }
fn default_window_days()     -> u32    { 7 }
fn default_max_retry_after() -> u32    { DEFAULT_MAX_RETRY_AFTER }

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: default_oai_url(),
            categories: default_categories(),
            window_days: default_window_days(),
            max_retry_after: default_max_retry_after(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf { PathBuf::from("data") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}


impl Config {
    /// Load configuration from rostermatch.toml.
    /// Checks ROSTERMATCH_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("ROSTERMATCH_CONFIG") {
            // An explicitly named file must exist.
            Ok(path) => Self::load_from(&path),
            Err(_) if Path::new("rostermatch.toml").exists() => Self::load_from("rostermatch.toml"),
            Err(_) => {
                tracing::debug!("No rostermatch.toml found; using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy rostermatch.example.toml to rostermatch.toml and edit it.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.arxiv.categories.is_empty() {
            anyhow::bail!("arxiv.categories must name at least one category");
        }
        if self.roster.names_file.is_none() && self.roster.url.trim().is_empty() {
            anyhow::bail!("roster.url is empty and no roster.names_file is set");
        }
        Ok(())
    }
}
