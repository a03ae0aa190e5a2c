//! Client configuration.
//!
//! Layered, lowest priority first: built-in defaults, the JSON file at
//! `<config dir>/encrypty/config.json`, then environment variables:
//! - `ENCRYPTY_URL` - processor endpoint (default: `http://127.0.0.1:5057/process`)
//! - `ENCRYPTY_PAGE_SIZE` - children per directory page when walking local folders
//!
//! Command-line flags override all of these.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::models::Action;
use crate::submit::DEFAULT_ENDPOINT;

const APP_NAME: &str = "encrypty";
const CONFIG_FILE: &str = "config.json";

/// Matches the batch size browsers use for directory reads.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL the manifest is posted to.
    pub endpoint: String,
    /// Children per directory page when walking local folders.
    pub page_size: usize,
    /// Action used when none is given on the command line.
    pub action: Action,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            action: Action::default(),
        }
    }
}

impl ClientConfig {
    /// Load from the user's config directory and the environment.
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Overlay environment variables, looked up through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("ENCRYPTY_URL").filter(|s| !s.is_empty()) {
            self.endpoint = url;
        }
        if let Some(raw) = lookup("ENCRYPTY_PAGE_SIZE") {
            match raw.parse::<usize>() {
                Ok(size) if size > 0 => self.page_size = size,
                _ => tracing::warn!(value = %raw, "Ignoring invalid ENCRYPTY_PAGE_SIZE"),
            }
        }
        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
