//! Settings and configuration utilities.
//!
//! This module reads settings from $HOME/.git-squash/settings.json and uses
//! them as a fallback for environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Environment variable holding the default number of commits to list.
pub const COUNT_ENV_VAR: &str = "GIT_SQUASH_COUNT";

/// Number of commits listed when nothing else is configured.
pub const DEFAULT_COMMIT_COUNT: usize = 10;

/// Settings loaded from $HOME/.git-squash/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".git-squash").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }

    /// Returns the configured number of commits to list.
    pub fn commit_count(&self) -> Result<usize> {
        match self.get_env_var(COUNT_ENV_VAR) {
            Some(value) => parse_count(&value)
                .with_context(|| format!("Invalid {COUNT_ENV_VAR} value: {value:?}")),
            None => Ok(DEFAULT_COMMIT_COUNT),
        }
    }
}

fn parse_count(value: &str) -> Result<usize> {
    let count: usize = value.trim().parse().context("not a number")?;
    if count == 0 {
        bail!("must be a positive integer");
    }
    Ok(count)
}
