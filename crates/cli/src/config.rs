use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::output::Format;

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("progdep")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("progdep")
}

fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Defaults read from `config.toml`; command-line flags take precedence.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub outdir: Option<PathBuf>,
    /// Glob patterns added to the `--exclude` list.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse_config(&content)
    } else {
        Ok(Config::default())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).context("failed to parse config")
}
