// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Sources, lowest precedence first: built-in defaults, the user config file,
//! `filamentdb.toml` in the working directory (or `--config`), then
//! `FILAMENTDB_*` environment variables.

use crate::loader::DEFAULT_PATTERNS;
use crate::types::CollectionSpec;
use anyhow::{Context, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "filamentdb.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "FILAMENTDB";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the catalog source tree
    pub source_dir: PathBuf,
    /// Directory the build writes `index.json` into
    pub output_dir: PathBuf,
    /// Directory of scraped candidate files
    pub candidates_dir: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Definition file patterns
    pub definition_patterns: Vec<String>,
    /// Declared collections, in build order
    pub collections: Vec<CollectionSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("db"),
            output_dir: PathBuf::from("dist"),
            candidates_dir: None,
            log_level: "info".to_string(),
            definition_patterns: DEFAULT_PATTERNS.iter().map(ToString::to_string).collect(),
            collections: CollectionSpec::defaults(),
        }
    }
}

impl Config {
    /// Look up one top-level key, rendered as TOML
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = toml::Value::try_from(self).context("Failed to serialize configuration")?;
        Ok(value.get(key).map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    /// The whole configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// User config file in the platform config directory
#[must_use]
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "hyperpolymath", "filamentdb")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration; an explicit `path` must exist
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut builder = config::Config::builder();

    if let Some(user) = user_config_file() {
        builder = builder.add_source(File::from(user).required(false));
    }

    builder = match path {
        Some(p) => builder.add_source(File::from(p).required(true)),
        None => builder.add_source(File::from(Path::new(CONFIG_FILE)).required(false)),
    };

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()
        .and_then(config::Config::try_deserialize)
        .with_context(|| match path {
            Some(p) => format!("Failed to load configuration from {}", p.display()),
            None => "Failed to load configuration".to_string(),
        })
}
