//! Runtime configuration. Defaults reproduce the fixed `Book1.csv` /
//! `bike-data.js` layout; an optional YAML file and environment variables
//! override them, and command arguments override both.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{LedgerError, Result};
use crate::render::DEFAULT_ARRAY_NAME;
use crate::source::GeneratedIdTemplate;

pub const DEFAULT_CONFIG_PATH: &str = "chassis-ledger.yaml";
pub const DEFAULT_CSV_PATH: &str = "Book1.csv";
pub const DEFAULT_LITERAL_PATH: &str = "bike-data.js";

pub const CONFIG_PATH_ENV: &str = "CHASSIS_LEDGER_CONFIG";
pub const CSV_PATH_ENV: &str = "CHASSIS_LEDGER_CSV";
pub const LITERAL_PATH_ENV: &str = "CHASSIS_LEDGER_JS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub csv_path: PathBuf,
    pub literal_path: PathBuf,
    pub array_name: String,
    /// Characters compared by the prefix tables of `analyze`.
    pub prefix_length: usize,
    /// Keys listed per sample block before "... and N more".
    pub sample_limit: usize,
    /// Rows shown per prefix table of `analyze`.
    pub prefix_limit: usize,
    pub generated_template: GeneratedIdTemplate,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            literal_path: PathBuf::from(DEFAULT_LITERAL_PATH),
            array_name: DEFAULT_ARRAY_NAME.to_string(),
            prefix_length: 8,
            sample_limit: 10,
            prefix_limit: 10,
            generated_template: GeneratedIdTemplate::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_yaml_str(raw: &str, origin: &Path) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|err| LedgerError::Config {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] when it exists.
    /// An explicitly named file must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !path.exists() {
            if required {
                return Err(LedgerError::SourceNotFound { path });
            }
            debug!("no {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| LedgerError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("loaded configuration from {}", path.display());
        Self::from_yaml_str(&raw, &path)
    }

    /// Config file (named by `CHASSIS_LEDGER_CONFIG` or the default), then
    /// the path environment overrides.
    pub fn from_env() -> Result<Self> {
        let explicit = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let config = Self::load(explicit.as_deref())?;
        Ok(config.with_env_overrides(|key| env::var(key).ok()))
    }

    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(CSV_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.csv_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(LITERAL_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.literal_path = PathBuf::from(path);
        }
        self
    }

    pub fn with_paths(mut self, csv_path: Option<&str>, literal_path: Option<&str>) -> Self {
        if let Some(path) = csv_path {
            self.csv_path = PathBuf::from(path);
        }
        if let Some(path) = literal_path {
            self.literal_path = PathBuf::from(path);
        }
        self
    }
}
