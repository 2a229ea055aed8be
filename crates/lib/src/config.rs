//! User configuration.
//!
//! Layers, later wins: built-in defaults, the TOML config file, then the
//! `FEMBUILD_*` environment variables. Command-line flags are applied on top by
//! the CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_PACKAGES_ROOT, PACKAGES_ROOT_ENV, PREFIX_ENV};
use crate::flags::CompileSettings;
use crate::options::{Choice, Feature, OptionSet};
use crate::orchestrate::Tools;
use crate::platform::paths::config_file;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config {path}: {message}")]
  Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmokeConfig {
  /// Suite manifest or directory used when `smoke` is run without `--suite`.
  pub suite: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Root under which dependency packages live as `opt/<id>`.
  pub packages_root: Option<PathBuf>,
  pub prefix: Option<PathBuf>,
  pub build_type: Option<String>,
  /// Option choices by name, `true` for with and `false` for without.
  pub options: BTreeMap<Feature, bool>,
  pub tools: Tools,
  /// External command that installs the resolved dependencies.
  pub provision: Vec<String>,
  pub smoke: SmokeConfig,
}

impl Config {
  /// Load configuration from `explicit`, or from the default config file if
  /// one exists, then apply environment overrides.
  ///
  /// An explicitly named file must exist; a missing default file is ignored.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    let mut config = match explicit {
      Some(path) => Self::from_file(path)?,
      None => {
        let path = config_file();
        if path.is_file() {
          Self::from_file(&path)?
        } else {
          debug!(path = %path.display(), "no config file, using defaults");
          Self::default()
        }
      }
    };
    config.apply_env();
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
  }

  fn apply_env(&mut self) {
    if let Some(root) = std::env::var_os(PACKAGES_ROOT_ENV).filter(|v| !v.is_empty()) {
      self.packages_root = Some(PathBuf::from(root));
    }
    if let Some(prefix) = std::env::var_os(PREFIX_ENV).filter(|v| !v.is_empty()) {
      self.prefix = Some(PathBuf::from(prefix));
    }
  }

  pub fn packages_root(&self) -> PathBuf {
    self
      .packages_root
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGES_ROOT))
  }

  /// Option choices from the config file; CLI flags are applied to the result.
  pub fn option_set(&self) -> OptionSet {
    let mut options = OptionSet::new();
    for (feature, enabled) in &self.options {
      let choice = if *enabled { Choice::With } else { Choice::Without };
      options.set(*feature, choice);
    }
    options
  }

  pub fn compile_settings(&self) -> CompileSettings {
    match &self.build_type {
      Some(build_type) => CompileSettings {
        build_type: build_type.clone(),
      },
      None => CompileSettings::default(),
    }
  }
}
