//! Configuration loader for the stylesheet rewriter.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::UserefError;

/// File name searched for by [`UserefConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "css-useref.json";

/// Options controlling where rewritten assets land and which references are rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserefConfig {
  /// Output subtree, relative to the build root, that copied assets are placed under.
  ///
  /// Empty keeps every asset at its mirrored source position.
  #[serde(alias = "base")]
  pub root_dir_override: String,
  /// Alternate base directories for references starting with `/<name>/`.
  #[serde(alias = "absSources")]
  pub absolute_base_map: BTreeMap<String, PathBuf>,
  /// Glob a reference path must match before it is rewritten.
  #[serde(alias = "match")]
  pub eligibility_pattern: Option<String>,
}

impl UserefConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or malformed file yields the default configuration.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(UserefError::ConfigRead { source, .. })
        if source.kind() == std::io::ErrorKind::NotFound =>
      {
        Self::default()
      }
      Err(err) => {
        tracing::warn!("{err}; falling back to default configuration");
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, UserefError> {
    let content = fs::read_to_string(path).map_err(|source| UserefError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| UserefError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Base directory registered for a reference of the form `/<name>/...`.
  ///
  /// Every key is checked in sorted order and the last match wins.
  pub fn base_dir_for(&self, reference: &str) -> Option<&Path> {
    let mut found = None;
    for (name, base) in &self.absolute_base_map {
      if reference.starts_with(&format!("/{name}/")) {
        found = Some(base.as_path());
      }
    }
    found
  }

  /// Trimmed root override, `None` when assets keep their mirrored position.
  pub fn root_override(&self) -> Option<&str> {
    let trimmed = self.root_dir_override.trim();
    (!trimmed.is_empty()).then_some(trimmed)
  }
}
