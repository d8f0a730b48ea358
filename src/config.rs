//! Asset root configuration describing where logical asset names live on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name searched for by [`AssetOptions::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "assets.config.json";

/// Base directory plus the named subdirectories for each asset category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetOptions {
  /// Directory every logical asset name is joined onto.
  pub base_dir: PathBuf,
  /// Subdirectory of `base_dir` holding scripts.
  pub javascripts_dir: String,
  /// Subdirectory of `base_dir` holding stylesheets.
  pub stylesheets_dir: String,
  /// Subdirectory of `base_dir` holding images.
  pub images_dir: String,
}

impl Default for AssetOptions {
  fn default() -> Self {
    Self {
      base_dir: PathBuf::from("assets"),
      javascripts_dir: "javascripts".into(),
      stylesheets_dir: "stylesheets".into(),
      images_dir: "images".into(),
    }
  }
}

/// Errors that can occur while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
}

impl AssetOptions {
  /// Options rooted at `base_dir` with the default category subdirectories.
  pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      base_dir: base_dir.into(),
      ..Self::default()
    }
  }

  /// Look for [`DEFAULT_CONFIG_FILE`] inside `dir`.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    Self::load_from_path(dir.join(DEFAULT_CONFIG_FILE))
  }

  /// Read configuration from a JSON file.
  ///
  /// A missing file yields the defaults. A relative `base_dir` is taken relative to the
  /// directory holding the configuration file.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(ConfigError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let mut options: Self = serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
      path: path.to_path_buf(),
      source: err,
    })?;

    if options.base_dir.is_relative()
      && let Some(parent) = path.parent()
    {
      options.base_dir = parent.join(&options.base_dir);
    }

    Ok(options)
  }

  /// Directory holding scripts on disk.
  pub fn javascripts_path(&self) -> PathBuf {
    self.base_dir.join(&self.javascripts_dir)
  }

  /// Directory holding stylesheets on disk.
  pub fn stylesheets_path(&self) -> PathBuf {
    self.base_dir.join(&self.stylesheets_dir)
  }

  /// Directory holding images on disk.
  pub fn images_path(&self) -> PathBuf {
    self.base_dir.join(&self.images_dir)
  }
}
