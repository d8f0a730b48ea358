//! Map logical asset names onto files below the configured base directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, AssetResult};
use crate::models::LocatedAsset;

/// Thin filesystem binding resolving names against a base directory.
#[derive(Debug, Clone)]
pub struct AssetLocator {
  base_dir: PathBuf,
}

impl AssetLocator {
  /// Create a locator rooted at `base_dir`.
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      base_dir: base_dir.into(),
    }
  }

  /// Directory names are resolved against.
  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }

  /// Open the file behind `name`.
  ///
  /// Request paths are accepted as-is: leading slashes are dropped and any query string or
  /// fragment is ignored. Missing files and directories report [`AssetError::NotFound`];
  /// every other failure is an [`AssetError::Io`].
  pub fn lookup(&self, name: &str) -> AssetResult<LocatedAsset> {
    let path = self.path_for(name);
    let file = File::open(&path).map_err(|err| AssetError::from_io(&path, err))?;

    let metadata = file
      .metadata()
      .map_err(|err| AssetError::from_io(&path, err))?;
    if metadata.is_dir() {
      return Err(AssetError::NotFound { path });
    }

    Ok(LocatedAsset::new(name, path, file))
  }

  /// Physical path `name` maps to, without touching the filesystem.
  pub fn path_for(&self, name: &str) -> PathBuf {
    let relative = name
      .split(['?', '#'])
      .next()
      .unwrap_or_default()
      .trim_start_matches('/');
    self.base_dir.join(relative)
  }
}
