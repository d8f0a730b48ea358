//! Error taxonomy shared by the locator, the require resolver and the facade.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used across the crate.
pub type AssetResult<T> = Result<T, AssetError>;

/// Failures raised while locating or expanding an asset.
#[derive(Debug, Error)]
pub enum AssetError {
  /// The requested or required file does not exist (or names a directory).
  #[error("asset not found: {}", path.display())]
  NotFound {
    /// Path that was looked up.
    path: PathBuf,
  },

  /// Any other failure opening, reading or walking a file.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: io::Error,
  },

  /// A directive whose argument cannot be resolved safely.
  #[error("malformed directive `{line}` in {}: {reason}", file.display())]
  MalformedDirective {
    /// File containing the directive.
    file: PathBuf,
    /// The directive line as written.
    line: String,
    /// Why the directive was rejected.
    reason: String,
  },

  /// A file requires itself, directly or transitively.
  #[error("cyclic require: {}", render_chain(chain))]
  CyclicRequire {
    /// Files on the expansion chain, ending with the file that was re-entered.
    chain: Vec<PathBuf>,
  },
}

impl AssetError {
  /// Classify an I/O error raised for `path`, keeping "not found" distinct.
  pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    let path = path.into();
    if source.kind() == io::ErrorKind::NotFound {
      Self::NotFound { path }
    } else {
      Self::Io { path, source }
    }
  }

  /// Returns `true` when the caller may fall through to another handler.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }

  pub(crate) fn malformed(file: &Path, line: &str, reason: impl Into<String>) -> Self {
    Self::MalformedDirective {
      file: file.to_path_buf(),
      line: line.to_string(),
      reason: reason.into(),
    }
  }
}

fn render_chain(chain: &[PathBuf]) -> String {
  chain
    .iter()
    .map(|path| path.display().to_string())
    .collect::<Vec<_>>()
    .join(" -> ")
}
