//! Data structures passed between the locator, the processors and the HTTP layer.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::mime::content_type_for_path;

/// Category of an asset, decided once from its extension at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
  /// JavaScript sources; the only kind that expands require directives.
  Script,
  /// Stylesheets.
  Style,
  /// Raster and vector images.
  Image,
  /// Anything else, served untouched.
  Other,
}

impl AssetKind {
  /// Classify a path by its extension.
  pub fn from_path(path: &Path) -> Self {
    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_ascii_lowercase);

    match extension.as_deref() {
      Some(ext) if Self::Script.extensions().contains(&ext) => Self::Script,
      Some(ext) if Self::Style.extensions().contains(&ext) => Self::Style,
      Some(ext) if Self::Image.extensions().contains(&ext) => Self::Image,
      _ => Self::Other,
    }
  }

  /// Extensions recognised for this kind, without the leading dot.
  pub fn extensions(self) -> &'static [&'static str] {
    match self {
      Self::Script => &["js", "mjs"],
      Self::Style => &["css"],
      Self::Image => &["png", "jpg", "jpeg", "gif", "svg", "ico", "webp"],
      Self::Other => &[],
    }
  }

  /// Extension appended to bare names of this kind.
  pub fn default_extension(self) -> Option<&'static str> {
    self.extensions().first().copied()
  }

  /// Returns `true` when `path` carries one of this kind's extensions.
  pub fn matches(self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| {
        self
          .extensions()
          .iter()
          .any(|known| known.eq_ignore_ascii_case(ext))
      })
  }
}

/// The two flavours of require directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
  /// `//= require <file>`
  Single,
  /// `//= require_tree <dir>`
  Tree,
}

/// A require instruction parsed from one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
  /// Which directive was written.
  pub kind: DirectiveKind,
  /// Argument exactly as written after the separating blanks.
  pub argument: &'a str,
}

/// An asset found under the configured root together with its open file handle.
#[derive(Debug)]
pub struct LocatedAsset {
  name: String,
  path: PathBuf,
  kind: AssetKind,
  file: File,
}

impl LocatedAsset {
  pub(crate) fn new(name: impl Into<String>, path: PathBuf, file: File) -> Self {
    let kind = AssetKind::from_path(&path);
    Self {
      name: name.into(),
      path,
      kind,
      file,
    }
  }

  /// Logical name the asset was requested under.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Physical path of the asset.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Category of the asset.
  pub fn kind(&self) -> AssetKind {
    self.kind
  }

  /// Borrow the open file handle.
  pub fn file(&self) -> &File {
    &self.file
  }

  /// Split into the physical path and the open file handle.
  pub fn into_parts(self) -> (PathBuf, File) {
    (self.path, self.file)
  }
}

/// Body handed to the HTTP layer.
#[derive(Debug)]
pub enum AssetBody {
  /// Fully expanded text.
  Expanded(String),
  /// Untouched file to be served with conditional-GET semantics.
  Raw(File),
}

/// Outcome of [`crate::Assets::resolve`].
#[derive(Debug)]
pub struct ResolvedAsset {
  /// Physical path of the requested asset.
  pub path: PathBuf,
  /// Category decided at lookup time.
  pub kind: AssetKind,
  /// Expanded text or the raw file.
  pub body: AssetBody,
}

impl ResolvedAsset {
  /// Content-Type derived from the source file extension.
  pub fn content_type(&self) -> &'static str {
    content_type_for_path(&self.path)
  }

  /// Byte length of the expanded body, if there is one.
  pub fn content_length(&self) -> Option<usize> {
    match &self.body {
      AssetBody::Expanded(text) => Some(text.len()),
      AssetBody::Raw(_) => None,
    }
  }

  /// Expanded text, if the asset was processed.
  pub fn expanded(&self) -> Option<&str> {
    match &self.body {
      AssetBody::Expanded(text) => Some(text),
      AssetBody::Raw(_) => None,
    }
  }
}
