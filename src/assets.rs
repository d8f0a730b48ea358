//! Facade tying configuration, lookup and per-kind processing together for the HTTP layer.

use std::path::Path;

use tracing::debug;

use crate::config::AssetOptions;
use crate::error::AssetResult;
use crate::locator::AssetLocator;
use crate::models::{AssetBody, AssetKind, LocatedAsset, ResolvedAsset};
use crate::processor::AssetProcessor;
use crate::require::RequireResolver;
use crate::tags::{self, TagOpts};

/// Entry point used by request handlers to look up, expand and describe assets.
#[derive(Debug, Clone)]
pub struct Assets {
  options: AssetOptions,
  locator: AssetLocator,
  scripts: RequireResolver,
}

impl Assets {
  /// Build the facade from an explicit configuration value.
  pub fn new(options: AssetOptions) -> Self {
    let locator = AssetLocator::new(&options.base_dir);
    let scripts = RequireResolver::new(&options.base_dir, AssetKind::Script);
    Self {
      options,
      locator,
      scripts,
    }
  }

  /// Configuration the facade was built with.
  pub fn options(&self) -> &AssetOptions {
    &self.options
  }

  /// Open the file behind a logical asset name.
  pub fn lookup(&self, name: &str) -> AssetResult<LocatedAsset> {
    self.locator.lookup(name)
  }

  /// Processor responsible for `kind`, if that kind is transformed at all.
  pub fn processor(&self, kind: AssetKind) -> Option<&dyn AssetProcessor> {
    match kind {
      AssetKind::Script => Some(&self.scripts),
      AssetKind::Style | AssetKind::Image | AssetKind::Other => None,
    }
  }

  /// Look up and process an asset.
  ///
  /// Returns `Ok(None)` for kinds that are served untouched.
  pub fn process(&self, name: &str) -> AssetResult<Option<String>> {
    let asset = self.lookup(name)?;
    self.process_located(asset)
  }

  /// Process an asset that has already been opened.
  pub fn process_located(&self, asset: LocatedAsset) -> AssetResult<Option<String>> {
    match self.processor(asset.kind()) {
      Some(processor) => processor.process(asset).map(Some),
      None => Ok(None),
    }
  }

  /// Resolve a request path into what the HTTP layer should send.
  ///
  /// Processed assets with content come back as [`AssetBody::Expanded`]. Everything else,
  /// including processed assets that expand to nothing, comes back as the raw file so the
  /// caller can serve it with conditional-GET semantics.
  pub fn resolve(&self, name: &str) -> AssetResult<ResolvedAsset> {
    let asset = self.lookup(name)?;
    let path = asset.path().to_path_buf();
    let kind = asset.kind();

    if let Some(expanded) = self.process_located(asset)?
      && !expanded.is_empty()
    {
      debug!(asset = %path.display(), bytes = expanded.len(), "serving expanded asset");
      return Ok(ResolvedAsset {
        path,
        kind,
        body: AssetBody::Expanded(expanded),
      });
    }

    let (path, file) = self.lookup(name)?.into_parts();
    debug!(asset = %path.display(), "serving raw asset");
    Ok(ResolvedAsset {
      path,
      kind,
      body: AssetBody::Raw(file),
    })
  }

  /// URL path for a script under the configured scripts directory.
  pub fn javascript_path(&self, name: &str) -> String {
    category_path(&self.options.javascripts_dir, name, AssetKind::Script)
  }

  /// URL path for a stylesheet under the configured stylesheets directory.
  pub fn stylesheet_path(&self, name: &str) -> String {
    category_path(&self.options.stylesheets_dir, name, AssetKind::Style)
  }

  /// URL path for an image under the configured images directory.
  pub fn image_path(&self, name: &str) -> String {
    category_path(&self.options.images_dir, name, AssetKind::Image)
  }

  /// `<script>` tag pointing at a script asset.
  pub fn javascript_include_tag(&self, name: &str, opts: TagOpts) -> String {
    tags::javascript_include_tag(&self.javascript_path(name), opts)
  }

  /// `<link rel="stylesheet">` tag pointing at a stylesheet asset.
  pub fn stylesheet_link_tag(&self, name: &str, opts: TagOpts) -> String {
    tags::stylesheet_link_tag(&self.stylesheet_path(name), opts)
  }

  /// Favicon `<link>` tag pointing at an image asset.
  pub fn favicon_link_tag(&self, name: &str, opts: TagOpts) -> String {
    tags::favicon_link_tag(&self.image_path(name), opts)
  }
}

/// Build `/<dir>/<name>` for relative names, appending the kind's default extension when
/// the name does not already carry one of the kind's extensions.
///
/// Absolute paths and URLs are returned untouched.
fn category_path(dir: &str, name: &str, kind: AssetKind) -> String {
  if name.starts_with('/') || name.contains("://") {
    return name.to_string();
  }

  let file = match kind.default_extension() {
    Some(ext) if !kind.matches(Path::new(name)) => format!("{name}.{ext}"),
    _ => name.to_string(),
  };

  let dir = dir.trim_matches('/');
  if dir.is_empty() {
    format!("/{file}")
  } else {
    format!("/{dir}/{file}")
  }
}
