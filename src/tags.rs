//! Markup helpers for referencing assets from HTML templates.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Returned when attribute pairs are given with a dangling key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expects an even number of attribute values, got {0}")]
pub struct OddTagOpts(pub usize);

/// Attributes to render into a tag, kept in sorted key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOpts(BTreeMap<String, String>);

impl TagOpts {
  /// Empty attribute set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Build attributes from a flat `key, value, key, value` list.
  pub fn from_pairs<I, S>(values: I) -> Result<Self, OddTagOpts>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    if values.len() % 2 == 1 {
      return Err(OddTagOpts(values.len()));
    }

    let mut opts = Self::new();
    let mut iter = values.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
      opts.0.insert(key, value);
    }
    Ok(opts)
  }

  /// Set an attribute, replacing any previous value.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.0.insert(key.into(), value.into());
    self
  }

  /// Set an attribute only when it is not present yet.
  pub fn set_default(&mut self, key: &str, value: &str) -> &mut Self {
    self
      .0
      .entry(key.to_string())
      .or_insert_with(|| value.to_string());
    self
  }

  /// Value of an attribute, if set.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  /// Returns `true` when no attributes are set.
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Display for TagOpts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (key, value) in &self.0 {
      if !first {
        f.write_str(" ")?;
      }
      first = false;
      write!(f, "{}=\"{}\"", escape_attribute(key), escape_attribute(value))?;
    }
    Ok(())
  }
}

/// `<script src="..."></script>`
pub fn javascript_include_tag(src: &str, mut opts: TagOpts) -> String {
  opts.set("src", src);
  format!("{}</script>", open_tag("script", &opts))
}

/// `<link href="..." rel="stylesheet">`
pub fn stylesheet_link_tag(href: &str, mut opts: TagOpts) -> String {
  opts.set("rel", "stylesheet");
  link_tag(href, opts)
}

/// Favicon `<link>`; `rel` and `type` default to the classic `.ico` values.
pub fn favicon_link_tag(href: &str, mut opts: TagOpts) -> String {
  opts
    .set_default("rel", "shortcut icon")
    .set_default("type", "image/vnd.microsoft.icon");
  link_tag(href, opts)
}

fn link_tag(href: &str, mut opts: TagOpts) -> String {
  opts.set("href", href);
  open_tag("link", &opts)
}

fn open_tag(name: &str, opts: &TagOpts) -> String {
  if opts.is_empty() {
    format!("<{name}>")
  } else {
    format!("<{name} {opts}>")
  }
}

fn escape_attribute(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '"' => escaped.push_str("&quot;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      other => escaped.push(other),
    }
  }
  escaped
}
