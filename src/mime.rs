//! Content-Type lookup by file extension.

use std::path::Path;

/// Content-Type for a file extension, falling back to `application/octet-stream`.
pub fn content_type_for_extension(extension: Option<&str>) -> &'static str {
  let lowered = extension.map(str::to_ascii_lowercase);
  match lowered.as_deref() {
    Some("js" | "mjs") => "text/javascript; charset=utf-8",
    Some("css") => "text/css; charset=utf-8",
    Some("html" | "htm") => "text/html; charset=utf-8",
    Some("json" | "map") => "application/json",
    Some("txt") => "text/plain; charset=utf-8",

    Some("png") => "image/png",
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("svg") => "image/svg+xml",
    Some("ico") => "image/vnd.microsoft.icon",
    Some("webp") => "image/webp",

    Some("woff") => "font/woff",
    Some("woff2") => "font/woff2",

    _ => "application/octet-stream",
  }
}

/// Content-Type for a path based on its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
  content_type_for_extension(path.extension().and_then(|ext| ext.to_str()))
}
