use std::path::{Component, Path, PathBuf};

use crate::models::AssetKind;

/// Append the kind's default extension when `argument` lacks a recognised one.
///
/// `lib` and `lib.js` name the same script; `jquery.min` becomes `jquery.min.js`.
pub fn with_default_extension(argument: &str, kind: AssetKind) -> String {
  match kind.default_extension() {
    Some(default) if !kind.matches(Path::new(argument)) => format!("{argument}.{default}"),
    _ => argument.to_string(),
  }
}

/// Collapse `.` and `..` components without consulting the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        let can_pop = matches!(
          normalized.components().next_back(),
          Some(Component::Normal(_))
        );
        if can_pop {
          normalized.pop();
        } else if !normalized.has_root() {
          normalized.push("..");
        }
      }
      other => normalized.push(other),
    }
  }
  normalized
}

/// Returns `true` when `candidate` stays inside `root` after normalisation.
pub fn is_within_root(root: &Path, candidate: &Path) -> bool {
  let root = normalize_lexically(root);
  let candidate = normalize_lexically(candidate);

  candidate.strip_prefix(&root).is_ok_and(|rest| {
    !rest
      .components()
      .any(|component| matches!(component, Component::ParentDir))
  })
}
