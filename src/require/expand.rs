//! Recursive expansion of require directives.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use same_file::is_same_file;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::error::{AssetError, AssetResult};
use crate::models::{AssetKind, Directive, DirectiveKind, LocatedAsset};
use crate::processor::AssetProcessor;
use crate::require::directive::parse_directive;
use crate::require::paths::{is_within_root, with_default_extension};

/// Expands `//= require` and `//= require_tree` directives for one asset category.
///
/// Directive lines are replaced by the expansion of their targets and never echoed. Every
/// other line is copied through with its original terminator, so a file without directives
/// comes back byte for byte. Requires are confined to the root directory, and a file that
/// requires itself (directly or through other files) fails with
/// [`AssetError::CyclicRequire`]. Tree walks follow symlinks the same way single requires do.
#[derive(Debug, Clone)]
pub struct RequireResolver {
  root: PathBuf,
  kind: AssetKind,
}

impl RequireResolver {
  /// Resolver for `kind` assets confined to `root`.
  pub fn new(root: impl Into<PathBuf>, kind: AssetKind) -> Self {
    Self {
      root: root.into(),
      kind,
    }
  }

  /// Directory requires may not escape.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Expand an asset already opened by the locator.
  #[instrument(level = "debug", skip(self, asset), fields(asset = %asset.path().display()))]
  pub fn expand(&self, asset: LocatedAsset) -> AssetResult<String> {
    let (path, file) = asset.into_parts();
    let mut expansion = Expansion::new(self);
    expansion.expand_opened(&path, file)
  }

  /// Open and expand the file at `path`.
  #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
  pub fn expand_path(&self, path: &Path) -> AssetResult<String> {
    let mut expansion = Expansion::new(self);
    expansion.expand_file(path)
  }
}

impl AssetProcessor for RequireResolver {
  fn process(&self, asset: LocatedAsset) -> AssetResult<String> {
    self.expand(asset)
  }
}

/// State for one top-level expansion: the chain of files currently being expanded.
struct Expansion<'r> {
  resolver: &'r RequireResolver,
  chain: Vec<PathBuf>,
}

impl<'r> Expansion<'r> {
  fn new(resolver: &'r RequireResolver) -> Self {
    Self {
      resolver,
      chain: Vec::new(),
    }
  }

  fn expand_file(&mut self, path: &Path) -> AssetResult<String> {
    let file = File::open(path).map_err(|err| AssetError::from_io(path, err))?;
    self.expand_opened(path, file)
  }

  fn expand_opened(&mut self, path: &Path, file: File) -> AssetResult<String> {
    let canonical = fs::canonicalize(path).map_err(|err| AssetError::from_io(path, err))?;
    if self.chain.contains(&canonical) {
      let mut chain = self.chain.clone();
      chain.push(canonical);
      return Err(AssetError::CyclicRequire { chain });
    }

    self.chain.push(canonical);
    let result = self.expand_lines(path, BufReader::new(file));
    self.chain.pop();
    result
  }

  fn expand_lines<R: BufRead>(&mut self, path: &Path, mut reader: R) -> AssetResult<String> {
    let mut output = String::new();
    let mut line = String::new();

    loop {
      line.clear();
      let read = reader
        .read_line(&mut line)
        .map_err(|err| read_error(path, err))?;
      if read == 0 {
        break;
      }

      match parse_directive(strip_terminator(&line)) {
        Some(directive) => {
          let expanded = self.expand_directive(path, &directive, &line)?;
          output.push_str(&expanded);
        }
        None => output.push_str(&line),
      }
    }

    Ok(output)
  }

  fn expand_directive(
    &mut self,
    current: &Path,
    directive: &Directive<'_>,
    line: &str,
  ) -> AssetResult<String> {
    let base = current.parent().unwrap_or_else(|| Path::new(""));
    let argument = match directive.kind {
      DirectiveKind::Single => with_default_extension(directive.argument, self.resolver.kind),
      DirectiveKind::Tree => directive.argument.to_string(),
    };
    let target = base.join(&argument);

    if !is_within_root(&self.resolver.root, &target) {
      return Err(AssetError::malformed(
        current,
        strip_terminator(line),
        format!("{} resolves outside {}", target.display(), self.resolver.root.display()),
      ));
    }

    debug!(
      kind = ?directive.kind,
      from = %current.display(),
      target = %target.display(),
      "resolving require directive"
    );

    match directive.kind {
      DirectiveKind::Single => self.expand_file(&target),
      DirectiveKind::Tree => self.expand_tree(current, &target, line),
    }
  }

  fn expand_tree(&mut self, current: &Path, dir: &Path, line: &str) -> AssetResult<String> {
    match fs::metadata(dir) {
      Ok(metadata) if metadata.is_dir() => {}
      Ok(_) => {
        return Err(AssetError::malformed(
          current,
          strip_terminator(line),
          format!("{} is not a directory", dir.display()),
        ));
      }
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        warn!(
          from = %current.display(),
          dir = %dir.display(),
          "require_tree target does not exist"
        );
        return Ok(String::new());
      }
      Err(err) => return Err(AssetError::from_io(dir, err)),
    }

    let mut output = String::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
      let entry = entry.map_err(|err| {
        let path = err.path().unwrap_or(dir).to_path_buf();
        AssetError::Io {
          path,
          source: io::Error::from(err),
        }
      })?;

      if !entry.file_type().is_file() || !self.resolver.kind.matches(entry.path()) {
        continue;
      }

      let is_requiring_file =
        is_same_file(entry.path(), current).map_err(|err| AssetError::from_io(entry.path(), err))?;
      if is_requiring_file {
        continue;
      }

      output.push_str(&self.expand_file(entry.path())?);
    }

    Ok(output)
  }
}

fn strip_terminator(line: &str) -> &str {
  let line = line.strip_suffix('\n').unwrap_or(line);
  line.strip_suffix('\r').unwrap_or(line)
}

fn read_error(path: &Path, err: io::Error) -> AssetError {
  AssetError::Io {
    path: path.to_path_buf(),
    source: err,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::locator::AssetLocator;
  use tempfile::{TempDir, tempdir};

  fn write(dir: &TempDir, relative: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
  }

  fn resolver(dir: &TempDir) -> RequireResolver {
    RequireResolver::new(dir.path(), AssetKind::Script)
  }

  #[test]
  fn files_without_directives_are_unchanged() {
    let dir = tempdir().unwrap();
    let body = "var a = 1;\r\n// plain comment\n\nno trailing newline";
    let path = write(&dir, "plain.js", body);

    assert_eq!(resolver(&dir).expand_path(&path).unwrap(), body);
  }

  #[test]
  fn single_require_is_inlined_in_place_of_the_directive() {
    let dir = tempdir().unwrap();
    write(&dir, "scripts/lib.js", "console.log(0);\n");
    let app = write(&dir, "scripts/app.js", "//= require lib\nconsole.log(1);\n");

    assert_eq!(
      resolver(&dir).expand_path(&app).unwrap(),
      "console.log(0);\nconsole.log(1);\n"
    );
  }

  #[test]
  fn expansion_lands_where_the_directive_appears() {
    let dir = tempdir().unwrap();
    write(&dir, "b.js", "b();\n");
    let a = write(&dir, "a.js", "before();\n//= require b.js\nafter();\n");

    assert_eq!(
      resolver(&dir).expand_path(&a).unwrap(),
      "before();\nb();\nafter();\n"
    );
  }

  #[test]
  fn bare_and_suffixed_names_resolve_to_the_same_file() {
    let dir = tempdir().unwrap();
    write(&dir, "foo.js", "foo();\n");
    let bare = write(&dir, "bare.js", "//= require foo\n");
    let suffixed = write(&dir, "suffixed.js", "//= require foo.js\n");

    let resolver = resolver(&dir);
    assert_eq!(
      resolver.expand_path(&bare).unwrap(),
      resolver.expand_path(&suffixed).unwrap()
    );
  }

  #[test]
  fn nested_requires_expand_depth_first() {
    let dir = tempdir().unwrap();
    write(&dir, "c.js", "c();\n");
    write(&dir, "lib/b.js", "//= require ../c\nb();\n");
    let a = write(&dir, "a.js", "//= require lib/b\na();\n");

    assert_eq!(resolver(&dir).expand_path(&a).unwrap(), "c();\nb();\na();\n");
  }

  #[test]
  fn require_tree_walks_in_lexicographic_order_and_filters_extensions() {
    let dir = tempdir().unwrap();
    write(&dir, "tree/y.js", "y();\n");
    write(&dir, "tree/x.js", "x();\n");
    write(&dir, "tree/notes.txt", "ignored\n");
    write(&dir, "tree/style.css", "body {}\n");
    write(&dir, "tree/nested/z.js", "z();\n");
    write(&dir, "tree/a/w.js", "w();\n");
    let app = write(&dir, "app.js", "//= require_tree tree\napp();\n");

    let resolver = resolver(&dir);
    let first = resolver.expand_path(&app).unwrap();
    assert_eq!(first, "w();\nz();\nx();\ny();\napp();\n");
    assert_eq!(resolver.expand_path(&app).unwrap(), first);
  }

  #[test]
  fn require_tree_of_current_directory_skips_the_requiring_file() {
    let dir = tempdir().unwrap();
    write(&dir, "x.js", "x();\n");
    write(&dir, "y.js", "y();\n");
    let app = write(&dir, "app.js", "//= require_tree .\napp();\n");

    assert_eq!(
      resolver(&dir).expand_path(&app).unwrap(),
      "x();\ny();\napp();\n"
    );
  }

  #[test]
  fn require_tree_expands_nested_directives() {
    let dir = tempdir().unwrap();
    write(&dir, "shared.js", "shared();\n");
    write(&dir, "widgets/button.js", "//= require ../shared\nbutton();\n");
    let app = write(&dir, "app.js", "//= require_tree ./widgets\n");

    assert_eq!(
      resolver(&dir).expand_path(&app).unwrap(),
      "shared();\nbutton();\n"
    );
  }

  #[test]
  fn missing_tree_contributes_nothing() {
    let dir = tempdir().unwrap();
    let app = write(&dir, "app.js", "//= require_tree vendor\napp();\n");

    assert_eq!(resolver(&dir).expand_path(&app).unwrap(), "app();\n");
  }

  #[test]
  fn tree_pointing_at_a_file_is_malformed() {
    let dir = tempdir().unwrap();
    write(&dir, "lib.js", "lib();\n");
    let app = write(&dir, "app.js", "//= require_tree lib.js\n");

    let err = resolver(&dir).expand_path(&app).unwrap_err();
    assert!(matches!(err, AssetError::MalformedDirective { .. }));
  }

  #[test]
  fn missing_require_aborts_with_not_found() {
    let dir = tempdir().unwrap();
    let app = write(&dir, "app.js", "app();\n//= require missing\n");

    let err = resolver(&dir).expand_path(&app).unwrap_err();
    assert!(err.is_not_found());
  }

  #[test]
  fn requires_escaping_the_root_are_rejected() {
    let dir = tempdir().unwrap();
    write(&dir, "outside.js", "outside();\n");
    let app = write(&dir, "public/app.js", "//= require ../outside\n");

    let resolver = RequireResolver::new(dir.path().join("public"), AssetKind::Script);
    let err = resolver.expand_path(&app).unwrap_err();
    assert!(matches!(err, AssetError::MalformedDirective { .. }));
  }

  #[test]
  fn self_require_is_a_cycle() {
    let dir = tempdir().unwrap();
    let app = write(&dir, "app.js", "//= require app\n");

    let err = resolver(&dir).expand_path(&app).unwrap_err();
    match err {
      AssetError::CyclicRequire { chain } => assert_eq!(chain.len(), 2),
      other => panic!("expected cyclic require, got {other:?}"),
    }
  }

  #[test]
  fn mutual_requires_are_a_cycle() {
    let dir = tempdir().unwrap();
    write(&dir, "b.js", "//= require a\n");
    let a = write(&dir, "a.js", "//= require b\n");

    let err = resolver(&dir).expand_path(&a).unwrap_err();
    assert!(matches!(err, AssetError::CyclicRequire { .. }));
  }

  #[test]
  fn diamond_requires_are_inlined_twice() {
    let dir = tempdir().unwrap();
    write(&dir, "base.js", "base();\n");
    write(&dir, "left.js", "//= require base\nleft();\n");
    write(&dir, "right.js", "//= require base\nright();\n");
    let top = write(&dir, "top.js", "//= require left\n//= require right\n");

    assert_eq!(
      resolver(&dir).expand_path(&top).unwrap(),
      "base();\nleft();\nbase();\nright();\n"
    );
  }

  #[test]
  fn missing_require_inside_a_tree_aborts_the_walk() {
    let dir = tempdir().unwrap();
    write(&dir, "tree/a.js", "//= require nope\na();\n");
    write(&dir, "tree/b.js", "b();\n");
    let app = write(&dir, "app.js", "//= require_tree tree\napp();\n");

    let err = resolver(&dir).expand_path(&app).unwrap_err();
    assert!(err.is_not_found());
    match err {
      AssetError::NotFound { path } => assert_eq!(path, dir.path().join("tree/nope.js")),
      other => panic!("expected not found, got {other:?}"),
    }
  }

  #[test]
  fn cycle_inside_a_tree_surfaces_without_partial_output() {
    let dir = tempdir().unwrap();
    write(&dir, "tree/a.js", "a();\n");
    write(&dir, "tree/b.js", "//= require c\nb();\n");
    write(&dir, "tree/c.js", "//= require b\nc();\n");
    let app = write(&dir, "app.js", "//= require_tree tree\napp();\n");

    let result = resolver(&dir).expand_path(&app);
    assert!(matches!(result, Err(AssetError::CyclicRequire { .. })));
  }

  #[cfg(unix)]
  #[test]
  fn require_tree_follows_symlinked_scripts() {
    let dir = tempdir().unwrap();
    let real = write(&dir, "real.js", "real();\n");
    write(&dir, "tree/a.js", "a();\n");
    std::os::unix::fs::symlink(&real, dir.path().join("tree/b.js")).unwrap();
    let via_tree = write(&dir, "via_tree.js", "//= require_tree tree\n");
    let via_single = write(&dir, "via_single.js", "//= require tree/a\n//= require tree/b\n");

    let resolver = resolver(&dir);
    assert_eq!(resolver.expand_path(&via_tree).unwrap(), "a();\nreal();\n");
    assert_eq!(
      resolver.expand_path(&via_tree).unwrap(),
      resolver.expand_path(&via_single).unwrap()
    );
  }

  #[test]
  fn resolver_reports_its_root() {
    let dir = tempdir().unwrap();
    assert_eq!(resolver(&dir).root(), dir.path());
  }

  #[test]
  fn expand_consumes_located_assets() {
    let dir = tempdir().unwrap();
    write(&dir, "javascripts/lib.js", "lib();\n");
    write(&dir, "javascripts/app.js", "//= require lib\napp();\n");

    let asset = AssetLocator::new(dir.path())
      .lookup("/javascripts/app.js")
      .unwrap();
    assert!(asset.file().metadata().unwrap().is_file());
    assert_eq!(resolver(&dir).expand(asset).unwrap(), "lib();\napp();\n");
  }

  #[test]
  fn non_utf8_sources_are_io_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binary.js");
    fs::write(&path, [0xff, 0xfe, b'\n']).unwrap();

    let err = resolver(&dir).expand_path(&path).unwrap_err();
    assert!(matches!(err, AssetError::Io { .. }));
  }
}
