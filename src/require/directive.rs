use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Directive, DirectiveKind};

fn directive_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"^//=[ \t]*require(_tree)?[ \t]+(.+)$").expect("invalid directive regex")
  })
}

/// Parse a single source line, without its terminator, into a require directive.
///
/// Returns `None` for ordinary content lines.
pub fn parse_directive(line: &str) -> Option<Directive<'_>> {
  let captures = directive_pattern().captures(line)?;
  let argument = captures.get(2)?.as_str();
  let kind = if captures.get(1).is_some() {
    DirectiveKind::Tree
  } else {
    DirectiveKind::Single
  };

  Some(Directive { kind, argument })
}
