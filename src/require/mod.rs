//! The require-directive resolver.
//!
//! Parsing a directive line, inferring extensions and confining paths to the asset root
//! live in small submodules so each rule can be tested on its own; `expand` drives the
//! recursive, line-oriented expansion on top of them.

mod directive;
mod expand;
mod paths;

pub use directive::parse_directive;
pub use expand::RequireResolver;
pub use paths::{is_within_root, normalize_lexically, with_default_extension};
