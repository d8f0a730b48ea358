#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod error;
pub mod locator;
pub mod mime;
pub mod models;
pub mod processor;
pub mod require;
pub mod tags;

pub use assets::Assets;
pub use config::{AssetOptions, ConfigError};
pub use error::{AssetError, AssetResult};
pub use locator::AssetLocator;
pub use models::{AssetBody, AssetKind, LocatedAsset, ResolvedAsset};
pub use processor::AssetProcessor;
pub use require::RequireResolver;
pub use tags::TagOpts;
