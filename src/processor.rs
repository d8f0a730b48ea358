//! Per-kind processing capability.

use crate::error::AssetResult;
use crate::models::LocatedAsset;

/// Capability implemented by asset kinds that transform their source before serving.
///
/// Kinds without a processor are served raw.
pub trait AssetProcessor: Send + Sync {
  /// Consume the located asset and return its processed text.
  fn process(&self, asset: LocatedAsset) -> AssetResult<String>;
}
