use std::path::{Path, PathBuf};

use super::normalize::{normalize_segments, relative_url, split_segments};
use crate::config::UserefConfig;

/// Locations derived for a single `url()` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
  /// Reference path without query string or fragment, forward slashes only.
  ///
  /// Relative references resolve against the stylesheet's source directory; root-relative
  /// ones (reached through a base override) are appended to the override directory.
  pub asset_path: String,
  /// Position of the asset in the output tree, relative to the build root.
  pub new_asset_file: PathBuf,
  /// Minimal path from the stylesheet's directory to [`ResolvedAsset::new_asset_file`],
  /// followed by the original query string or fragment.
  pub relative_url: String,
}

impl ResolvedAsset {
  /// Replacement `url()` declaration, quoted with `quote` when the original was quoted.
  pub fn new_url(&self, quote: Option<char>) -> String {
    match quote {
      Some(quote) => format!("url({quote}{}{quote})", self.relative_url),
      None => format!("url({})", self.relative_url),
    }
  }
}

/// Compute where a referenced asset is read from and where it lands in the output tree.
///
/// The stylesheet keeps its relative position, so the emitted URL is the shortest path from
/// its directory to the asset's new position. With no root override configured that
/// position mirrors the source layout and a minimal reference is returned unchanged.
pub fn resolve_asset_paths(
  document_relative_path: &Path,
  reference: &str,
  config: &UserefConfig,
) -> ResolvedAsset {
  let split_at = reference
    .find(|c: char| c == '?' || c == '#')
    .unwrap_or(reference.len());
  let (path_part, suffix) = reference.split_at(split_at);
  let asset_path = path_part.replace('\\', "/");

  let document_relative = document_relative_path.to_string_lossy();
  let mut document_segments = normalize_segments(split_segments(&document_relative));
  document_segments.pop();

  let position = if asset_path.starts_with('/') {
    normalize_segments(split_segments(&asset_path))
  } else {
    normalize_segments(
      document_segments
        .iter()
        .copied()
        .chain(split_segments(&asset_path)),
    )
  };

  let target = match config.root_override() {
    Some(root) => normalize_segments(split_segments(root).chain(position.iter().copied())),
    None => position,
  };

  ResolvedAsset {
    new_asset_file: target.iter().collect(),
    relative_url: format!("{}{suffix}", relative_url(&document_segments, &target)),
    asset_path,
  }
}
