//! Helpers for classifying and relocating assets referenced from stylesheets.
//!
//! Filtering references, path arithmetic and the final resolution live in separate
//! submodules so each can be tested on its own.

mod filters;
mod normalize;
mod resolve;

pub use filters::should_ignore_reference;
pub use normalize::{normalize_path, normalize_segments, relative_url};
pub use resolve::{ResolvedAsset, resolve_asset_paths};
