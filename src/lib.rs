#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod logger;
pub mod matcher;
pub mod models;
pub mod plugin;
pub mod rewrite;
pub mod sink;

pub use config::UserefConfig;
pub use error::UserefError;
pub use logger::{CapturingLogger, Logger, TracingLogger};
pub use matcher::{GlobMatcher, PatternMatcher};
pub use models::{Artifact, Document, DocumentContent, Transformed};
pub use plugin::UserefPlugin;
pub use rewrite::{Rewrite, UrlRewriter, scan_references};
pub use sink::{DirectorySink, MemorySink, OutputSink};
