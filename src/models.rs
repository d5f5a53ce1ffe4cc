//! Records exchanged with the surrounding build pipeline.

use std::fs;
use std::path::{Path, PathBuf};

/// Payload carried by a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
  /// No content attached (a directory entry or placeholder).
  Empty,
  /// Fully buffered bytes.
  Buffer(Vec<u8>),
  /// Content delivered as a stream; not supported by the rewriter.
  Stream,
}

/// A stylesheet (or any other file) flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
  /// Raw file content.
  pub content: DocumentContent,
  /// Absolute path of the document on disk.
  pub source_path: PathBuf,
  /// Path relative to the build root.
  pub relative_path: PathBuf,
  /// Build base directory.
  pub root_dir: PathBuf,
  /// Working directory used when deriving artifacts.
  pub cwd: PathBuf,
}

impl Document {
  /// Create a buffered document rooted at `root_dir`.
  pub fn new(
    root_dir: impl Into<PathBuf>,
    relative_path: impl Into<PathBuf>,
    content: impl Into<Vec<u8>>,
  ) -> Self {
    let root_dir = root_dir.into();
    let relative_path = relative_path.into();
    Self {
      content: DocumentContent::Buffer(content.into()),
      source_path: root_dir.join(&relative_path),
      cwd: root_dir.clone(),
      relative_path,
      root_dir,
    }
  }

  /// Load a document from `root_dir/relative_path`.
  pub fn from_path(
    root_dir: impl Into<PathBuf>,
    relative_path: impl Into<PathBuf>,
  ) -> std::io::Result<Self> {
    let root_dir = root_dir.into();
    let relative_path = relative_path.into();
    let content = fs::read(root_dir.join(&relative_path))?;
    Ok(Self::new(root_dir, relative_path, content))
  }

  /// Directory the source path is relative to.
  ///
  /// This is the source path with its relative path stripped from the end, or
  /// [`Document::root_dir`] when the relative path is not a suffix of the source path.
  pub fn source_root(&self) -> PathBuf {
    if self.relative_path.as_os_str().is_empty() || !self.source_path.ends_with(&self.relative_path)
    {
      return self.root_dir.clone();
    }

    let depth = self.relative_path.components().count();
    self
      .source_path
      .ancestors()
      .nth(depth)
      .map(Path::to_path_buf)
      .unwrap_or_else(|| self.root_dir.clone())
  }

  /// Directory containing the document on disk.
  pub fn source_dir(&self) -> &Path {
    self.source_path.parent().unwrap_or(Path::new(""))
  }
}

/// An asset discovered while rewriting a document, ready to be written by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  /// Working directory inherited from the referencing document.
  pub cwd: PathBuf,
  /// Build base directory inherited from the referencing document.
  pub root_dir: PathBuf,
  /// Absolute path the asset should be written to.
  pub destination_path: PathBuf,
  /// Absolute path the bytes were read from.
  pub source_path: PathBuf,
  /// Asset bytes copied verbatim.
  pub content: Vec<u8>,
}

impl Artifact {
  /// Destination relative to [`Artifact::root_dir`].
  pub fn relative_path(&self) -> &Path {
    self
      .destination_path
      .strip_prefix(&self.root_dir)
      .unwrap_or(&self.destination_path)
  }
}

/// A processed document together with the assets it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
  /// The document, with rewritten content when it was a stylesheet.
  pub document: Document,
  /// Unique assets discovered in the document, in first-seen order.
  pub artifacts: Vec<Artifact>,
}
