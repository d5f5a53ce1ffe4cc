//! Destinations for processed documents and the assets they reference.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use same_file::is_same_file;

use crate::asset_paths::normalize_path;
use crate::models::{Artifact, Document, DocumentContent};

/// Receives the records produced by [`crate::UserefPlugin::run`].
pub trait OutputSink {
  /// Accept an asset discovered in a stylesheet.
  fn push_artifact(&mut self, artifact: Artifact) -> Result<()>;
  /// Accept a processed document.
  fn push_document(&mut self, document: Document) -> Result<()>;
}

/// Collects every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
  /// Documents in the order they were pushed.
  pub documents: Vec<Document>,
  /// Artifacts in the order they were pushed.
  pub artifacts: Vec<Artifact>,
}

impl OutputSink for MemorySink {
  fn push_artifact(&mut self, artifact: Artifact) -> Result<()> {
    self.artifacts.push(artifact);
    Ok(())
  }

  fn push_document(&mut self, document: Document) -> Result<()> {
    self.documents.push(document);
    Ok(())
  }
}

/// Writes records below an output directory at their root-relative paths.
#[derive(Debug)]
pub struct DirectorySink {
  output_dir: PathBuf,
  written: Vec<PathBuf>,
}

impl DirectorySink {
  /// Create a sink writing below `output_dir`.
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      output_dir: output_dir.into(),
      written: Vec::new(),
    }
  }

  /// Files written so far.
  pub fn written(&self) -> &[PathBuf] {
    &self.written
  }

  /// Resolve `relative` below the output directory, refusing paths that leave it.
  fn destination_for(&self, relative: &Path) -> Result<PathBuf> {
    let output_dir = normalize_path(&self.output_dir);
    let destination = normalize_path(&output_dir.join(relative));
    if !destination.starts_with(&output_dir) || destination == output_dir {
      bail!(
        "refusing to write {} outside of {}",
        relative.display(),
        self.output_dir.display()
      );
    }
    Ok(destination)
  }

  fn write(&mut self, destination: PathBuf, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&destination, bytes)
      .with_context(|| format!("failed to write {}", destination.display()))?;
    self.written.push(destination);
    Ok(())
  }
}

impl OutputSink for DirectorySink {
  fn push_artifact(&mut self, artifact: Artifact) -> Result<()> {
    let destination = self
      .destination_for(artifact.relative_path())
      .with_context(|| format!("cannot place asset {}", artifact.source_path.display()))?;
    if destination.exists() && is_same_file(&artifact.source_path, &destination)? {
      return Ok(());
    }
    self.write(destination, &artifact.content)
  }

  fn push_document(&mut self, document: Document) -> Result<()> {
    match &document.content {
      DocumentContent::Empty => Ok(()),
      DocumentContent::Buffer(bytes) => {
        let destination = self
          .destination_for(&document.relative_path)
          .with_context(|| format!("cannot place {}", document.source_path.display()))?;
        self.write(destination, bytes)
      }
      DocumentContent::Stream => bail!(
        "cannot write streaming document {}",
        document.source_path.display()
      ),
    }
  }
}
