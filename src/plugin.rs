//! Per-document entry point deciding which documents are rewritten.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::UserefConfig;
use crate::error::UserefError;
use crate::logger::{Logger, TracingLogger};
use crate::matcher::{GlobMatcher, PatternMatcher};
use crate::models::{Document, DocumentContent, Transformed};
use crate::rewrite::{Rewrite, UrlRewriter};
use crate::sink::OutputSink;

/// Extension identifying stylesheets.
pub const STYLESHEET_EXTENSION: &str = "css";

/// Stylesheet transform applied to each document delivered by the build pipeline.
pub struct UserefPlugin<M = GlobMatcher, L = TracingLogger> {
  config: UserefConfig,
  matcher: M,
  logger: L,
}

impl UserefPlugin {
  /// Create a plugin using glob matching and `tracing` output.
  ///
  /// Fails when the eligibility pattern is not a valid glob.
  pub fn new(config: UserefConfig) -> Result<Self, UserefError> {
    let matcher = match &config.eligibility_pattern {
      Some(pattern) => {
        GlobMatcher::for_pattern(pattern).map_err(|source| UserefError::InvalidPattern {
          pattern: pattern.clone(),
          source,
        })?
      }
      None => GlobMatcher::default(),
    };

    Ok(Self::with_collaborators(config, matcher, TracingLogger))
  }
}

impl<M: PatternMatcher, L: Logger> UserefPlugin<M, L> {
  /// Create a plugin with explicit matcher and logger implementations.
  pub fn with_collaborators(config: UserefConfig, matcher: M, logger: L) -> Self {
    Self {
      config,
      matcher,
      logger,
    }
  }

  /// Active configuration.
  pub fn config(&self) -> &UserefConfig {
    &self.config
  }

  /// Process a single document.
  ///
  /// Documents without content or without a `.css` extension are returned untouched.
  /// Streaming stylesheets are rejected.
  ///
  /// Stylesheet bytes are decoded as UTF-8 and re-encoded after rewriting. Invalid
  /// sequences become U+FFFD even when the text holds no `url()`, so unchanged output is
  /// only guaranteed for UTF-8 input.
  pub fn transform(&self, mut document: Document) -> Result<Transformed, UserefError> {
    if document.content == DocumentContent::Empty || !is_stylesheet(&document.relative_path) {
      return Ok(Transformed {
        document,
        artifacts: Vec::new(),
      });
    }

    let text = match &document.content {
      DocumentContent::Buffer(bytes) => String::from_utf8_lossy(bytes).into_owned(),
      _ => {
        return Err(UserefError::StreamingNotSupported {
          path: document.source_path.clone(),
        });
      }
    };

    let Rewrite { content, artifacts } =
      UrlRewriter::new(&self.config, &self.matcher, &self.logger).rewrite(&document, &text);
    document.content = DocumentContent::Buffer(content.into_bytes());

    Ok(Transformed {
      document,
      artifacts,
    })
  }

  /// Feed documents through [`UserefPlugin::transform`] one at a time.
  ///
  /// Each document's artifacts are pushed before the document itself. Processing stops at
  /// the first error.
  pub fn run<I, S>(&self, documents: I, sink: &mut S) -> Result<()>
  where
    I: IntoIterator<Item = Document>,
    S: OutputSink,
  {
    for document in documents {
      let source = document.source_path.clone();
      let Transformed {
        document,
        artifacts,
      } = self.transform(document)?;

      for artifact in artifacts {
        sink.push_artifact(artifact).with_context(|| {
          format!("failed to emit asset referenced in {}", source.display())
        })?;
      }
      sink
        .push_document(document)
        .with_context(|| format!("failed to emit {}", source.display()))?;
    }

    Ok(())
  }
}

fn is_stylesheet(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|extension| extension == STYLESHEET_EXTENSION)
}
