//! Scanning stylesheet text for `url()` declarations and rewriting them in a single pass.

use std::collections::BTreeMap;
use std::fs;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::asset_paths::{normalize_path, resolve_asset_paths, should_ignore_reference};
use crate::config::UserefConfig;
use crate::logger::Logger;
use crate::matcher::PatternMatcher;
use crate::models::{Artifact, Document};

fn url_declaration() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"url\((.*?)\)").expect("invalid url() regex"))
}

/// A `url(...)` occurrence found in stylesheet text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlReference<'t> {
  /// Byte range of the whole declaration within the scanned text.
  pub span: Range<usize>,
  /// The declaration exactly as written, e.g. `url("a.png")`.
  pub declaration: &'t str,
  /// Reference path with whitespace and quotes removed.
  pub path: &'t str,
  /// Opening quote character, when the argument was quoted.
  pub quote: Option<char>,
}

/// Lazily scan `text` for `url(...)` declarations.
///
/// Nested parentheses are not understood: the first `)` closes the declaration.
pub fn scan_references(text: &str) -> impl Iterator<Item = UrlReference<'_>> {
  url_declaration().captures_iter(text).filter_map(|caps| {
    let declaration = caps.get(0)?;
    let argument = caps.get(1).map_or("", |m| m.as_str());
    let (path, quote) = trim_url_value(argument);
    Some(UrlReference {
      span: declaration.range(),
      declaration: declaration.as_str(),
      path,
      quote,
    })
  })
}

/// Strip whitespace, one leading and one trailing quote, then whitespace again.
pub fn trim_url_value(value: &str) -> (&str, Option<char>) {
  let mut trimmed = value.trim();
  let quote = trimmed.chars().next().filter(|c| matches!(c, '\'' | '"'));
  if let Some(quote) = quote {
    trimmed = &trimmed[quote.len_utf8()..];
  }
  if let Some(stripped) = trimmed.strip_suffix(['\'', '"']) {
    trimmed = stripped;
  }
  (trimmed.trim(), quote)
}

/// Output of rewriting one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
  /// Stylesheet text with every resolvable reference replaced.
  pub content: String,
  /// Assets read while rewriting, unique by destination and in first-seen order.
  pub artifacts: Vec<Artifact>,
}

/// Rewrites `url()` references of a single document against the configured layout.
pub struct UrlRewriter<'a, M, L> {
  config: &'a UserefConfig,
  matcher: &'a M,
  logger: &'a L,
}

impl<'a, M: PatternMatcher, L: Logger> UrlRewriter<'a, M, L> {
  /// Create a rewriter borrowing its configuration and collaborators.
  pub fn new(config: &'a UserefConfig, matcher: &'a M, logger: &'a L) -> Self {
    Self {
      config,
      matcher,
      logger,
    }
  }

  /// Rewrite every eligible reference in `text`, the content of `document`.
  ///
  /// Only the filesystem is read; unreadable assets are logged and their declarations
  /// are kept verbatim.
  pub fn rewrite(&self, document: &Document, text: &str) -> Rewrite {
    let mut content = String::with_capacity(text.len());
    let mut artifacts = Vec::new();
    let mut claimed: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    let mut cursor = 0;

    for reference in scan_references(text) {
      content.push_str(&text[cursor..reference.span.start]);
      let replacement = self
        .rewrite_reference(document, &reference)
        .and_then(|(new_url, artifact)| {
          self
            .claim_destination(document, &mut claimed, &mut artifacts, artifact)
            .then_some(new_url)
        });
      content.push_str(replacement.as_deref().unwrap_or(reference.declaration));
      cursor = reference.span.end;
    }
    content.push_str(&text[cursor..]);

    Rewrite { content, artifacts }
  }

  /// Record `artifact` unless its destination is already taken.
  ///
  /// A destination seen before with the same source is shared. One claimed by a different
  /// source is refused so the reference keeps pointing at its own file.
  fn claim_destination(
    &self,
    document: &Document,
    claimed: &mut BTreeMap<PathBuf, PathBuf>,
    artifacts: &mut Vec<Artifact>,
    artifact: Artifact,
  ) -> bool {
    let relative = artifact.relative_path().to_path_buf();
    match claimed.get(&relative) {
      Some(source) if *source == artifact.source_path => true,
      Some(source) => {
        self.logger.warn(&format!(
          "Asset file \"{}\" referenced in \"{}\" would overwrite \"{}\" at \"{}\". Ignoring.",
          artifact.source_path.display(),
          document.source_path.display(),
          source.display(),
          artifact.destination_path.display()
        ));
        false
      }
      None => {
        claimed.insert(relative, artifact.source_path.clone());
        artifacts.push(artifact);
        true
      }
    }
  }

  fn rewrite_reference(
    &self,
    document: &Document,
    reference: &UrlReference<'_>,
  ) -> Option<(String, Artifact)> {
    let base_dir = self.config.base_dir_for(reference.path);
    if base_dir.is_none() && !self.is_eligible(reference.path) {
      return None;
    }

    let resolved = resolve_asset_paths(&document.relative_path, reference.path, self.config);
    let source_path = match base_dir {
      Some(base) => normalize_path(&base.join(resolved.asset_path.trim_start_matches('/'))),
      None => normalize_path(&document.source_dir().join(&resolved.asset_path)),
    };
    let destination_path = document.source_root().join(&resolved.new_asset_file);

    let content = match fs::read(&source_path) {
      Ok(content) => content,
      Err(err) => {
        self.logger.warn(&format!(
          "Can't read asset file \"{}\" referenced in \"{}\" ({err}). Ignoring.",
          source_path.display(),
          document.source_path.display()
        ));
        return None;
      }
    };
    self
      .logger
      .info(&format!("Read asset file \"{}\"", source_path.display()));

    let artifact = Artifact {
      cwd: document.cwd.clone(),
      root_dir: document.root_dir.clone(),
      destination_path,
      source_path,
      content,
    };
    Some((resolved.new_url(reference.quote), artifact))
  }

  fn is_eligible(&self, path: &str) -> bool {
    if should_ignore_reference(path) {
      return false;
    }

    match &self.config.eligibility_pattern {
      Some(pattern) => self.matcher.matches(pattern, path),
      None => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::logger::{CapturingLogger, LogLevel};
  use crate::matcher::GlobMatcher;
  use std::path::Path;
  use tempfile::tempdir;

  const HOME_CSS: &str = "src/css/page/home.css";

  fn write_asset(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
  }

  fn rewrite_with(config: &UserefConfig, document: &Document) -> (Rewrite, CapturingLogger) {
    let logger = CapturingLogger::default();
    let text = match &document.content {
      crate::models::DocumentContent::Buffer(bytes) => String::from_utf8(bytes.clone()).unwrap(),
      _ => unreachable!("tests only build buffered documents"),
    };
    let rewrite = UrlRewriter::new(config, &GlobMatcher::default(), &logger).rewrite(document, &text);
    (rewrite, logger)
  }

  #[test]
  fn trims_quotes_and_whitespace() {
    assert_eq!(trim_url_value("  ' a.png '  "), ("a.png", Some('\'')));
    assert_eq!(trim_url_value("\"b.png\""), ("b.png", Some('"')));
    assert_eq!(trim_url_value(" c.png "), ("c.png", None));
    assert_eq!(trim_url_value("\""), ("", Some('"')));
  }

  #[test]
  fn scans_each_declaration_up_to_the_first_paren() {
    let text = "a{background:url( 'x.png' ) , url(y.png)}";
    let references: Vec<UrlReference<'_>> = scan_references(text).collect();

    assert_eq!(references.len(), 2);
    assert_eq!(references[0].declaration, "url( 'x.png' )");
    assert_eq!(references[0].path, "x.png");
    assert_eq!(references[0].quote, Some('\''));
    assert_eq!(&text[references[1].span.clone()], "url(y.png)");
    assert_eq!(references[1].quote, None);
  }

  #[test]
  fn text_without_references_is_unchanged() {
    let temp = tempdir().unwrap();
    let css = "body { color: red; }\n/* no assets here */";
    let document = Document::new(temp.path(), HOME_CSS, css);

    let (rewrite, logger) = rewrite_with(&UserefConfig::default(), &document);

    assert_eq!(rewrite.content, css);
    assert!(rewrite.artifacts.is_empty());
    assert!(logger.messages().is_empty());
  }

  #[test]
  fn reads_asset_relative_to_stylesheet_and_keeps_query() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_asset(root, "src/images/foo.png", b"png-bytes");
    let css = "body { background: url('../../images/foo.png?a=123'); }";
    let document = Document::new(root, HOME_CSS, css);

    let (rewrite, logger) = rewrite_with(&UserefConfig::default(), &document);

    assert_eq!(rewrite.content, css);
    assert_eq!(rewrite.artifacts.len(), 1);
    let artifact = &rewrite.artifacts[0];
    assert_eq!(artifact.source_path, root.join("src/images/foo.png"));
    assert_eq!(artifact.destination_path, root.join("src/images/foo.png"));
    assert_eq!(artifact.root_dir, root);
    assert_eq!(artifact.cwd, root);
    assert_eq!(artifact.content, b"png-bytes");
    assert_eq!(logger.at_level(LogLevel::Info).len(), 1);
  }

  #[test]
  fn root_override_moves_assets_and_rewrites_urls() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_asset(root, "src/img/a.png", b"a");
    let css = "a { background: url(\"../../img/a.png?x=1\") }";
    let document = Document::new(root, HOME_CSS, css);
    let config = UserefConfig {
      root_dir_override: "assets".into(),
      ..UserefConfig::default()
    };

    let (rewrite, _) = rewrite_with(&config, &document);

    assert_eq!(
      rewrite.content,
      "a { background: url(\"../../../assets/src/img/a.png?x=1\") }"
    );
    assert_eq!(
      rewrite.artifacts[0].destination_path,
      root.join("assets/src/img/a.png")
    );
    assert_eq!(
      rewrite.artifacts[0].relative_path(),
      ["assets", "src", "img", "a.png"].iter().collect::<PathBuf>()
    );
  }

  #[test]
  fn duplicate_references_yield_one_artifact() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_asset(root, "src/css/icons.svg", b"<svg/>");
    let css = ".a{background:url(../icons.svg#a)}.b{background:url('../icons.svg#b')}";
    let document = Document::new(root, HOME_CSS, css);
    let config = UserefConfig {
      root_dir_override: "out".into(),
      ..UserefConfig::default()
    };

    let (rewrite, _) = rewrite_with(&config, &document);

    assert_eq!(
      rewrite.content,
      ".a{background:url(../../../out/src/css/icons.svg#a)}\
       .b{background:url('../../../out/src/css/icons.svg#b')}"
    );
    assert_eq!(rewrite.artifacts.len(), 1);
  }

  #[test]
  fn ignored_references_pass_through() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_asset(root, "images/a.png", b"a");
    let css = "a{b:url(/images/a.png);c:url(data:image/png;base64,AAA=);\
               d:url(#grad);e:url(https://cdn.example.com/a.png)}";
    let document = Document::new(root, HOME_CSS, css);

    let (rewrite, logger) = rewrite_with(&UserefConfig::default(), &document);

    assert_eq!(rewrite.content, css);
    assert!(rewrite.artifacts.is_empty());
    assert!(logger.messages().is_empty());
  }

  #[test]
  fn base_dir_override_processes_root_relative_references() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("site");
    let vendor_base = temp.path().join("third_party");
    write_asset(&vendor_base, "vendor/img/logo.png", b"logo");
    let css = "h1{background:url(/vendor/img/logo.png)}";
    let document = Document::new(&root, "css/home.css", css);
    let mut config = UserefConfig::default();
    config
      .absolute_base_map
      .insert("vendor".into(), vendor_base.clone());

    let (rewrite, _) = rewrite_with(&config, &document);

    assert_eq!(rewrite.content, "h1{background:url(../vendor/img/logo.png)}");
    assert_eq!(rewrite.artifacts.len(), 1);
    assert_eq!(
      rewrite.artifacts[0].source_path,
      vendor_base.join("vendor/img/logo.png")
    );
    assert_eq!(
      rewrite.artifacts[0].destination_path,
      root.join("vendor/img/logo.png")
    );
  }

  #[test]
  fn missing_assets_are_logged_and_left_alone() {
    let temp = tempdir().unwrap();
    let css = "a{background:url(missing.png)}";
    let document = Document::new(temp.path(), HOME_CSS, css);

    let (rewrite, logger) = rewrite_with(&UserefConfig::default(), &document);

    assert_eq!(rewrite.content, css);
    assert!(rewrite.artifacts.is_empty());
    let warnings = logger.at_level(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("missing.png"));
    assert!(warnings[0].contains("home.css"));
  }

  #[test]
  fn eligibility_pattern_filters_references() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_asset(root, "src/css/page/a.png", b"a");
    write_asset(root, "src/css/page/b.gif", b"b");
    let css = "x{a:url(a.png);b:url(b.gif)}";
    let document = Document::new(root, HOME_CSS, css);
    let config = UserefConfig {
      root_dir_override: "assets".into(),
      eligibility_pattern: Some("*.png".into()),
      ..UserefConfig::default()
    };

    let (rewrite, _) = rewrite_with(&config, &document);

    assert_eq!(
      rewrite.content,
      "x{a:url(../../../assets/src/css/page/a.png);b:url(b.gif)}"
    );
    assert_eq!(rewrite.artifacts.len(), 1);
  }

  #[test]
  fn parent_references_under_root_override_keep_their_own_file() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("site");
    write_asset(temp.path(), "shared/a.png", b"OUTSIDE");
    write_asset(&root, "shared/a.png", b"INSIDE");
    let css = "a{b:url(../shared/a.png);c:url(shared/a.png)}";
    let document = Document::new(&root, "home.css", css);
    let config = UserefConfig {
      root_dir_override: "out".into(),
      ..UserefConfig::default()
    };

    let (rewrite, _) = rewrite_with(&config, &document);

    assert_eq!(
      rewrite.content,
      "a{b:url(shared/a.png);c:url(out/shared/a.png)}"
    );
    assert_eq!(rewrite.artifacts.len(), 2);
    assert_eq!(rewrite.artifacts[0].content, b"OUTSIDE");
    assert_eq!(rewrite.artifacts[0].destination_path, root.join("shared/a.png"));
    assert_eq!(rewrite.artifacts[1].content, b"INSIDE");
    assert_eq!(
      rewrite.artifacts[1].destination_path,
      root.join("out/shared/a.png")
    );
  }

  #[test]
  fn conflicting_sources_do_not_share_a_destination() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("site");
    write_asset(temp.path(), "out/a.png", b"OUTSIDE");
    write_asset(&root, "a.png", b"INSIDE");
    let css = "a{b:url(../out/a.png);c:url(a.png)}";
    let document = Document::new(&root, "home.css", css);
    let config = UserefConfig {
      root_dir_override: "out".into(),
      ..UserefConfig::default()
    };

    let (rewrite, logger) = rewrite_with(&config, &document);

    assert_eq!(rewrite.content, "a{b:url(out/a.png);c:url(a.png)}");
    assert_eq!(rewrite.artifacts.len(), 1);
    assert_eq!(rewrite.artifacts[0].content, b"OUTSIDE");
    let warnings = logger.at_level(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("would overwrite"));
  }
}
