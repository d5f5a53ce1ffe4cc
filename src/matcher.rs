//! Pattern matching used to restrict which references are rewritten.

use std::cell::RefCell;

use glob::{MatchOptions, Pattern, PatternError};

/// Predicate deciding whether a reference path matches the configured eligibility pattern.
pub trait PatternMatcher {
  /// Returns `true` when `candidate` matches `pattern`.
  fn matches(&self, pattern: &str, candidate: &str) -> bool;
}

/// Glob matcher where `*` stays within a path segment and `**` crosses segments.
///
/// The most recently used pattern is kept compiled.
#[derive(Debug, Default)]
pub struct GlobMatcher {
  compiled: RefCell<Option<(String, Option<Pattern>)>>,
}

impl GlobMatcher {
  const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
  };

  /// Create a matcher with `pattern` already compiled.
  pub fn for_pattern(pattern: &str) -> Result<Self, PatternError> {
    let compiled = Pattern::new(pattern)?;
    Ok(Self {
      compiled: RefCell::new(Some((pattern.to_string(), Some(compiled)))),
    })
  }
}

impl PatternMatcher for GlobMatcher {
  fn matches(&self, pattern: &str, candidate: &str) -> bool {
    let mut compiled = self.compiled.borrow_mut();
    let stale = match compiled.as_ref() {
      Some((cached, _)) => cached != pattern,
      None => true,
    };
    if stale {
      *compiled = Some((pattern.to_string(), Pattern::new(pattern).ok()));
    }

    compiled
      .as_ref()
      .and_then(|(_, pattern)| pattern.as_ref())
      .is_some_and(|pattern| pattern.matches_with(candidate, Self::OPTIONS))
  }
}

impl<F> PatternMatcher for F
where
  F: Fn(&str, &str) -> bool,
{
  fn matches(&self, pattern: &str, candidate: &str) -> bool {
    self(pattern, candidate)
  }
}
