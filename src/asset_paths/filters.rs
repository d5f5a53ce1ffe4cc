use regex::Regex;

fn reference_ignores() -> &'static [Regex] {
  use std::sync::OnceLock;

  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"^/").expect("invalid root-relative regex"),
        Regex::new(r"^data:").expect("invalid data URI regex"),
        Regex::new(r"^#").expect("invalid fragment regex"),
        Regex::new(r"(?i)^[a-z]+://").expect("invalid scheme regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a stylesheet `url()` reference must be left as written.
///
/// Root-relative paths, data URIs, fragment-only references and anything carrying a
/// `scheme://` prefix cannot be resolved against the stylesheet's directory. Empty
/// references point nowhere and are skipped as well.
pub fn should_ignore_reference(value: &str) -> bool {
  value.is_empty()
    || reference_ignores()
      .iter()
      .any(|pattern| pattern.is_match(value))
}
