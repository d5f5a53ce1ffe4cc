use std::path::{Component, Path, PathBuf};

/// Split a path written with either separator into its segments.
pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
  path.split(['/', '\\'])
}

/// Collapse `.` and empty segments and fold `..` into its parent where possible.
///
/// `..` segments that climb above the first segment are kept at the front.
pub fn normalize_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
  let mut normalized: Vec<&str> = Vec::new();
  for segment in segments {
    match segment {
      "" | "." => {}
      ".." => match normalized.last() {
        Some(&last) if last != ".." => {
          normalized.pop();
        }
        _ => normalized.push(".."),
      },
      other => normalized.push(other),
    }
  }
  normalized
}

/// Shortest forward-slash path leading from directory `from_dir` to `target`.
///
/// Both inputs are expected to be normalised. A target equal to the directory itself
/// yields `"."`.
pub fn relative_url(from_dir: &[&str], target: &[&str]) -> String {
  let common = from_dir
    .iter()
    .zip(target)
    .take_while(|(left, right)| left == right)
    .count();

  let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
  parts.extend_from_slice(&target[common..]);

  if parts.is_empty() {
    ".".to_string()
  } else {
    parts.join("/")
  }
}

/// Lexically normalise a filesystem path without touching the disk.
///
/// `..` never climbs above a root; on relative paths leading `..` components are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  let mut depth = 0usize;

  for component in path.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
      Component::CurDir => {}
      Component::ParentDir => {
        if depth > 0 {
          normalized.pop();
          depth -= 1;
        } else if !normalized.has_root() {
          normalized.push("..");
        }
      }
      Component::Normal(part) => {
        normalized.push(part);
        depth += 1;
      }
    }
  }

  normalized
}
