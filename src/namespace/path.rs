//! Path grammar for the emulated namespace.
//!
//! A key is a `/`-joined sequence of segments; the empty sequence is the
//! bucket root. Segments allow letters, digits, spaces and `. _ - + # @`,
//! must start with a non-space character, and are never `.` or `..`.
//! All functions here are pure.

use crate::namespace::NamespaceError;

fn is_segment_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '#' | '@')
}

fn is_segment_char(c: char) -> bool {
    is_segment_start(c) || c.is_whitespace()
}

/// Validate a single path segment against the name grammar.
pub fn validate_segment(seg: &str) -> Result<(), NamespaceError> {
    let invalid = |reason: &'static str| NamespaceError::InvalidName {
        name: seg.to_string(),
        reason,
    };
    if seg.is_empty() {
        return Err(invalid("name is required"));
    }
    if seg == "." || seg == ".." {
        return Err(invalid("name cannot be '.' or '..'"));
    }
    if seg.contains('/') {
        return Err(invalid("name cannot contain '/'"));
    }
    if !seg.starts_with(is_segment_start) || !seg.chars().all(is_segment_char) {
        return Err(invalid(
            "allowed characters: letters, numbers, spaces, . _ - + # @",
        ));
    }
    Ok(())
}

/// Split a raw path string into segments, tolerating leading/trailing and
/// doubled slashes.
pub fn split_path(raw: &str) -> Vec<String> {
    raw.trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join parts into a canonical key. Each part is re-split, so a part may
/// itself contain `/`. The result has no leading or trailing slash.
pub fn join_path<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut segments: Vec<String> = Vec::new();
    for part in parts {
        segments.extend(split_path(part.as_ref()));
    }
    segments.join("/")
}

/// Last segment of a path, or the empty string for the bucket root.
pub fn basename(path: &str) -> String {
    split_path(path).pop().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["report.pdf", "2020", "a b c", "x_y-z+1#2@3", ".keep"] {
            assert!(validate_segment(name).is_ok(), "rejected {name:?}");
        }
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", ".", "..", "a/b", " leading-space", "emoji🙂", "semi;colon"] {
            assert!(validate_segment(name).is_err(), "accepted {name:?}");
        }
    }

    #[test]
    fn split_tolerates_slash_noise() {
        assert_eq!(split_path("/a//b/c/"), vec!["a", "b", "c"]);
        assert_eq!(split_path(""), Vec::<String>::new());
        assert_eq!(split_path("///"), Vec::<String>::new());
    }

    #[test]
    fn join_resplits_parts() {
        assert_eq!(join_path(["a/b", "c"]), "a/b/c");
        assert_eq!(join_path(["", "x", ""]), "x");
        assert_eq!(join_path(["/a/", "/b//c/"]), "a/b/c");
        assert_eq!(join_path(Vec::<&str>::new()), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["a/b/c", "/a//b/", "", "x", "//"] {
            let once = join_path(split_path(raw));
            let twice = join_path(split_path(&once));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn basename_of_root_is_empty() {
        assert_eq!(basename(""), "");
        assert_eq!(basename("a/b/c"), "c");
        assert_eq!(basename("/solo/"), "solo");
    }
}
