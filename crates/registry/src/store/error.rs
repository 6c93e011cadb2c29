use ingestjob_core::JobError;
use thiserror::Error;

/// Errors produced by [`JobStore`](super::JobStore) operations.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("job not found: {0}")]
    JobNotFound(String),
}

/// Escape a key (which may contain `/`) into a single path component.
///
/// `%` and `/` become `%25` and `%2F`, and a leading `.` becomes `%2E`, so
/// distinct keys always map to distinct names and never to `.` or `..`.
pub(super) fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '.' if i == 0 => out.push_str("%2E"),
            _ => out.push(c),
        }
    }
    out
}

/// Exact inverse of [`escape_key`]; `None` for names it cannot have produced.
pub(super) fn unescape_key(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let decoded = match rest.get(pos + 1..pos + 3)? {
            "25" => '%',
            "2F" => '/',
            "2E" => '.',
            _ => return None,
        };
        out.push(decoded);
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

/// JSON filename for a key.
pub(super) fn key_filename(key: &str) -> String {
    format!("{}.json", escape_key(key))
}

/// Reverse of [`key_filename`] for a directory entry name.
pub(super) fn filename_key(name: &str) -> Option<String> {
    name.strip_suffix(".json").and_then(unescape_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_is_reversible() {
        for key in ["plain", "a/b", "a__b", "50%/off", "%2F", ".hidden", "..", "x.y/z."] {
            let name = key_filename(key);
            assert!(!name.contains('/'), "{name}");
            assert_eq!(filename_key(&name).as_deref(), Some(key), "{name}");
        }
    }

    #[test]
    fn escape_keeps_distinct_keys_distinct() {
        assert_ne!(escape_key("a__b/c"), escape_key("a/b__c"));
        assert_ne!(escape_key("x/y"), escape_key("x__y"));
        assert_ne!(escape_key("a%2Fb"), escape_key("a/b"));
        assert_eq!(escape_key(".."), "%2E.");
    }

    #[test]
    fn foreign_names_are_ignored() {
        assert_eq!(filename_key("notes.txt"), None);
        assert_eq!(filename_key("bad%zz.json"), None);
        assert_eq!(filename_key("trail%2.json"), None);
    }
}
