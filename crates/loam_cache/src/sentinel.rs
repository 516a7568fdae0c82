//! The torn-write integrity sentinel.
//!
//! Every valid compiled artifact ends with a fixed, newline-prefixed comment
//! marker appended after compilation and before the write. Its presence is
//! the sole corruption check: an interrupted writer leaves a file without
//! the marker. The marker is stripped on read so it can never interfere
//! with trailing content such as `//# sourceMappingURL=` directives.

/// The fixed marker appended to every compiled artifact.
pub const SENTINEL: &str = "\n// loam cache integrity sentinel 6bfe2c3a9d414c8eb7a50d5f1c9e2a47";

/// Appends the sentinel to compiled text.
pub fn append_sentinel(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + SENTINEL.len());
    out.push_str(text);
    out.push_str(SENTINEL);
    out
}

/// Strips the trailing sentinel, returning `None` when it is absent
/// (the artifact is corrupt).
pub fn strip_sentinel(text: &str) -> Option<&str> {
    text.strip_suffix(SENTINEL)
}

/// Whether the text carries the trailing sentinel.
pub fn has_sentinel(text: &str) -> bool {
    text.ends_with(SENTINEL)
}
