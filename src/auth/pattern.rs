//! Path patterns used by grants and the retry-exclusion set
//!
//! The grammar is intentionally narrow:
//! - `/api` matches exactly `/api`
//! - `/private1/*` matches `/private1` and anything below `/private1/`
//!
//! A `*` anywhere other than a trailing `/*` has no special meaning.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::{PathError, PatternError};

const WILDCARD_SUFFIX: &str = "/*";

/// A single path pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPattern {
    /// Literal path, compared byte-for-byte
    Exact(String),

    /// Prefix without the trailing `/*`; empty for the catch-all `/*`
    Prefix(String),
}

impl PathPattern {
    /// Parse one pattern
    ///
    /// Surrounding whitespace is ignored. The pattern must start with `/`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }

        match raw.strip_suffix(WILDCARD_SUFFIX) {
            Some(prefix) => Ok(PathPattern::Prefix(prefix.to_string())),
            None => Ok(PathPattern::Exact(raw.to_string())),
        }
    }

    /// Parse a comma-separated pattern list such as `/index.html,/api`
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, PatternError> {
        if raw.trim().is_empty() {
            return Err(PatternError::Empty);
        }
        raw.split(',').map(Self::parse).collect()
    }

    /// Check whether a request path matches this pattern
    ///
    /// The caller strips query and fragment. An empty path is treated as `/`.
    pub fn matches(&self, request_path: &str) -> bool {
        let path = normalize_request_path(request_path);
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => {
                path == prefix
                    || (path.starts_with(prefix.as_str())
                        && path[prefix.len()..].starts_with('/'))
            }
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(exact) => f.write_str(exact),
            PathPattern::Prefix(prefix) => write!(f, "{}{}", prefix, WILDCARD_SUFFIX),
        }
    }
}

/// Normalize a request path before matching
///
/// Only the empty path is rewritten (to `/`); trailing slashes are kept.
pub fn normalize_request_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Percent-decode a raw request path
///
/// Grants are written in decoded form (`/my file.html`), and file lookup works
/// on the same decoded string. Encoded separators, `..` segments, NUL bytes
/// and non-UTF-8 sequences are refused.
pub fn decode_request_path(raw: &str) -> Result<String, PathError> {
    let encoded_separator = raw
        .split('%')
        .skip(1)
        .any(|chunk| chunk.get(..2).is_some_and(|hex| hex.eq_ignore_ascii_case("2f")));
    if encoded_separator {
        return Err(PathError::EncodedSeparator);
    }

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| PathError::InvalidEncoding)?;
    if decoded.contains('\0') {
        return Err(PathError::InvalidEncoding);
    }
    if decoded.split('/').any(|segment| segment == "..") {
        return Err(PathError::ParentSegment);
    }

    Ok(normalize_request_path(&decoded).to_string())
}

/// Check a path against a set of patterns
pub fn matches_any(patterns: &[PathPattern], request_path: &str) -> bool {
    patterns.iter().any(|p| p.matches(request_path))
}
