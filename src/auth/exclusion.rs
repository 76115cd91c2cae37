//! Retry-exclusion set
//!
//! Paths listed here never receive a fresh challenge after a missing or
//! failed credential, which keeps browsers from looping on assets such as
//! `/favicon.ico`.

use crate::error::PatternError;

use super::pattern::{matches_any, PathPattern};

#[derive(Debug, Default, Clone)]
pub struct RetryExclusionSet {
    patterns: Vec<PathPattern>,
}

impl RetryExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from raw pattern strings
    pub fn from_patterns<I, S>(raw: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raw
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn insert(&mut self, pattern: PathPattern) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    pub fn is_excluded(&self, request_path: &str) -> bool {
        matches_any(&self.patterns, request_path)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
