//! Path authorization table
//!
//! Maps each user to the patterns they are granted.

use std::collections::HashMap;

use super::pattern::{matches_any, PathPattern};

/// User → granted path patterns
#[derive(Debug, Default, Clone)]
pub struct AuthorizationTable {
    grants: HashMap<String, Vec<PathPattern>>,
}

impl AuthorizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add patterns to a user's grant
    pub fn grant(&mut self, username: impl Into<String>, patterns: Vec<PathPattern>) {
        self.grants
            .entry(username.into())
            .or_default()
            .extend(patterns);
    }

    /// Patterns granted to a user, if any
    pub fn patterns_for(&self, username: &str) -> Option<&[PathPattern]> {
        self.grants.get(username).map(Vec::as_slice)
    }

    /// Check whether `username` may access `request_path`
    ///
    /// Users without a grant are never authorized.
    pub fn is_authorized(&self, username: &str, request_path: &str) -> bool {
        self.grants
            .get(username)
            .map(|patterns| matches_any(patterns, request_path))
            .unwrap_or(false)
    }
}
