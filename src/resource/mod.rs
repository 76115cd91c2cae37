//! Downstream resource resolution
//!
//! The gateway only decides whether a request may proceed. Turning an
//! allowed path into bytes is delegated to a [`ResourceResolver`].

pub mod filesystem;

pub use filesystem::{FilesystemResolver, FilesystemResolverConfig};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ResolveError;

/// A resolved resource ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub content: Bytes,
    pub content_type: String,
}

/// The path that authorization and resolution operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePath {
    /// Request path, with the welcome file appended for directories
    pub path: String,

    /// Whether the request path named a directory
    pub directory: bool,
}

impl EffectivePath {
    /// A path that is used as requested
    pub fn unchanged(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            directory: false,
        }
    }
}

/// Trait for downstream resource resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Returns the name of this resolver
    fn name(&self) -> &str;

    /// Apply welcome-file substitution to a request path
    ///
    /// Must be called before authorization so that grants are checked against
    /// the file that will actually be served.
    async fn effective_path(&self, request_path: &str) -> EffectivePath;

    /// Load the resource at an effective path
    async fn resolve(&self, path: &str) -> Result<Resource, ResolveError>;
}
