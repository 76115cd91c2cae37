//! Filesystem-backed resource resolver
//!
//! Serves files below a document root. Directories are never listed: they
//! resolve to their first existing welcome file or to
//! [`ResolveError::DirectoryListing`].

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::config::ResourceConfig;
use crate::error::ResolveError;

use super::{EffectivePath, Resource, ResourceResolver};

/// Configuration for the filesystem resolver
#[derive(Debug, Clone)]
pub struct FilesystemResolverConfig {
    /// Directory served as `/`
    pub document_root: PathBuf,

    /// Welcome files tried in order for directory requests
    pub welcome_files: Vec<String>,
}

impl Default for FilesystemResolverConfig {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("htdocs"),
            welcome_files: vec!["index.html".to_string()],
        }
    }
}

impl From<&ResourceConfig> for FilesystemResolverConfig {
    fn from(config: &ResourceConfig) -> Self {
        Self {
            document_root: PathBuf::from(&config.document_root),
            welcome_files: config.welcome_files.clone(),
        }
    }
}

/// Filesystem-backed resolver
pub struct FilesystemResolver {
    config: FilesystemResolverConfig,
}

impl FilesystemResolver {
    pub fn new(config: FilesystemResolverConfig) -> Self {
        Self { config }
    }

    /// Returns the document root
    pub fn document_root(&self) -> &Path {
        &self.config.document_root
    }

    /// Map a URL path onto the document root
    ///
    /// Returns `None` for paths that would escape the root.
    fn to_fs_path(&self, request_path: &str) -> Option<PathBuf> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        let mut fs_path = self.config.document_root.clone();

        for component in relative.components() {
            match component {
                Component::Normal(part) => fs_path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return None
                }
            }
        }

        Some(fs_path)
    }

    async fn is_file(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ResourceResolver for FilesystemResolver {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn effective_path(&self, request_path: &str) -> EffectivePath {
        let Some(fs_path) = self.to_fs_path(request_path) else {
            return EffectivePath::unchanged(request_path);
        };

        let is_dir = fs::metadata(&fs_path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return EffectivePath::unchanged(request_path);
        }

        let base = if request_path.ends_with('/') {
            request_path.to_string()
        } else {
            format!("{}/", request_path)
        };

        for welcome in &self.config.welcome_files {
            if Self::is_file(&fs_path.join(welcome)).await {
                tracing::trace!(path = %request_path, welcome = %welcome, "Welcome file substituted");
                return EffectivePath {
                    path: format!("{}{}", base, welcome),
                    directory: true,
                };
            }
        }

        EffectivePath {
            path: request_path.to_string(),
            directory: true,
        }
    }

    async fn resolve(&self, path: &str) -> Result<Resource, ResolveError> {
        let fs_path = self.to_fs_path(path).ok_or(ResolveError::NotFound)?;

        let meta = match fs::metadata(&fs_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ResolveError::NotFound),
            Err(e) => return Err(e.into()),
        };
        if meta.is_dir() {
            return Err(ResolveError::DirectoryListing);
        }

        let content = fs::read(&fs_path).await?;
        let content_type = mime_guess::from_path(&fs_path)
            .first_or_octet_stream()
            .to_string();

        Ok(Resource {
            content: Bytes::from(content),
            content_type,
        })
    }
}
