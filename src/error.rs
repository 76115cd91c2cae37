//! Application error types for basic-auth-gateway
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while reading credentials from a request
///
/// None of these ever reach the client: the gateway treats every one of them
/// as "no credential supplied".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingAuth,

    /// Authorization header uses a scheme other than Basic
    #[error("Unsupported authentication scheme")]
    UnsupportedScheme,

    /// Basic credentials could not be decoded
    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),
}

/// Path pattern parsing errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatternError {
    /// Pattern or pattern list is empty
    #[error("Path pattern is empty")]
    Empty,

    /// Pattern does not start with '/'
    #[error("Path pattern must start with '/': {0}")]
    NotAbsolute(String),
}

/// Request path decoding errors
///
/// Each of these is answered with 400 before authorization runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    /// Percent-decoded bytes are not UTF-8
    #[error("Request path is not valid UTF-8")]
    InvalidEncoding,

    /// Path contains an encoded `/`
    #[error("Request path contains an encoded separator")]
    EncodedSeparator,

    /// Path contains a `..` segment
    #[error("Request path contains a parent-directory segment")]
    ParentSegment,
}

/// Downstream resource resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No resource exists at the path
    #[error("Resource not found")]
    NotFound,

    /// The path is a directory without a welcome file
    #[error("Directory listing is disabled")]
    DirectoryListing,

    /// IO error while reading the resource
    #[error("Resource IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application-level error type
///
/// Aggregates the errors that can stop the gateway from starting.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
