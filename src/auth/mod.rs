//! Authentication and authorization for basic-auth-gateway
//!
//! This module provides:
//! - Basic authorization header parsing
//! - Credential store (plain or Argon2-hashed secrets)
//! - Path patterns and per-user grants
//! - Retry-exclusion set
//! - The decision engine combining all of the above

pub mod basic;
pub mod credentials;
pub mod engine;
pub mod exclusion;
pub mod pattern;
pub mod table;

pub use basic::{credentials_from_headers, parse_basic_auth};
pub use credentials::{hash_password, verify_password, CredentialStore, Credentials, HashError, Secret};
pub use engine::{AuthEngine, AuthEngineBuilder, Decision, RejectReason};
pub use exclusion::RetryExclusionSet;
pub use pattern::{decode_request_path, normalize_request_path, PathPattern};
pub use table::AuthorizationTable;
