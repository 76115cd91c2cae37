//! Credential store
//!
//! Holds the user → secret mapping. Secrets are either plain strings,
//! compared in constant time, or Argon2 PHC hashes produced by
//! [`hash_password`].

use std::collections::HashMap;
use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// Prefix identifying an Argon2 PHC string
const ARGON2_PREFIX: &str = "$argon2";

/// Username and password decoded from a Basic authorization header
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A stored user secret
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// Plain secret
    Plain(String),

    /// Argon2 hash in PHC format
    Hashed(String),
}

impl Secret {
    /// Classify a configured secret by its format
    ///
    /// Only a well-formed Argon2 PHC string counts as a hash; anything else,
    /// including a password that merely starts with `$argon2`, is plain.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let is_phc = raw.starts_with(ARGON2_PREFIX) && PasswordHash::new(&raw).is_ok();
        if is_phc {
            Secret::Hashed(raw)
        } else {
            Secret::Plain(raw)
        }
    }

    /// Check a supplied password against this secret
    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            Secret::Plain(expected) => bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())),
            Secret::Hashed(hash) => verify_password(candidate, hash),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Plain(_) => f.write_str("Secret::Plain(<redacted>)"),
            Secret::Hashed(_) => f.write_str("Secret::Hashed(<redacted>)"),
        }
    }
}

/// User → secret lookup table
#[derive(Debug, Default, Clone)]
pub struct CredentialStore {
    users: HashMap<String, Secret>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user
    ///
    /// Returns `false` and leaves the store unchanged if the user already exists.
    pub fn insert(&mut self, username: impl Into<String>, secret: Secret) -> bool {
        let username = username.into();
        if self.users.contains_key(&username) {
            return false;
        }
        self.users.insert(username, secret);
        true
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Verify supplied credentials
    ///
    /// Unknown users and wrong passwords both yield `false`.
    pub fn verify(&self, credentials: &Credentials) -> bool {
        self.users
            .get(&credentials.username)
            .map(|secret| secret.verify(&credentials.password))
            .unwrap_or(false)
    }
}

/// Hash a password using Argon2id
///
/// The result can be used in place of a plain password in the configuration.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::HashFailed(e.to_string()))
}

/// Verify a password against an Argon2 PHC string
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Error type for password hashing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HashError {
    /// Hashing failed
    #[error("Hash failed: {0}")]
    HashFailed(String),
}
