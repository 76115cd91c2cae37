//! Authorization decision engine
//!
//! Combines the credential store, the authorization table and the
//! retry-exclusion set into a single tri-state decision per request. The
//! engine is built once at startup and never mutated afterwards, so it can be
//! shared across requests behind an `Arc` without locking.

use crate::config::{AuthConfig, ConfigError};

use super::credentials::{CredentialStore, Credentials, Secret};
use super::exclusion::RetryExclusionSet;
use super::pattern::{normalize_request_path, PathPattern};
use super::table::AuthorizationTable;

/// Why a request was rejected without a fresh challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Missing or invalid credential on a path that must not be re-challenged
    Unauthenticated,

    /// Valid credential, but the path is outside the user's grant
    Forbidden,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Serve the request on behalf of `user`
    Allow { user: String },

    /// Ask the client for (new) credentials
    Challenge,

    /// Refuse the request
    Reject(RejectReason),
}

/// Immutable authorization engine
#[derive(Debug)]
pub struct AuthEngine {
    realm: String,
    credentials: CredentialStore,
    table: AuthorizationTable,
    exclusions: RetryExclusionSet,
    retry_on_failure: bool,
}

impl AuthEngine {
    /// Start building an engine for `realm`
    pub fn builder(realm: impl Into<String>) -> AuthEngineBuilder {
        AuthEngineBuilder::new(realm)
    }

    /// Build an engine from the `auth` configuration section
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let mut builder = Self::builder(&config.realm).retry_on_failure(config.retry_on_failure);
        for user in &config.users {
            builder = builder.add_user_path(&user.username, &user.password, &user.paths);
        }
        for path in &config.retry_excluded_paths {
            builder = builder.exclude_from_retry(path);
        }
        builder.build()
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn retry_on_failure(&self) -> bool {
        self.retry_on_failure
    }

    pub fn user_count(&self) -> usize {
        self.credentials.len()
    }

    /// Value of the `WWW-Authenticate` header sent with a challenge
    pub fn challenge_header(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }

    /// Decide what to do with a request
    ///
    /// `request_path` is the effective path (after welcome-file substitution)
    /// with query and fragment removed. `supplied` is `None` when the request
    /// carried no usable Basic credential.
    pub fn decide(&self, request_path: &str, supplied: Option<&Credentials>) -> Decision {
        let path = normalize_request_path(request_path);

        let Some(credentials) = supplied else {
            if self.exclusions.is_excluded(path) {
                return Decision::Reject(RejectReason::Unauthenticated);
            }
            return Decision::Challenge;
        };

        if !self.credentials.verify(credentials) {
            if self.retry_on_failure && !self.exclusions.is_excluded(path) {
                return Decision::Challenge;
            }
            return Decision::Reject(RejectReason::Unauthenticated);
        }

        if self.table.is_authorized(&credentials.username, path) {
            Decision::Allow {
                user: credentials.username.clone(),
            }
        } else {
            Decision::Reject(RejectReason::Forbidden)
        }
    }
}

/// Builder collecting users, grants and exclusions before validation
#[derive(Debug, Clone)]
pub struct AuthEngineBuilder {
    realm: String,
    users: Vec<(String, String, String)>,
    excluded: Vec<String>,
    retry_on_failure: bool,
}

impl AuthEngineBuilder {
    fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            users: Vec::new(),
            excluded: Vec::new(),
            retry_on_failure: false,
        }
    }

    /// Register a user with a comma-separated list of path patterns
    pub fn add_user_path(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        paths: impl Into<String>,
    ) -> Self {
        self.users
            .push((username.into(), password.into(), paths.into()));
        self
    }

    /// Re-challenge after a failed credential
    pub fn retry_on_failure(mut self, enabled: bool) -> Self {
        self.retry_on_failure = enabled;
        self
    }

    /// Never re-challenge on `path`
    pub fn exclude_from_retry(mut self, path: impl Into<String>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// Validate everything and build the engine
    pub fn build(self) -> Result<AuthEngine, ConfigError> {
        validate_realm(&self.realm)?;

        let mut credentials = CredentialStore::new();
        let mut table = AuthorizationTable::new();

        for (username, password, paths) in self.users {
            if username.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "user name must not be empty".to_string(),
                ));
            }
            if username.contains(':') {
                return Err(ConfigError::InvalidValue(format!(
                    "user name must not contain ':': {}",
                    username
                )));
            }

            let patterns = PathPattern::parse_list(&paths).map_err(|e| {
                ConfigError::InvalidValue(format!("paths for user {}: {}", username, e))
            })?;

            if !credentials.insert(username.clone(), Secret::new(password)) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate user: {}",
                    username
                )));
            }
            table.grant(username, patterns);
        }

        let exclusions = RetryExclusionSet::from_patterns(&self.excluded)
            .map_err(|e| ConfigError::InvalidValue(format!("retry excluded path: {}", e)))?;

        Ok(AuthEngine {
            realm: self.realm,
            credentials,
            table,
            exclusions,
            retry_on_failure: self.retry_on_failure,
        })
    }
}

fn validate_realm(realm: &str) -> Result<(), ConfigError> {
    if realm.trim().is_empty() {
        return Err(ConfigError::InvalidValue("realm must not be empty".to_string()));
    }
    if realm.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
        return Err(ConfigError::InvalidValue(format!(
            "realm contains characters not allowed in a header: {}",
            realm
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;

    fn test_engine(retry: bool) -> AuthEngine {
        AuthEngine::builder("private site")
            .add_user_path("user1", "pass1", "/*")
            .add_user_path("user2", "pass2", "/index.html,/api")
            .add_user_path("user3", "pass3", "/api")
            .add_user_path("user4", "pass4", "/private1/index.html")
            .add_user_path("user5", "pass5", "/private1/*")
            .retry_on_failure(retry)
            .exclude_from_retry("/favicon.ico")
            .build()
            .unwrap()
    }

    fn creds(user: &str, pass: &str) -> Credentials {
        Credentials::new(user, pass)
    }

    fn allow(user: &str) -> Decision {
        Decision::Allow {
            user: user.to_string(),
        }
    }

    // Test 1: Missing credential on a normal path is challenged
    #[test]
    fn test_missing_credential_challenged() {
        let engine = test_engine(true);
        for path in ["/", "/index.html", "/api", "/private1/index.html", ""] {
            assert_eq!(engine.decide(path, None), Decision::Challenge, "{}", path);
        }
    }

    // Test 2: Missing credential on an excluded path is rejected without challenge
    #[test]
    fn test_missing_credential_excluded_path() {
        for retry in [true, false] {
            let engine = test_engine(retry);
            assert_eq!(
                engine.decide("/favicon.ico", None),
                Decision::Reject(RejectReason::Unauthenticated)
            );
        }
    }

    // Test 3: Valid credential on a granted path is allowed
    #[test]
    fn test_valid_credential_allowed() {
        let engine = test_engine(true);

        assert_eq!(engine.decide("/anything", Some(&creds("user1", "pass1"))), allow("user1"));
        assert_eq!(engine.decide("/index.html", Some(&creds("user2", "pass2"))), allow("user2"));
        assert_eq!(engine.decide("/api", Some(&creds("user2", "pass2"))), allow("user2"));
        assert_eq!(engine.decide("/api", Some(&creds("user3", "pass3"))), allow("user3"));
        assert_eq!(
            engine.decide("/private1/index.html", Some(&creds("user4", "pass4"))),
            allow("user4")
        );
        assert_eq!(engine.decide("/private1/", Some(&creds("user5", "pass5"))), allow("user5"));
    }

    // Test 4: Valid credential outside the grant is forbidden, never challenged
    #[test]
    fn test_valid_credential_out_of_scope() {
        let engine = test_engine(true);
        let user2 = creds("user2", "pass2");

        let first = engine.decide("/other", Some(&user2));
        let second = engine.decide("/other", Some(&user2));
        assert_eq!(first, Decision::Reject(RejectReason::Forbidden));
        assert_eq!(second, first);

        assert_eq!(
            engine.decide("/index.html", Some(&creds("user3", "pass3"))),
            Decision::Reject(RejectReason::Forbidden)
        );
        assert_eq!(
            engine.decide("/private10", Some(&creds("user5", "pass5"))),
            Decision::Reject(RejectReason::Forbidden)
        );
    }

    // Test 5: Invalid credential with retry enabled is challenged again
    #[test]
    fn test_invalid_credential_retry_enabled() {
        let engine = test_engine(true);
        assert_eq!(
            engine.decide("/index.html", Some(&creds("user1", "wrong"))),
            Decision::Challenge
        );
        assert_eq!(
            engine.decide("/index.html", Some(&creds("nobody", "pass1"))),
            Decision::Challenge
        );
    }

    // Test 6: Invalid credential with retry disabled is rejected
    #[test]
    fn test_invalid_credential_retry_disabled() {
        let engine = test_engine(false);
        assert_eq!(
            engine.decide("/index.html", Some(&creds("user1", "wrong"))),
            Decision::Reject(RejectReason::Unauthenticated)
        );
        assert_eq!(
            engine.decide("/index.html", Some(&creds("nobody", "x"))),
            Decision::Reject(RejectReason::Unauthenticated)
        );
    }

    // Test 7: Invalid credential on an excluded path is rejected even with retry
    #[test]
    fn test_invalid_credential_excluded_path() {
        let engine = test_engine(true);
        assert_eq!(
            engine.decide("/favicon.ico", Some(&creds("user1", "wrong"))),
            Decision::Reject(RejectReason::Unauthenticated)
        );
    }

    // Test 8: Exclusion does not affect valid credentials
    #[test]
    fn test_exclusion_independent_of_authorization() {
        let engine = test_engine(true);
        assert_eq!(
            engine.decide("/favicon.ico", Some(&creds("user1", "pass1"))),
            allow("user1")
        );
        assert_eq!(
            engine.decide("/favicon.ico", Some(&creds("user3", "pass3"))),
            Decision::Reject(RejectReason::Forbidden)
        );
    }

    // Test 9: Unknown user and wrong password are indistinguishable
    #[test]
    fn test_unknown_user_same_as_wrong_password() {
        for retry in [true, false] {
            let engine = test_engine(retry);
            assert_eq!(
                engine.decide("/api", Some(&creds("ghost", "pass3"))),
                engine.decide("/api", Some(&creds("user3", "bad")))
            );
        }
    }

    // Test 10: Decisions are stable across repeated calls
    #[test]
    fn test_decide_is_idempotent() {
        let engine = test_engine(true);
        let cases = [
            ("/api", None),
            ("/api", Some(creds("user3", "pass3"))),
            ("/index.html", Some(creds("user3", "pass3"))),
            ("/index.html", Some(creds("user3", "bad"))),
            ("/favicon.ico", None),
        ];
        for (path, supplied) in &cases {
            let first = engine.decide(path, supplied.as_ref());
            for _ in 0..3 {
                assert_eq!(engine.decide(path, supplied.as_ref()), first);
            }
        }
    }

    // Test 11: Configuration errors fail at build time
    #[test]
    fn test_build_rejects_bad_config() {
        let dup = AuthEngine::builder("realm")
            .add_user_path("user1", "a", "/a")
            .add_user_path("user1", "b", "/b")
            .build();
        assert!(matches!(dup, Err(ConfigError::InvalidValue(msg)) if msg.contains("duplicate")));

        let empty_paths = AuthEngine::builder("realm")
            .add_user_path("user1", "a", "")
            .build();
        assert!(empty_paths.is_err());

        let relative = AuthEngine::builder("realm")
            .add_user_path("user1", "a", "api")
            .build();
        assert!(relative.is_err());

        let empty_user = AuthEngine::builder("realm")
            .add_user_path("", "a", "/a")
            .build();
        assert!(empty_user.is_err());

        let colon_user = AuthEngine::builder("realm")
            .add_user_path("a:b", "a", "/a")
            .build();
        assert!(colon_user.is_err());

        let bad_exclusion = AuthEngine::builder("realm")
            .exclude_from_retry("favicon.ico")
            .build();
        assert!(bad_exclusion.is_err());

        assert!(AuthEngine::builder("").build().is_err());
        assert!(AuthEngine::builder("bad\"realm").build().is_err());
    }

    // Test 12: from_config mirrors the builder
    #[test]
    fn test_from_config() {
        let config = AuthConfig {
            realm: "private site".to_string(),
            retry_on_failure: true,
            retry_excluded_paths: vec!["/favicon.ico".to_string()],
            users: vec![UserConfig {
                username: "user2".to_string(),
                password: "pass2".to_string(),
                paths: "/index.html,/api".to_string(),
            }],
        };

        let engine = AuthEngine::from_config(&config).unwrap();
        assert_eq!(engine.realm(), "private site");
        assert!(engine.retry_on_failure());
        assert_eq!(engine.user_count(), 1);
        assert_eq!(engine.challenge_header(), "Basic realm=\"private site\"");
        assert_eq!(engine.decide("/api", Some(&creds("user2", "pass2"))), allow("user2"));
        assert_eq!(
            engine.decide("/favicon.ico", None),
            Decision::Reject(RejectReason::Unauthenticated)
        );
    }

    // Test 13: Grants with spaces allow the decoded request path
    #[test]
    fn test_grant_with_space_allows_decoded_path() {
        let engine = AuthEngine::builder("private site")
            .add_user_path("user6", "pass6", "/my file.html")
            .build()
            .unwrap();
        let user6 = Credentials::new("user6", "pass6");

        let path = crate::auth::decode_request_path("/my%20file.html").unwrap();
        assert_eq!(
            engine.decide(&path, Some(&user6)),
            Decision::Allow {
                user: "user6".to_string()
            }
        );
        assert_eq!(
            engine.decide("/my file2.html", Some(&user6)),
            Decision::Reject(RejectReason::Forbidden)
        );
    }
}
