//! Configuration management for basic-auth-gateway
//!
//! This module handles loading, parsing, and validating application configuration
//! from YAML files and environment variables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Static resource configuration
    #[serde(default)]
    pub resources: ResourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // First, expand environment variables in the YAML string
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix BASIC_AUTH_GATEWAY_
    ///
    /// Users cannot be declared this way; use a configuration file for grants.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("BASIC_AUTH_GATEWAY_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("BASIC_AUTH_GATEWAY_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid port number".to_string()))?;
        }

        if let Ok(realm) = std::env::var("BASIC_AUTH_GATEWAY_AUTH_REALM") {
            config.auth.realm = realm;
        }
        if let Ok(retry) = std::env::var("BASIC_AUTH_GATEWAY_AUTH_RETRY_ON_FAILURE") {
            config.auth.retry_on_failure = retry.parse().map_err(|_| {
                ConfigError::Parse(format!("Invalid retry_on_failure flag: {}", retry))
            })?;
        }

        if let Ok(root) = std::env::var("BASIC_AUTH_GATEWAY_RESOURCES_DOCUMENT_ROOT") {
            config.resources.document_root = root;
        }

        if let Ok(level) = std::env::var("BASIC_AUTH_GATEWAY_LOGGING_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Check values that serde cannot check on its own
    ///
    /// Auth grants are validated when the engine is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resources.document_root.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "resources.document_root".to_string(),
            ));
        }
        for welcome in &self.resources.welcome_files {
            if welcome.trim().is_empty() || welcome.contains('/') || welcome == ".." {
                return Err(ConfigError::InvalidValue(format!(
                    "welcome file must be a plain file name: {:?}",
                    welcome
                )));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Realm announced in `WWW-Authenticate`
    #[serde(default = "default_realm")]
    pub realm: String,

    /// Re-challenge clients that sent wrong credentials
    #[serde(default = "default_retry_on_failure")]
    pub retry_on_failure: bool,

    /// Paths that are never re-challenged
    #[serde(default = "default_retry_excluded_paths")]
    pub retry_excluded_paths: Vec<String>,

    /// Users and their grants
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            retry_on_failure: default_retry_on_failure(),
            retry_excluded_paths: default_retry_excluded_paths(),
            users: Vec::new(),
        }
    }
}

fn default_realm() -> String {
    "private site".to_string()
}

fn default_retry_on_failure() -> bool {
    true
}

fn default_retry_excluded_paths() -> Vec<String> {
    vec!["/favicon.ico".to_string()]
}

/// A user entry
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct UserConfig {
    pub username: String,

    /// Plain password or Argon2 PHC hash
    pub password: String,

    /// Comma-separated path patterns, e.g. `/index.html,/api`
    pub paths: String,
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("paths", &self.paths)
            .finish()
    }
}

/// Static resource configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceConfig {
    /// Directory served as `/`
    #[serde(default = "default_document_root")]
    pub document_root: String,

    /// File names tried, in order, when a directory is requested
    #[serde(default = "default_welcome_files")]
    pub welcome_files: Vec<String>,

    /// Cache-Control value forced on every allowed response (empty disables)
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            document_root: default_document_root(),
            welcome_files: default_welcome_files(),
            cache_control: default_cache_control(),
        }
    }
}

fn default_document_root() -> String {
    "htdocs".to_string()
}

fn default_welcome_files() -> Vec<String> {
    vec!["index.html".to_string()]
}

fn default_cache_control() -> String {
    "no-store,no-cache,must-revalidate".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (`json` or `pretty`)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
