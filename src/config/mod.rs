//! Configuration for worker nodes and the distributor
//!
//! Node settings can come from defaults, a TOML file or `FLAGSHARD_*`
//! environment variables; the CLI applies its own overrides on top.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::archive::{DEFAULT_ARCHIVE_NAME, DEFAULT_ENTRY_NAME};

// ============================================================================
// Errors
// ============================================================================

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Node Configuration
// ============================================================================

/// Length bounds for ingested shard fields, counted in characters after trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    pub zip_min: usize,
    pub zip_max: usize,
    pub web_max: usize,
    pub curl_max: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            zip_min: 1,
            zip_max: 4096,
            web_max: 1024,
            curl_max: 1024,
        }
    }
}

/// Configuration for a worker node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Newline separated password candidates
    pub wordlist_path: PathBuf,

    /// Drop wordlist lines that are not printable ASCII
    pub ascii_only_wordlist: bool,

    /// Directory holding the archive
    pub archive_dir: PathBuf,

    /// Archive file name inside `archive_dir`
    pub archive_name: String,

    /// Name of the entry inside the archive
    pub entry_name: String,

    /// Ingestion field bounds
    pub limits: FieldLimits,

    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,

    /// Enable CORS on all routes
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            wordlist_path: PathBuf::from("./rockyou.txt"),
            ascii_only_wordlist: true,
            archive_dir: PathBuf::from("./secret"),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            entry_name: DEFAULT_ENTRY_NAME.to_string(),
            limits: FieldLimits::default(),
            max_body_bytes: 64 * 1024,
            enable_cors: false,
            enable_request_logging: true,
        }
    }
}

impl NodeConfig {
    /// Create a new config builder
    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::default()
    }

    /// Load configuration from `FLAGSHARD_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("FLAGSHARD_BIND") {
            config.bind_address = parse_addr(&addr)?;
        }
        if let Ok(path) = std::env::var("FLAGSHARD_WORDLIST") {
            config.wordlist_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("FLAGSHARD_ARCHIVE_DIR") {
            config.archive_dir = PathBuf::from(dir);
        }
        if let Ok(name) = std::env::var("FLAGSHARD_ARCHIVE_NAME") {
            config.archive_name = name;
        }
        if let Ok(name) = std::env::var("FLAGSHARD_ENTRY_NAME") {
            config.entry_name = name;
        }
        if let Some(flag) = env_bool("FLAGSHARD_ASCII_ONLY") {
            config.ascii_only_wordlist = flag;
        }
        if let Some(flag) = env_bool("FLAGSHARD_REQUEST_LOGGING") {
            config.enable_request_logging = flag;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive_name.is_empty() || self.archive_name.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                "archive_name",
                "Must be a plain, non-empty file name",
            ));
        }

        if self.entry_name.is_empty() {
            return Err(ConfigError::invalid("entry_name", "Must not be empty"));
        }

        if self.limits.zip_max == 0 || self.limits.zip_min > self.limits.zip_max {
            return Err(ConfigError::invalid(
                "limits.zip_max",
                "Must be positive and not below zip_min",
            ));
        }

        if self.max_body_bytes == 0 {
            return Err(ConfigError::invalid("max_body_bytes", "Must be greater than 0"));
        }

        Ok(())
    }

    /// Full path of the archive
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.archive_dir.join(&self.archive_name)
    }
}

/// Builder for NodeConfig
#[derive(Debug, Default)]
pub struct NodeConfigBuilder {
    bind_address: Option<SocketAddr>,
    wordlist_path: Option<PathBuf>,
    ascii_only_wordlist: Option<bool>,
    archive_dir: Option<PathBuf>,
    archive_name: Option<String>,
    entry_name: Option<String>,
    limits: Option<FieldLimits>,
    max_body_bytes: Option<usize>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
}

impl NodeConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(parse_addr(addr)?);
        Ok(self)
    }

    /// Set wordlist path
    pub fn wordlist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wordlist_path = Some(path.into());
        self
    }

    /// Keep or drop non-ASCII wordlist lines
    pub fn ascii_only_wordlist(mut self, enable: bool) -> Self {
        self.ascii_only_wordlist = Some(enable);
        self
    }

    /// Set archive directory
    pub fn archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Set archive file name
    pub fn archive_name(mut self, name: impl Into<String>) -> Self {
        self.archive_name = Some(name.into());
        self
    }

    /// Set archive entry name
    pub fn entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = Some(name.into());
        self
    }

    /// Set field limits
    pub fn limits(mut self, limits: FieldLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set body size limit
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    /// Enable/disable CORS
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Build the config
    pub fn build(self) -> Result<NodeConfig, ConfigError> {
        let defaults = NodeConfig::default();
        let config = NodeConfig {
            bind_address: self.bind_address.unwrap_or(defaults.bind_address),
            wordlist_path: self.wordlist_path.unwrap_or(defaults.wordlist_path),
            ascii_only_wordlist: self
                .ascii_only_wordlist
                .unwrap_or(defaults.ascii_only_wordlist),
            archive_dir: self.archive_dir.unwrap_or(defaults.archive_dir),
            archive_name: self.archive_name.unwrap_or(defaults.archive_name),
            entry_name: self.entry_name.unwrap_or(defaults.entry_name),
            limits: self.limits.unwrap_or(defaults.limits),
            max_body_bytes: self.max_body_bytes.unwrap_or(defaults.max_body_bytes),
            enable_cors: self.enable_cors.unwrap_or(defaults.enable_cors),
            enable_request_logging: self
                .enable_request_logging
                .unwrap_or(defaults.enable_request_logging),
        };

        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Distributor Configuration
// ============================================================================

/// Configuration for the distributor's outbound requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributorConfig {
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// User agent sent to nodes
    pub user_agent: String,

    /// Path of the ingestion endpoint on every node
    pub ingest_path: String,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            user_agent: format!("flagshard/{}", env!("CARGO_PKG_VERSION")),
            ingest_path: "/set-config".to_string(),
        }
    }
}

impl DistributorConfig {
    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "request_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if !self.ingest_path.starts_with('/') {
            return Err(ConfigError::invalid("ingest_path", "Must start with '/'"));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    addr.parse()
        .map_err(|_| ConfigError::invalid("bind_address", format!("Invalid address: {addr}")))
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
