//! Server configuration.
//!
//! Loads and validates configuration from a YAML file or environment variables.

use kvgate_store::EtcdStoreConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration.
///
/// Example YAML:
/// ```yaml
/// listen_addr: "127.0.0.1:4242"
/// store:
///   backend: etcd
///   endpoints: ["127.0.0.1:4243", "127.0.0.1:4244", "127.0.0.1:4245"]
///   dial_timeout_ms: 5000
/// cors:
///   enabled: true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Key-value store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Cross-origin configuration
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            store: StoreConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// Which [`KvStore`](kvgate_store::KvStore) implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Etcd,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "etcd" => Ok(Backend::Etcd),
            "memory" => Ok(Backend::Memory),
            other => Err(ConfigError::InvalidField(format!(
                "Unknown backend '{}' (expected etcd or memory)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend kind
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// etcd endpoints
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Connection establishment timeout in milliseconds
    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,

    /// Per-request timeout in milliseconds (client default when unset)
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoints: default_endpoints(),
            dial_timeout_ms: default_dial_timeout_ms(),
            request_timeout_ms: None,
        }
    }
}

impl StoreConfig {
    /// Connection settings for the etcd client.
    pub fn etcd(&self) -> EtcdStoreConfig {
        EtcdStoreConfig {
            endpoints: self.endpoints.clone(),
            dial_timeout: Duration::from_millis(self.dial_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Attach CORS headers and answer preflight requests
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:4242".to_string()
}

fn default_backend() -> Backend {
    Backend::Etcd
}

fn default_endpoints() -> Vec<String> {
    vec![
        "127.0.0.1:4243".to_string(),
        "127.0.0.1:4244".to_string(),
        "127.0.0.1:4245".to_string(),
    ]
}

fn default_dial_timeout_ms() -> u64 {
    5000
}

fn default_cors_enabled() -> bool {
    true
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Supported variables (all optional):
    /// - KVGATE_LISTEN_ADDR
    /// - KVGATE_BACKEND (etcd | memory)
    /// - KVGATE_ENDPOINTS (comma-separated)
    /// - KVGATE_DIAL_TIMEOUT_MS
    /// - KVGATE_REQUEST_TIMEOUT_MS
    /// - KVGATE_ENABLE_CORS
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(addr) = lookup("KVGATE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(backend) = lookup("KVGATE_BACKEND") {
            config.store.backend = backend.parse()?;
        }

        if let Some(endpoints) = lookup("KVGATE_ENDPOINTS") {
            config.store.endpoints = endpoints
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ms) = lookup("KVGATE_DIAL_TIMEOUT_MS") {
            config.store.dial_timeout_ms = parse_millis("KVGATE_DIAL_TIMEOUT_MS", &ms)?;
        }

        if let Some(ms) = lookup("KVGATE_REQUEST_TIMEOUT_MS") {
            config.store.request_timeout_ms = Some(parse_millis("KVGATE_REQUEST_TIMEOUT_MS", &ms)?);
        }

        if let Some(cors) = lookup("KVGATE_ENABLE_CORS") {
            config.cors.enabled = cors == "1" || cors.eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidField(format!("Invalid listen_addr: {}", e)))?;

        if self.store.backend == Backend::Etcd {
            if self.store.endpoints.is_empty() {
                return Err(ConfigError::InvalidField(
                    "etcd backend requires at least one endpoint".to_string(),
                ));
            }

            if self.store.endpoints.iter().any(|e| e.trim().is_empty()) {
                return Err(ConfigError::InvalidField(
                    "endpoints cannot contain empty entries".to_string(),
                ));
            }
        }

        if self.store.dial_timeout_ms == 0 {
            return Err(ConfigError::InvalidField(
                "dial_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.store.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidField(
                "request_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed listen address. Only meaningful after [`validate`](Self::validate).
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|e| ConfigError::InvalidField(format!("Invalid listen_addr: {}", e)))
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::InvalidField(format!("Invalid {}: {}", name, e)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
