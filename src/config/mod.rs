//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:3000
//! logging:
//!   filter: advertise=debug,tower_http=info
//! access:
//!   order:
//!     query: roles:admin,moderator,editor
//!     delete: deny
//! ```
//!
//! Every section is optional. Access entries that are left out keep the
//! built-in policy of the list.

use crate::core::auth::{AuthPolicy, ListAccess, Operation};
use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable overriding `server.bind`
pub const BIND_ENV: &str = "ADVERTISE_ADMIN_BIND";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|e| ConfigError::Invalid {
            message: format!("server.bind '{}': {}", self.bind, e),
        })
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` wins when set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Policy overrides for one list, as policy strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListAccessConfig {
    pub query: Option<String>,
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl ListAccessConfig {
    fn entry(&self, operation: Operation) -> Option<&str> {
        match operation {
            Operation::Query => self.query.as_deref(),
            Operation::Create => self.create.as_deref(),
            Operation::Update => self.update.as_deref(),
            Operation::Delete => self.delete.as_deref(),
        }
    }

    /// Overlay the configured entries on `access`
    pub fn apply(&self, mut access: ListAccess) -> Result<ListAccess, ConfigError> {
        for operation in Operation::ALL {
            if let Some(raw) = self.entry(operation) {
                let policy = AuthPolicy::parse_policy(raw).map_err(|message| {
                    ConfigError::Invalid {
                        message: format!("access policy for {}: {}", operation, message),
                    }
                })?;
                access = access.allow(operation, policy);
            }
        }
        Ok(access)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub order: ListAccessConfig,
}

/// Complete configuration of the admin backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub access: AccessConfig,
}

impl AdminConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var(BIND_ENV) {
            tracing::debug!(%bind, "server.bind overridden from environment");
            self.server.bind = bind;
        }
        self
    }
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over `logging.filter`. Calling this twice is
/// harmless; the second subscriber is discarded.
pub fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));

    if fmt().with_env_filter(env_filter).with_target(true).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{AuthContext, Role};
    use crate::entities::order::default_access;
    use std::io::Write;
    use uuid::Uuid;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AdminConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.logging.filter, "info");
        assert!(config.server.socket_addr().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = AdminConfig::from_yaml_str(
            r#"
server:
  bind: 0.0.0.0:8080
access:
  order:
    delete: deny
"#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.access.order.delete.as_deref(), Some("deny"));
        assert_eq!(config.access.order.query, None);
    }

    #[test]
    fn test_access_overrides_keep_unset_defaults() {
        let overrides = ListAccessConfig {
            query: Some("authenticated".to_string()),
            delete: Some("deny".to_string()),
            ..Default::default()
        };
        let access = overrides.apply(default_access()).unwrap();

        let contributor = AuthContext::user(Uuid::new_v4(), [Role::Contributor]);
        let admin = AuthContext::user(Uuid::new_v4(), [Role::Admin]);
        assert!(access.check(Operation::Query, &contributor).is_ok());
        assert!(access.check(Operation::Delete, &admin).is_err());
        assert!(access.check(Operation::Create, &admin).is_ok());
        assert!(access.check(Operation::Create, &contributor).is_err());
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let overrides = ListAccessConfig {
            update: Some("role:janitor".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(default_access()),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_invalid_bind_is_config_error() {
        let server = ServerConfig {
            bind: "not-an-address".to_string(),
        };
        assert!(matches!(server.socket_addr(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  filter: debug").unwrap();

        let config = AdminConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AdminConfig::from_yaml_file("/nonexistent/advertise.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [unclosed").unwrap();

        match AdminConfig::from_yaml_file(file.path()) {
            Err(ConfigError::Parse { file: Some(path), .. }) => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }
}
