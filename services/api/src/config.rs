//! Service configuration
//!
//! Built with the `config` crate from defaults overlaid with `API__*`
//! environment variables, e.g. `API__SERVER__PORT=8080` or
//! `API__AUTH__JWT_PUBLIC_KEY=keys/public.pem`. Database settings are read
//! separately by [`common::database::DatabaseConfig`].

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Backing store for approvals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// Key material for verifying caller tokens
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// RS256 public key, PEM text or a path to a PEM file
    pub jwt_public_key: Option<String>,
    /// HS256 shared secret, used when no public key is configured
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl ApiConfig {
    /// Load the configuration from defaults and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let config: ApiConfig = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001_i64)?
            .set_default("server.log_level", "info")?
            .set_default("storage.backend", "postgres")?
            .add_source(
                Environment::with_prefix("API")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if config.auth.jwt_public_key.is_none() && config.auth.jwt_secret.is_none() {
            return Err(ConfigError::Message(
                "either auth.jwt_public_key or auth.jwt_secret must be set".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "API__SERVER__HOST",
        "API__SERVER__PORT",
        "API__SERVER__LOG_LEVEL",
        "API__AUTH__JWT_PUBLIC_KEY",
        "API__AUTH__JWT_SECRET",
        "API__STORAGE__BACKEND",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("API__AUTH__JWT_SECRET", "dev-secret");
        }

        let config = ApiConfig::load().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("dev-secret"));
        assert!(config.auth.jwt_public_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_custom_values() {
        clear_env();
        unsafe {
            std::env::set_var("API__SERVER__HOST", "127.0.0.1");
            std::env::set_var("API__SERVER__PORT", "8088");
            std::env::set_var("API__SERVER__LOG_LEVEL", "debug");
            std::env::set_var("API__AUTH__JWT_PUBLIC_KEY", "keys/public.pem");
            std::env::set_var("API__STORAGE__BACKEND", "memory");
        }

        let config = ApiConfig::load().unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8088");
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(
            config.auth.jwt_public_key.as_deref(),
            Some("keys/public.pem")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_requires_a_key_source() {
        clear_env();

        assert!(ApiConfig::load().is_err());
    }
}
