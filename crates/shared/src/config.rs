//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration. Absent means uploads are rejected
    /// until storage is configured.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing and verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Object storage settings for an S3-compatible store.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Bucket name.
    pub bucket: String,
    /// Region identifier.
    pub region: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Custom endpoint URL. Absent means the canonical region endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Default TTL for signed download URLs in seconds.
    #[serde(default = "default_presign_ttl")]
    pub presign_ttl_secs: u64,
}

fn default_presign_ttl() -> u64 {
    3600 // 1 hour
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VERITAX").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("VERITAX__DATABASE__URL", Some("postgres://localhost/test")),
                ("VERITAX__JWT__SECRET", Some("test-secret")),
                ("VERITAX__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/test");
                assert_eq!(config.jwt.secret, "test-secret");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.database.max_connections, 10);
            },
        );
    }

    #[test]
    fn test_storage_absent_by_default() {
        temp_env::with_vars(
            [
                ("VERITAX__DATABASE__URL", Some("postgres://localhost/test")),
                ("VERITAX__JWT__SECRET", Some("test-secret")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert!(config.storage.is_none());
            },
        );
    }

    #[test]
    fn test_storage_settings_from_environment() {
        temp_env::with_vars(
            [
                ("VERITAX__DATABASE__URL", Some("postgres://localhost/test")),
                ("VERITAX__JWT__SECRET", Some("test-secret")),
                ("VERITAX__STORAGE__BUCKET", Some("taxdocs")),
                ("VERITAX__STORAGE__REGION", Some("fra1")),
                ("VERITAX__STORAGE__ACCESS_KEY_ID", Some("key")),
                ("VERITAX__STORAGE__SECRET_ACCESS_KEY", Some("secret")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                let storage = config.storage.expect("storage should be configured");
                assert_eq!(storage.bucket, "taxdocs");
                assert_eq!(storage.region, "fra1");
                assert!(storage.endpoint.is_none());
                assert_eq!(storage.presign_ttl_secs, 3600);
            },
        );
    }
}
