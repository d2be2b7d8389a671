//! Configuration management for the Gem Ledger server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with GEM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Image upload configuration
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret used to verify bearer tokens issued by the identity service
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Directory attachment bytes are written to
    pub directory: String,

    /// URL prefix the directory is served under
    pub public_path: String,

    /// Largest accepted file, in bytes
    pub max_file_bytes: usize,

    /// Accepted image mime types
    pub allowed_mime_types: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("GEM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("uploads.directory", "uploads")?
            .set_default("uploads.public_path", "/uploads")?
            .set_default("uploads.max_file_bytes", 10 * 1024 * 1024)?
            .set_default(
                "uploads.allowed_mime_types",
                vec!["image/jpeg", "image/png", "image/webp", "image/gif", "image/heic"],
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GEM_ prefix)
            .add_source(
                Environment::with_prefix("GEM")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("uploads.allowed_mime_types")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: "uploads".to_string(),
            public_path: "/uploads".to_string(),
            max_file_bytes: 10 * 1024 * 1024,
            allowed_mime_types: ["image/jpeg", "image/png", "image/webp", "image/gif", "image/heic"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
