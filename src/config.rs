//! Application configuration.
//!
//! Values come from an optional TOML file (`folio.toml` by default) overlaid
//! with `FOLIO__`-prefixed environment variables, e.g.
//! `FOLIO__AUTH__JWT_SECRET` or `FOLIO__DOCUMENTS__CASCADE=awaited`.

use std::path::Path;

use serde::Deserialize;

use crate::auth::config::AuthConfig;
use crate::error::AppError;
use crate::service::cascade::CascadeMode;
use crate::service::documents::DeletePolicy;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

/// Which DocumentRepository backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Mongo,
    /// Process-local store; contents are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            mongodb_uri: default_mongodb_uri(),
            database: default_database(),
        }
    }
}

/// Document tree behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default)]
    pub cascade: CascadeMode,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl AppConfig {
    /// Load configuration from `path` (required) or from `folio.toml` in the
    /// working directory (optional), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("folio").required(false),
        };
        Self::from_source(file)
    }

    /// Merge a single source with environment overrides and deserialize.
    pub fn from_source<S>(source: S) -> Result<Self, AppError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to deserialize config: {e}")))
    }
}

fn default_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "folio".to_string()
}
