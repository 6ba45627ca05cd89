//! Runtime settings loaded from environment variables.
//!
//! `main` calls `dotenvy::dotenv()` first, so every variable here may also come
//! from a `.env` file. Only the bind address is validated eagerly; the database URL
//! and PDF endpoint are checked when first used.

use crate::errors::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Fallback bind address for the action-dispatch server.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Fallback location of the master data seed file.
pub const DEFAULT_SEED_CONFIG: &str = "config.toml";

/// Settings needed to start the service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SeaORM` connection string (`DATABASE_URL`)
    pub database_url: String,
    /// Socket the HTTP server listens on (`BIND_ADDRESS`)
    pub bind_address: SocketAddr,
    /// Action endpoint of the document service (`PDF_SERVICE_URL`); PDF export is
    /// disabled when unset
    pub pdf_service_url: Option<String>,
    /// Master data seed file (`SEED_CONFIG`)
    pub seed_config_path: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| super::database::DEFAULT_DATABASE_URL.to_string());

        let bind_raw = get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_raw.parse().map_err(|e| Error::Config {
            message: format!("Invalid BIND_ADDRESS `{bind_raw}`: {e}"),
        })?;

        let seed_config_path =
            PathBuf::from(get("SEED_CONFIG").unwrap_or_else(|| DEFAULT_SEED_CONFIG.to_string()));

        Ok(Self {
            database_url,
            bind_address,
            pdf_service_url: get("PDF_SERVICE_URL"),
            seed_config_path,
        })
    }
}
