//! Process settings read from environment variables.
//!
//! `.env` is loaded by `main` before [`Settings::from_env`] runs, so values may come from
//! either the real environment or the file.

use crate::errors::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address for the HTTP API.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default location of the catalog seed file.
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Runtime settings for the order service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP API binds to
    pub bind_addr: SocketAddr,
    /// Optional catalog seed file
    pub catalog_path: PathBuf,
    /// Shared secret used to verify payment gateway signatures
    pub payment_key_secret: String,
}

impl Settings {
    /// Reads `DATABASE_URL`, `FITTING4U_BIND_ADDR`, `FITTING4U_CATALOG_PATH` and
    /// `PAYMENT_KEY_SECRET`. Only the payment secret is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| crate::config::database::DEFAULT_DATABASE_URL.to_string());

        let bind_raw =
            lookup("FITTING4U_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e| Error::Config {
            message: format!("FITTING4U_BIND_ADDR '{bind_raw}' is not a socket address: {e}"),
        })?;

        let catalog_path = lookup("FITTING4U_CATALOG_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH), PathBuf::from);

        let payment_key_secret = lookup("PAYMENT_KEY_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "PAYMENT_KEY_SECRET must be set".to_string(),
            })?;

        Ok(Self {
            database_url,
            bind_addr,
            catalog_path,
            payment_key_secret,
        })
    }
}
