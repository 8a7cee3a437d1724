//! Catalog seed loading from catalog.toml
//!
//! Fabrics and boutiques listed in the seed file are inserted on startup when they
//! are missing from the database. See [`crate::core::catalog::seed_catalog`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Fabrics to seed
    #[serde(default)]
    pub fabrics: Vec<FabricConfig>,
    /// Boutiques to seed
    #[serde(default)]
    pub boutiques: Vec<BoutiqueConfig>,
}

/// Seed entry for a single fabric
#[derive(Debug, Deserialize, Clone)]
pub struct FabricConfig {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Price per meter
    pub customer_price: f64,
}

/// Seed entry for a single boutique
#[derive(Debug, Deserialize, Clone)]
pub struct BoutiqueConfig {
    /// Boutique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// City
    pub city: String,
    /// Street address
    pub address: String,
}

/// Loads the catalog seed from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading catalog seed from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file {path_ref:?}: {e}"),
    })
}

/// Loads the catalog seed if the file exists, returning an empty catalog otherwise.
pub fn load_catalog_if_present<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    if path.as_ref().exists() {
        load_catalog(path)
    } else {
        tracing::info!(
            "No catalog seed at {:?}, starting with the existing catalog",
            path.as_ref()
        );
        Ok(CatalogConfig::default())
    }
}
