//! Catalog business logic - Fabrics and boutiques as read by the order flow.
//!
//! The order pipeline only ever reads these records: fabrics for their authoritative
//! `customer_price`, boutiques for existence. Soft-deleted records are invisible to the
//! `get_active_*` lookups. Creation and seeding exist so the catalog can be populated
//! from `catalog.toml` and from tests.

use crate::{
    config::catalog::CatalogConfig,
    entities::{Boutique, Fabric, boutique, fabric},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, warn};

/// Finds a fabric by id, returning None if it does not exist or is soft-deleted.
pub async fn get_active_fabric<C>(db: &C, fabric_id: &str) -> Result<Option<fabric::Model>>
where
    C: ConnectionTrait,
{
    Fabric::find_by_id(fabric_id.to_string())
        .filter(fabric::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a boutique by id, returning None if it does not exist or is soft-deleted.
pub async fn get_active_boutique<C>(db: &C, boutique_id: &str) -> Result<Option<boutique::Model>>
where
    C: ConnectionTrait,
{
    Boutique::find_by_id(boutique_id.to_string())
        .filter(boutique::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_fabric(id: &str, name: &str, customer_price: f64) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation("id", "Fabric id cannot be empty"));
    }
    if name.trim().is_empty() {
        return Err(Error::validation("name", "Fabric name cannot be empty"));
    }
    if !customer_price.is_finite() || customer_price <= 0.0 {
        return Err(Error::validation(
            "customerPrice",
            format!("must be a positive number, got {customer_price}"),
        ));
    }
    Ok(())
}

/// Creates a new fabric, validating the id, name and price.
///
/// # Errors
/// Returns an error if:
/// - The id or name is empty or whitespace-only
/// - The price is not a positive finite number
/// - The database insert fails (including a duplicate id)
pub async fn create_fabric(
    db: &DatabaseConnection,
    id: String,
    name: String,
    customer_price: f64,
) -> Result<fabric::Model> {
    validate_fabric(&id, &name, customer_price)?;

    let now = chrono::Utc::now().naive_utc();
    let fabric = fabric::ActiveModel {
        id: Set(id.trim().to_string()),
        name: Set(name.trim().to_string()),
        customer_price: Set(customer_price),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    fabric.insert(db).await.map_err(Into::into)
}

/// Soft deletes a fabric so it can no longer be ordered.
pub async fn delete_fabric(db: &DatabaseConnection, fabric_id: &str) -> Result<fabric::Model> {
    let mut fabric: fabric::ActiveModel = get_active_fabric(db, fabric_id)
        .await?
        .ok_or_else(|| Error::not_found("Fabric", fabric_id))?
        .into();

    fabric.is_deleted = Set(true);
    fabric.updated_at = Set(chrono::Utc::now().naive_utc());
    fabric.update(db).await.map_err(Into::into)
}

/// Creates a new boutique.
pub async fn create_boutique(
    db: &DatabaseConnection,
    id: String,
    name: String,
    city: String,
    address: String,
) -> Result<boutique::Model> {
    if id.trim().is_empty() {
        return Err(Error::validation("id", "Boutique id cannot be empty"));
    }
    if name.trim().is_empty() {
        return Err(Error::validation("name", "Boutique name cannot be empty"));
    }

    let boutique = boutique::ActiveModel {
        id: Set(id.trim().to_string()),
        name: Set(name.trim().to_string()),
        city: Set(city.trim().to_string()),
        address: Set(address.trim().to_string()),
        is_deleted: Set(false),
    };
    boutique.insert(db).await.map_err(Into::into)
}

/// Soft deletes a boutique so it can no longer be chosen for pickup.
pub async fn delete_boutique(db: &DatabaseConnection, boutique_id: &str) -> Result<boutique::Model> {
    let mut boutique: boutique::ActiveModel = get_active_boutique(db, boutique_id)
        .await?
        .ok_or_else(|| Error::not_found("Boutique", boutique_id))?
        .into();

    boutique.is_deleted = Set(true);
    boutique.update(db).await.map_err(Into::into)
}

/// Counts of what [`seed_catalog`] changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Records inserted
    pub inserted: usize,
    /// Soft-deleted records re-enabled and refreshed from the seed
    pub reenabled: usize,
    /// Active records left untouched
    pub skipped: usize,
}

/// Inserts the fabrics and boutiques from the seed that are not already active.
///
/// Active records with the same id are left alone, so prices edited after the first
/// run are not overwritten. Soft-deleted records are re-enabled with the seed values.
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &CatalogConfig) -> Result<SeedSummary> {
    info!(
        "Seeding catalog: {} fabrics, {} boutiques in seed",
        catalog.fabrics.len(),
        catalog.boutiques.len()
    );
    let mut summary = SeedSummary::default();

    for cfg in &catalog.fabrics {
        validate_fabric(&cfg.id, &cfg.name, cfg.customer_price)?;
        let id = cfg.id.trim();
        match Fabric::find_by_id(id.to_string()).one(db).await? {
            Some(existing) if !existing.is_deleted => {
                debug!("Fabric '{}' already exists. Skipping.", id);
                summary.skipped += 1;
            }
            Some(existing) => {
                warn!("Re-enabling soft-deleted fabric '{}'", id);
                let mut fabric: fabric::ActiveModel = existing.into();
                fabric.name = Set(cfg.name.trim().to_string());
                fabric.customer_price = Set(cfg.customer_price);
                fabric.is_deleted = Set(false);
                fabric.updated_at = Set(chrono::Utc::now().naive_utc());
                fabric.update(db).await?;
                summary.reenabled += 1;
            }
            None => {
                create_fabric(db, id.to_string(), cfg.name.clone(), cfg.customer_price).await?;
                summary.inserted += 1;
            }
        }
    }

    for cfg in &catalog.boutiques {
        let id = cfg.id.trim();
        match Boutique::find_by_id(id.to_string()).one(db).await? {
            Some(existing) if !existing.is_deleted => {
                debug!("Boutique '{}' already exists. Skipping.", id);
                summary.skipped += 1;
            }
            Some(existing) => {
                warn!("Re-enabling soft-deleted boutique '{}'", id);
                let mut boutique: boutique::ActiveModel = existing.into();
                boutique.name = Set(cfg.name.trim().to_string());
                boutique.city = Set(cfg.city.trim().to_string());
                boutique.address = Set(cfg.address.trim().to_string());
                boutique.is_deleted = Set(false);
                boutique.update(db).await?;
                summary.reenabled += 1;
            }
            None => {
                create_boutique(
                    db,
                    id.to_string(),
                    cfg.name.clone(),
                    cfg.city.clone(),
                    cfg.address.clone(),
                )
                .await?;
                summary.inserted += 1;
            }
        }
    }

    info!(
        inserted = summary.inserted,
        reenabled = summary.reenabled,
        skipped = summary.skipped,
        "Catalog seeding finished"
    );
    Ok(summary)
}
