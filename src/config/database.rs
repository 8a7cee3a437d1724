//! Database configuration module for the order service.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! The connection is acquired once per process and memoized, so every caller gets a
//! shared handle to the same pool no matter how many times it asks. Tables are generated from the
//! entity definitions with `Schema::create_table_from_entity`, so the schema always
//! matches the Rust structs without hand-written SQL.

use crate::entities::{Boutique, Fabric, Order, OrderItem};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Default location of the `SQLite` file when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/fitting4u.sqlite?mode=rwc";

static CONNECTION: OnceCell<Arc<DatabaseConnection>> = OnceCell::const_new();

/// Returns the process-wide database connection, connecting and creating tables on first use.
///
/// Concurrent first callers wait on the same initialization; a failed attempt leaves the
/// cell empty so a later call can try again.
pub async fn connection(database_url: &str) -> Result<Arc<DatabaseConnection>> {
    CONNECTION
        .get_or_try_init(|| async {
            info!("Connecting to database");
            let db = create_connection(database_url).await?;
            create_tables(&db).await?;
            Ok::<_, Error>(Arc::new(db))
        })
        .await
        .map(Arc::clone)
}

/// Opens a new connection pool to `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!(database_url, "Opening database connection");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions, skipping ones that already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    db.execute(builder.build(schema.create_table_from_entity(Boutique).if_not_exists()))
        .await?;
    db.execute(builder.build(schema.create_table_from_entity(Fabric).if_not_exists()))
        .await?;
    db.execute(builder.build(schema.create_table_from_entity(Order).if_not_exists()))
        .await?;
    db.execute(builder.build(schema.create_table_from_entity(OrderItem).if_not_exists()))
        .await?;

    Ok(())
}
