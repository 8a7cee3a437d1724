//! Shared test utilities for the order service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        catalog,
        intake::{CreateOrderRequest, DeliveryAddressRequest, OrderItemRequest, PaymentRequest},
        order,
    },
    entities,
    errors::Result,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};

/// Phone number used by [`create_test_order`].
pub const TEST_PHONE: &str = "+919800000001";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test fabric named after its id.
pub async fn create_test_fabric(
    db: &DatabaseConnection,
    id: &str,
    customer_price: f64,
) -> Result<entities::fabric::Model> {
    catalog::create_fabric(db, id.to_string(), format!("Fabric {id}"), customer_price).await
}

/// Creates a test boutique in Bengaluru.
pub async fn create_test_boutique(
    db: &DatabaseConnection,
    id: &str,
) -> Result<entities::boutique::Model> {
    catalog::create_boutique(
        db,
        id.to_string(),
        format!("Boutique {id}"),
        "Bengaluru".to_string(),
        "1 MG Road".to_string(),
    )
    .await
}

/// Sets up a database with a small catalog.
///
/// # Contents
/// * `F1` "Raw Silk" at 100.0 per meter
/// * `F2` "Linen" at 45.5 per meter
/// * `B1` boutique
pub async fn setup_with_catalog() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    catalog::create_fabric(&db, "F1".to_string(), "Raw Silk".to_string(), 100.0).await?;
    catalog::create_fabric(&db, "F2".to_string(), "Linen".to_string(), 45.5).await?;
    create_test_boutique(&db, "B1").await?;
    Ok(db)
}

/// A valid home-delivery request for 2 m of `F1` at 100.0 (total 200.0).
#[must_use]
pub fn valid_order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        user_phone: Some(TEST_PHONE.to_string()),
        items: Some(vec![OrderItemRequest {
            fabric_id: Some("F1".to_string()),
            qty: Some(2.0),
            price: Some(100.0),
        }]),
        total: Some(200.0),
        delivery_type: Some("HOME".to_string()),
        delivery_address: Some(DeliveryAddressRequest {
            street: Some("12 Residency Road".to_string()),
            city: Some("Bengaluru".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Creates a `CREATED` home-delivery order from [`valid_order_request`].
/// Requires the catalog from [`setup_with_catalog`].
pub async fn create_test_order(db: &DatabaseConnection) -> Result<String> {
    order::create_order(db, &valid_order_request()).await
}

/// Like [`create_test_order`] but with a gateway order recorded at checkout.
pub async fn create_test_order_with_payment(
    db: &DatabaseConnection,
    provider_order_id: &str,
) -> Result<String> {
    let request = CreateOrderRequest {
        payment: Some(PaymentRequest {
            provider: Some("razorpay".to_string()),
            provider_order_id: Some(provider_order_id.to_string()),
        }),
        ..valid_order_request()
    };
    order::create_order(db, &request).await
}

/// Installs a trigger that aborts every `order_items` insert, so order persistence
/// fails after the header insert.
pub async fn reject_order_item_inserts(db: &DatabaseConnection) -> Result<()> {
    db.execute_unprepared(
        "CREATE TRIGGER reject_order_items BEFORE INSERT ON order_items \
         BEGIN SELECT RAISE(ABORT, 'order item insert rejected'); END;",
    )
    .await?;
    Ok(())
}
