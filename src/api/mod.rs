//! HTTP interface - axum router, shared state and handlers.
//!
//! Responses use the `{success, ...}` envelope: `{success: true, orderId}` or
//! `{success: true, order}` on success and `{success: false, message}` on failure.

/// Route handlers
pub mod handlers;
/// Error-to-response mapping
pub mod response;

use axum::{
    Router,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared data available to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection for all database operations
    pub database: Arc<DatabaseConnection>,
    /// Merchant secret used to verify payment gateway callbacks
    pub payment_key_secret: Arc<str>,
}

impl AppState {
    /// Creates a new `AppState` from a shared connection and the payment key secret.
    #[must_use]
    pub fn new(database: Arc<DatabaseConnection>, payment_key_secret: &str) -> Self {
        Self {
            database,
            payment_key_secret: Arc::from(payment_key_secret),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/orders", post(handlers::create_order))
        .route("/api/orders/:id", get(handlers::get_customer_order))
        .route("/api/orders/:id/payment", post(handlers::confirm_payment))
        .route("/api/admin/orders/:id", get(handlers::get_admin_order))
        .route(
            "/api/admin/orders/:id/status",
            patch(handlers::update_order_status),
        )
        .route(
            "/api/admin/orders/:id/convert-to-pickup",
            post(handlers::convert_to_pickup),
        )
        .with_state(state)
}
