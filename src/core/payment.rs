//! Payment confirmation - Verifies the gateway's callback signature and marks orders paid.
//!
//! The gateway signs `"<provider_order_id>|<provider_payment_id>"` with HMAC-SHA256 using
//! the merchant key secret and sends the lowercase hex digest back through the client.
//! A valid signature moves the order `CREATED -> PAID`; an invalid one records the
//! payment as `FAILED` and leaves the order status alone.

use crate::{
    core::{order, status},
    entities::{Order, OrderStatus, PaymentStatus, order as order_entity},
    errors::{Error, Result},
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sea_orm::{prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, instrument, warn};

type HmacSha256 = Hmac<Sha256>;

/// Client-relayed gateway callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    /// Gateway name; kept from checkout when absent
    pub provider: Option<String>,
    /// Gateway order id; must match the one recorded at checkout
    pub provider_order_id: Option<String>,
    /// Gateway payment id
    pub provider_payment_id: Option<String>,
    /// Hex HMAC-SHA256 of `"<provider_order_id>|<provider_payment_id>"`
    pub provider_signature: Option<String>,
}

fn signing_mac(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| Error::Config {
        message: format!("Invalid payment key secret: {e}"),
    })?;
    mac.update(provider_order_id.as_bytes());
    mac.update(b"|");
    mac.update(provider_payment_id.as_bytes());
    Ok(mac)
}

/// Computes the hex signature the gateway would send for this payment.
pub fn compute_signature(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
) -> Result<String> {
    let mac = signing_mac(secret, provider_order_id, provider_payment_id)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature. Malformed hex never verifies.
pub fn verify_signature(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
    signature: &str,
) -> Result<bool> {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return Ok(false);
    };
    let mac = signing_mac(secret, provider_order_id, provider_payment_id)?;
    Ok(mac.verify_slice(&expected).is_ok())
}

fn required<'a>(field: &str, value: Option<&'a String>) -> Result<&'a str> {
    value
        .map(String::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation(field, "is required"))
}

/// Confirms a gateway payment for `order_id`.
///
/// The order must have a gateway order recorded at checkout, and a gateway payment can
/// pay for at most one order.
///
/// # Errors
/// - [`Error::Validation`] when a callback field is missing, no gateway order was
///   recorded at checkout, the gateway order id does not match the recorded one, or the
///   payment id already paid for another order
/// - [`Error::NotFound`] when the order does not exist
/// - [`Error::InvalidTransition`] when the order is not `CREATED`
/// - [`Error::PaymentVerification`] when the signature does not verify
#[instrument(skip(db, secret, confirmation))]
pub async fn confirm_payment(
    db: &DatabaseConnection,
    secret: &str,
    order_id: &str,
    confirmation: &PaymentConfirmation,
) -> Result<order_entity::Model> {
    let provider_order_id = required("providerOrderId", confirmation.provider_order_id.as_ref())?;
    let provider_payment_id =
        required("providerPaymentId", confirmation.provider_payment_id.as_ref())?;
    let signature = required("providerSignature", confirmation.provider_signature.as_ref())?;

    let existing = order::find_order(db, order_id).await?;

    let Some(recorded) = existing.payment_provider_order_id.as_deref() else {
        warn!(order_id, provider_order_id, "Payment for an order with no gateway order");
        return Err(Error::validation(
            "providerOrderId",
            "no payment was started for this order",
        ));
    };
    if recorded != provider_order_id {
        warn!(
            order_id,
            recorded,
            provider_order_id,
            "Payment for a different gateway order"
        );
        return Err(Error::validation(
            "providerOrderId",
            "does not match the payment started for this order",
        ));
    }

    status::check_transition(existing.status, OrderStatus::Paid)?;

    if !verify_signature(secret, provider_order_id, provider_payment_id, signature)? {
        warn!(order_id, provider_payment_id, "Payment signature verification failed");
        // Never downgrades a payment that completed in the meantime.
        Order::update_many()
            .col_expr(
                order_entity::Column::PaymentStatus,
                Expr::value(PaymentStatus::Failed),
            )
            .col_expr(order_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order_entity::Column::Id.eq(order_id))
            .filter(order_entity::Column::Status.eq(existing.status))
            .filter(order_entity::Column::PaymentStatus.ne(PaymentStatus::Paid))
            .exec(db)
            .await?;
        return Err(Error::PaymentVerification {
            order_id: order_id.to_string(),
        });
    }

    let claimed = Order::find()
        .filter(order_entity::Column::PaymentProviderPaymentId.eq(provider_payment_id))
        .filter(order_entity::Column::Id.ne(order_id))
        .one(db)
        .await?;
    if let Some(other) = claimed {
        warn!(
            order_id,
            provider_payment_id,
            paid_order_id = %other.id,
            "Gateway payment already used for another order"
        );
        return Err(Error::validation(
            "providerPaymentId",
            "has already been used for another order",
        ));
    }

    let provider = confirmation
        .provider
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or(existing.payment_provider);

    let update = Order::update_many()
        .col_expr(order_entity::Column::PaymentProvider, Expr::value(provider))
        .col_expr(
            order_entity::Column::PaymentProviderOrderId,
            Expr::value(Some(provider_order_id.to_string())),
        )
        .col_expr(
            order_entity::Column::PaymentProviderPaymentId,
            Expr::value(Some(provider_payment_id.to_string())),
        )
        .col_expr(
            order_entity::Column::PaymentProviderSignature,
            Expr::value(Some(signature.to_string())),
        )
        .col_expr(
            order_entity::Column::PaymentStatus,
            Expr::value(PaymentStatus::Paid),
        )
        .col_expr(order_entity::Column::Status, Expr::value(OrderStatus::Paid));
    let updated =
        order::update_if_status(db, order_id, existing.status, OrderStatus::Paid, update).await?;

    info!(order_id, provider_payment_id, "Payment confirmed");
    Ok(updated)
}
