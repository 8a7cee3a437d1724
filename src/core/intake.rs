//! Order intake - Request shapes and the first, storage-free validation pass.
//!
//! Every request field is optional at the type level so a missing field is reported by
//! name instead of as a generic deserialization failure. Validation is fail-fast: the
//! first missing or invalid field is returned and nothing else is checked.

use crate::{
    entities::DeliveryType,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};

/// Raw order-creation payload as submitted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Customer phone number
    pub user_phone: Option<String>,
    /// Requested lines
    pub items: Option<Vec<OrderItemRequest>>,
    /// Client-computed order total
    pub total: Option<f64>,
    /// `"HOME"` or `"BOUTIQUE"`
    pub delivery_type: Option<String>,
    /// Required for `HOME`
    pub delivery_address: Option<DeliveryAddressRequest>,
    /// Required for `BOUTIQUE`
    pub pickup_boutique_id: Option<String>,
    /// Gateway order created before checkout, if any
    pub payment: Option<PaymentRequest>,
}

/// One requested line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Referenced fabric id
    pub fabric_id: Option<String>,
    /// Meters requested
    pub qty: Option<f64>,
    /// Client-side unit price
    pub price: Option<f64>,
}

/// Home delivery address as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddressRequest {
    /// Required for `HOME` delivery
    pub street: Option<String>,
    /// Required for `HOME` delivery
    pub city: Option<String>,
    /// Optional
    pub state: Option<String>,
    /// Optional
    pub postal_code: Option<String>,
}

/// Payment gateway reference attached at checkout. The payment status is never
/// taken from the client; it starts as `PENDING`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Gateway name, e.g. `"razorpay"`
    pub provider: Option<String>,
    /// Order id issued by the gateway
    pub provider_order_id: Option<String>,
}

/// Request fields that passed intake validation.
#[derive(Debug, Clone)]
pub struct ValidatedIntake {
    /// Trimmed customer phone
    pub user_phone: String,
    /// Non-empty, still unpriced lines
    pub items: Vec<OrderItemRequest>,
    /// Positive client total
    pub client_total: f64,
    /// Parsed `deliveryType`
    pub delivery_type: DeliveryType,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Checks presence and shape of `userPhone`, `items`, `total` and `deliveryType`, in that order.
///
/// # Errors
/// Returns [`Error::Validation`] naming the first field that is missing or invalid.
pub fn validate_intake(request: &CreateOrderRequest) -> Result<ValidatedIntake> {
    let user_phone = non_empty(request.user_phone.as_deref())
        .ok_or_else(|| Error::validation("userPhone", "is required"))?;

    let items = match request.items.as_deref() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(Error::validation("items", "must contain at least one item")),
    };

    let client_total = match request.total {
        Some(total) if total.is_finite() && total > 0.0 => total,
        Some(total) => {
            return Err(Error::validation(
                "total",
                format!("must be a positive number, got {total}"),
            ));
        }
        None => return Err(Error::validation("total", "is required")),
    };

    let delivery_type = request
        .delivery_type
        .as_deref()
        .ok_or_else(|| Error::validation("deliveryType", "is required"))?
        .parse::<DeliveryType>()
        .map_err(|e| Error::validation("deliveryType", e))?;

    Ok(ValidatedIntake {
        user_phone: user_phone.to_string(),
        items: items.to_vec(),
        client_total,
        delivery_type,
    })
}
