//! Price verification - Server-side recomputation of line prices and the order total.
//!
//! Every requested line is re-priced from the fabric's current `customer_price`. A
//! client that submits any other unit price, or a total that does not match the
//! recomputed sum, is rejected. The verifier reads the catalog only; it never writes.

use crate::{
    core::{catalog, intake::OrderItemRequest},
    errors::{Error, Result},
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{debug, warn};

/// Rounds a monetary amount to 2 decimal places.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A line priced from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    /// Catalog fabric id
    pub fabric_id: String,
    /// Fabric name at verification time
    pub fabric_name: String,
    /// Ordered length in meters
    pub quantity: f64,
    /// Catalog price at verification time
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub line_subtotal: f64,
}

/// All lines of an order with the server-computed total.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    /// Lines in request order
    pub lines: Vec<PricedLine>,
    /// `round_to_cents(Σ line_subtotal)`
    pub total: f64,
}

fn positive(field: &str, position: usize, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(Error::validation(
            format!("items[{position}].{field}"),
            format!("must be greater than zero, got {v}"),
        )),
        None => Err(Error::validation(
            format!("items[{position}].{field}"),
            "is required",
        )),
    }
}

/// Re-prices every line from the catalog and checks the client total.
///
/// Lines are processed in order and the first failure is returned. One catalog lookup
/// is made per line.
///
/// # Errors
/// - [`Error::Validation`] when a line lacks `fabricId`, or `qty`/`price` is not positive
/// - [`Error::NotFound`] when a referenced fabric does not exist or is deleted
/// - [`Error::PriceMismatch`] when a line's `price` differs from the catalog price
/// - [`Error::TotalMismatch`] when the rounded recomputed total differs from `client_total`
#[allow(clippy::float_cmp)]
pub async fn verify_prices<C>(
    db: &C,
    items: &[OrderItemRequest],
    client_total: f64,
) -> Result<PricedOrder>
where
    C: ConnectionTrait,
{
    let mut lines = Vec::with_capacity(items.len());
    let mut running_total = 0.0;

    for (position, item) in items.iter().enumerate() {
        let fabric_id = item
            .fabric_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::validation(format!("items[{position}].fabricId"), "is required"))?;

        let fabric = catalog::get_active_fabric(db, fabric_id)
            .await?
            .ok_or_else(|| Error::not_found("Fabric", fabric_id))?;

        let quantity = positive("qty", position, item.qty)?;
        let submitted_price = positive("price", position, item.price)?;

        if submitted_price != fabric.customer_price {
            warn!(
                fabric_id,
                submitted = submitted_price,
                expected = fabric.customer_price,
                "Rejected order line with tampered price"
            );
            return Err(Error::PriceMismatch {
                item: fabric.name,
                submitted: submitted_price,
                expected: fabric.customer_price,
            });
        }

        let line_subtotal = quantity * fabric.customer_price;
        running_total += line_subtotal;
        debug!(fabric_id, quantity, line_subtotal, "Priced order line");

        lines.push(PricedLine {
            fabric_id: fabric.id,
            fabric_name: fabric.name,
            quantity,
            unit_price: fabric.customer_price,
            line_subtotal,
        });
    }

    let server_total = round_to_cents(running_total);
    if server_total != client_total {
        warn!(
            server_total,
            client_total, "Rejected order with mismatched total"
        );
        return Err(Error::TotalMismatch {
            server_total,
            client_total,
        });
    }

    Ok(PricedOrder {
        lines,
        total: server_total,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::test_utils::*;

    fn item(fabric_id: &str, qty: f64, price: f64) -> OrderItemRequest {
        OrderItemRequest {
            fabric_id: Some(fabric_id.to_string()),
            qty: Some(qty),
            price: Some(price),
        }
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_to_cents(199.999), 200.0);
        assert_eq!(round_to_cents(12.344), 12.34);
        assert_eq!(round_to_cents(200.0), 200.0);
    }

    #[tokio::test]
    async fn test_matching_prices_and_total() -> Result<()> {
        let db = setup_with_catalog().await?;

        let priced = verify_prices(&db, &[item("F1", 2.0, 100.0)], 200.0).await?;
        assert_eq!(priced.total, 200.0);
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].line_subtotal, 200.0);
        assert_eq!(priced.lines[0].fabric_name, "Raw Silk");

        Ok(())
    }

    #[tokio::test]
    async fn test_fractional_meters_are_rounded_in_total() -> Result<()> {
        let db = setup_with_catalog().await?;

        // 1.5 m of linen at 45.5 + 2.25 m of silk at 100 = 68.25 + 225 = 293.25
        let priced = verify_prices(
            &db,
            &[item("F2", 1.5, 45.5), item("F1", 2.25, 100.0)],
            293.25,
        )
        .await?;
        assert_eq!(priced.total, 293.25);
        for line in &priced.lines {
            assert_eq!(line.line_subtotal, line.quantity * line.unit_price);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_tampered_price_is_rejected() -> Result<()> {
        let db = setup_with_catalog().await?;

        let err = verify_prices(&db, &[item("F1", 2.0, 90.0)], 180.0)
            .await
            .unwrap_err();
        assert!(err.is_tamper());
        match err {
            Error::PriceMismatch {
                item,
                submitted,
                expected,
            } => {
                assert_eq!(item, "Raw Silk");
                assert_eq!(submitted, 90.0);
                assert_eq!(expected, 100.0);
            }
            other => panic!("expected price mismatch, got {other:?}"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_total_reports_both_values() -> Result<()> {
        let db = setup_with_catalog().await?;

        let err = verify_prices(&db, &[item("F1", 2.0, 100.0)], 199.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TotalMismatch { server_total, client_total }
                if server_total == 200.0 && client_total == 199.0
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_fabric_is_not_found() -> Result<()> {
        let db = setup_with_catalog().await?;

        let err = verify_prices(&db, &[item("F9", 1.0, 10.0)], 10.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound { entity: "Fabric", reference } if reference == "F9"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_positive_quantity_and_price() -> Result<()> {
        let db = setup_with_catalog().await?;

        let err = verify_prices(&db, &[item("F1", 0.0, 100.0)], 100.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field, .. } if field == "items[0].qty"));

        let missing_price = OrderItemRequest {
            fabric_id: Some("F1".to_string()),
            qty: Some(1.0),
            price: None,
        };
        let err = verify_prices(&db, &[item("F1", 1.0, 100.0), missing_price], 200.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field, .. } if field == "items[1].price"));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_fabric_id() -> Result<()> {
        let db = setup_with_catalog().await?;

        let line = OrderItemRequest {
            fabric_id: None,
            qty: Some(1.0),
            price: Some(100.0),
        };
        let err = verify_prices(&db, &[line], 100.0).await.unwrap_err();
        assert!(matches!(err, Error::Validation { field, .. } if field == "items[0].fabricId"));

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_fabric_cannot_be_priced() -> Result<()> {
        let db = setup_with_catalog().await?;
        catalog::delete_fabric(&db, "F1").await?;

        let err = verify_prices(&db, &[item("F1", 2.0, 100.0)], 200.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        Ok(())
    }
}
