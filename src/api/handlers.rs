//! Route handlers. Each one extracts its inputs, calls into [`crate::core`] and wraps the
//! result in the `{success: true, ...}` envelope.

use super::{AppState, response::ApiError};
use crate::{
    core::{
        intake::CreateOrderRequest,
        order::{self, OrderView},
        payment::{self, PaymentConfirmation},
        status::AdminRole,
    },
    entities::OrderStatus,
    errors::{Error, Result},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::instrument;

/// Header carrying the caller's admin role, set by the upstream auth layer.
pub const ADMIN_ROLE_HEADER: &str = "x-admin-role";

type ApiResult = std::result::Result<Json<Value>, ApiError>;

/// Parses a JSON body so that malformed input becomes a validation error rather
/// than an extractor rejection with a different response shape.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::validation("body", e.to_string()))
}

fn admin_role(headers: &HeaderMap) -> Result<AdminRole> {
    headers
        .get(ADMIN_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized {
            message: format!("missing {ADMIN_ROLE_HEADER} header"),
        })?
        .parse()
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

/// `POST /api/orders`
#[instrument(skip_all)]
pub async fn create_order(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: CreateOrderRequest = parse_body(&body)?;
    let order_id = order::create_order(&state.database, &request).await?;
    Ok(Json(json!({ "success": true, "orderId": order_id })))
}

/// `GET /api/orders/:id?phone=...`
#[instrument(skip(state, params))]
pub async fn get_customer_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let user_phone = params
        .get("phone")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::validation("phone", "is required"))?;

    let details =
        order::get_order_details(&state.database, &order_id, &OrderView::Customer { user_phone })
            .await?;
    Ok(Json(json!({ "success": true, "order": details })))
}

/// `GET /api/admin/orders/:id`
#[instrument(skip(state, headers))]
pub async fn get_admin_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> ApiResult {
    admin_role(&headers)?;
    let details = order::get_order_details(&state.database, &order_id, &OrderView::Admin).await?;
    Ok(Json(json!({ "success": true, "order": details })))
}

#[derive(Debug, Deserialize)]
struct StatusUpdateBody {
    status: Option<String>,
}

/// `PATCH /api/admin/orders/:id/status`
#[instrument(skip(state, headers, body))]
pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let role = admin_role(&headers)?;
    let body: StatusUpdateBody = parse_body(&body)?;
    let new_status = body
        .status
        .as_deref()
        .ok_or_else(|| Error::validation("status", "is required"))?
        .parse::<OrderStatus>()
        .map_err(|e| Error::validation("status", e))?;

    order::update_order_status(&state.database, &order_id, role, new_status).await?;
    let details = order::get_order_details(&state.database, &order_id, &OrderView::Admin).await?;
    Ok(Json(json!({ "success": true, "order": details })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PickupConversionBody {
    pickup_boutique_id: Option<String>,
}

/// `POST /api/admin/orders/:id/convert-to-pickup`
#[instrument(skip(state, headers, body))]
pub async fn convert_to_pickup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let role = admin_role(&headers)?;
    let body: PickupConversionBody = parse_body(&body)?;

    order::convert_to_pickup(
        &state.database,
        &order_id,
        role,
        body.pickup_boutique_id.as_deref(),
    )
    .await?;
    let details = order::get_order_details(&state.database, &order_id, &OrderView::Admin).await?;
    Ok(Json(json!({ "success": true, "order": details })))
}

/// `POST /api/orders/:id/payment`
#[instrument(skip(state, body))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let confirmation: PaymentConfirmation = parse_body(&body)?;
    let paid = payment::confirm_payment(
        &state.database,
        &state.payment_key_secret,
        &order_id,
        &confirmation,
    )
    .await?;
    Ok(Json(json!({
        "success": true,
        "orderId": paid.id,
        "status": paid.status,
        "paymentStatus": paid.payment_status,
    })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{api::router, test_utils::*};
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use crate::entities::{Order, OrderItem};
    use sea_orm::{EntityTrait, PaginatorTrait};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "test_key_secret";

    async fn app() -> Result<Router> {
        let db = setup_with_catalog().await?;
        Ok(router(AppState::new(Arc::new(db), SECRET)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn scenario_body(price: f64, total: f64) -> Value {
        json!({
            "userPhone": TEST_PHONE,
            "items": [{ "fabricId": "F1", "qty": 2, "price": price }],
            "total": total,
            "deliveryType": "HOME",
            "deliveryAddress": { "street": "X", "city": "Y" },
            "payment": { "provider": "razorpay", "providerOrderId": "order_1" }
        })
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(app, post_json("/api/orders", &scenario_body(100.0, 200.0))).await;
        assert_eq!(status, StatusCode::OK);
        body["orderId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_order_success_envelope() -> Result<()> {
        let app = app().await?;

        let (status, body) = send(&app, post_json("/api/orders", &scenario_body(100.0, 200.0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert!(body["orderId"].as_str().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_failure_statuses() -> Result<()> {
        let app = app().await?;

        let (status, body) = send(&app, post_json("/api/orders", &scenario_body(90.0, 180.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].as_str().unwrap().contains("Raw Silk"));

        let (status, body) = send(&app, post_json("/api/orders", &scenario_body(100.0, 199.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("200.00") && message.contains("199"));

        let mut unknown = scenario_body(100.0, 200.0);
        unknown["items"][0]["fabricId"] = json!("F404");
        let (status, _) = send(&app, post_json("/api/orders", &unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::post("/api/orders")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_and_admin_views() -> Result<()> {
        let app = app().await?;
        let order_id = create(&app).await;

        let uri = format!("/api/orders/{order_id}?phone=%2B919800000001");
        let (status, body) = send(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["total"], json!(200.0));
        assert_eq!(body["order"]["status"], json!("CREATED"));

        let uri = format!("/api/orders/{order_id}?phone=123");
        let (status, _) = send(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/api/admin/orders/{order_id}");
        let (status, _) = send(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::get(&uri)
            .header(ADMIN_ROLE_HEADER, "SUPER_ADMIN")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["payment"]["status"], json!("PENDING"));

        Ok(())
    }

    #[tokio::test]
    async fn test_status_update_enforces_role_and_table() -> Result<()> {
        let app = app().await?;
        let order_id = create(&app).await;
        let uri = format!("/api/admin/orders/{order_id}/status");

        let patch = |role: &str, status: &str| {
            Request::patch(&uri)
                .header(ADMIN_ROLE_HEADER, role)
                .header("content-type", "application/json")
                .body(Body::from(json!({ "status": status }).to_string()))
                .unwrap()
        };

        let (status, _) = send(&app, patch("OPERATOR", "DELIVERED")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, patch("SUPER_ADMIN", "SHIPPED")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, patch("SUPER_ADMIN", "PAID")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], json!("PAID"));

        let (status, _) = send(&app, patch("SUPER_ADMIN", "LOST")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_to_pickup_endpoint() -> Result<()> {
        let app = app().await?;
        let order_id = create(&app).await;

        let request = Request::post(format!("/api/admin/orders/{order_id}/convert-to-pickup"))
            .header(ADMIN_ROLE_HEADER, "OPERATOR")
            .body(Body::from(json!({ "pickupBoutiqueId": "B1" }).to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], json!("READY_FOR_PICKUP"));
        assert_eq!(body["order"]["deliveryType"], json!("BOUTIQUE"));
        assert_eq!(body["order"]["deliveryAddress"], Value::Null);

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_confirmation_endpoint() -> Result<()> {
        let app = app().await?;
        let order_id = create(&app).await;
        let uri = format!("/api/orders/{order_id}/payment");

        let bad = json!({
            "providerOrderId": "order_1",
            "providerPaymentId": "pay_1",
            "providerSignature": "deadbeef"
        });
        let (status, _) = send(&app, post_json(&uri, &bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let good = json!({
            "providerOrderId": "order_1",
            "providerPaymentId": "pay_1",
            "providerSignature": payment::compute_signature(SECRET, "order_1", "pay_1")?
        });
        let (status, body) = send(&app, post_json(&uri, &good)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("PAID"));
        assert_eq!(body["paymentStatus"], json!("PAID"));

        // The same gateway payment cannot pay for a second order.
        let other_id = create(&app).await;
        let (status, body) =
            send(&app, post_json(&format!("/api/orders/{other_id}/payment"), &good)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("providerPaymentId"));

        Ok(())
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() -> Result<()> {
        let db = setup_with_catalog().await?;
        reject_order_item_inserts(&db).await?;
        let db = Arc::new(db);
        let app = router(AppState::new(Arc::clone(&db), SECRET));

        let (status, body) = send(&app, post_json("/api/orders", &scenario_body(100.0, 200.0))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Internal server error"));

        assert_eq!(Order::find().count(db.as_ref()).await?, 0);
        assert_eq!(OrderItem::find().count(db.as_ref()).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let app = app().await?;
        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        Ok(())
    }
}
