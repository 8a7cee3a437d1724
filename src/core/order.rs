//! Order business logic - Creation pipeline, details query and lifecycle changes.
//!
//! Creation runs intake validation, price verification, delivery resolution and
//! persistence strictly in sequence; the first failure aborts the request and nothing is
//! written. The persisted order only ever holds server-computed prices and totals and
//! server-resolved delivery fields.
//!
//! Lifecycle writes use a conditional `UPDATE ... WHERE status = <observed>` so a change
//! made by someone else between the read and the write is reported instead of being
//! silently overwritten.

use crate::{
    core::{
        delivery::{self, DeliveryAddress, ResolvedDelivery},
        intake::{self, CreateOrderRequest, PaymentRequest},
        pricing::{self, PricedLine, PricedOrder},
        status::{self, AdminRole},
    },
    entities::{DeliveryType, Order, OrderItem, OrderStatus, PaymentStatus, order, order_item},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Runs the full creation pipeline and returns the new order id.
///
/// # Errors
/// - [`Error::Validation`] for missing or malformed fields
/// - [`Error::NotFound`] for unknown fabrics or boutiques
/// - [`Error::PriceMismatch`] / [`Error::TotalMismatch`] for tampered prices or totals
/// - [`Error::Database`] when the insert fails
#[instrument(skip_all, fields(user_phone = request.user_phone.as_deref().unwrap_or("")))]
pub async fn create_order(db: &DatabaseConnection, request: &CreateOrderRequest) -> Result<String> {
    let intake = intake::validate_intake(request)?;
    debug!(
        items = intake.items.len(),
        delivery_type = %intake.delivery_type,
        "Order intake validated"
    );

    let priced = pricing::verify_prices(db, &intake.items, intake.client_total).await?;
    debug!(total = priced.total, "Order prices verified");

    let delivery = delivery::resolve_delivery(
        db,
        intake.delivery_type,
        request.delivery_address.as_ref(),
        request.pickup_boutique_id.as_deref(),
    )
    .await?;

    persist_order(
        db,
        &intake.user_phone,
        &priced,
        &delivery,
        request.payment.as_ref(),
    )
    .await
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Writes a validated order and its lines in one transaction.
///
/// The order starts as `CREATED` with payment `PENDING`. Returns the generated id.
pub async fn persist_order(
    db: &DatabaseConnection,
    user_phone: &str,
    priced: &PricedOrder,
    delivery: &ResolvedDelivery,
    payment: Option<&PaymentRequest>,
) -> Result<String> {
    let order_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let (address, pickup_boutique_id) = match delivery {
        ResolvedDelivery::Home(address) => (Some(address), None),
        ResolvedDelivery::Boutique { boutique_id } => (None, Some(boutique_id.clone())),
    };

    let header = order::ActiveModel {
        id: Set(order_id.clone()),
        user_phone: Set(user_phone.to_string()),
        total: Set(priced.total),
        delivery_type: Set(delivery.delivery_type()),
        delivery_street: Set(address.map(|a| a.street.clone())),
        delivery_city: Set(address.map(|a| a.city.clone())),
        delivery_state: Set(address.and_then(|a| a.state.clone())),
        delivery_postal_code: Set(address.and_then(|a| a.postal_code.clone())),
        pickup_boutique_id: Set(pickup_boutique_id),
        payment_provider: Set(payment.and_then(|p| non_empty(p.provider.as_ref()))),
        payment_provider_order_id: Set(
            payment.and_then(|p| non_empty(p.provider_order_id.as_ref()))
        ),
        payment_provider_payment_id: Set(None),
        payment_provider_signature: Set(None),
        payment_status: Set(PaymentStatus::Pending),
        status: Set(OrderStatus::Created),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let lines = priced
        .lines
        .iter()
        .enumerate()
        .map(|(position, line)| {
            let position = i32::try_from(position)
                .map_err(|_| Error::validation("items", "too many items"))?;
            Ok(order_item::ActiveModel {
                order_id: Set(order_id.clone()),
                position: Set(position),
                fabric_id: Set(line.fabric_id.clone()),
                fabric_name: Set(line.fabric_name.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_subtotal: Set(line.line_subtotal),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Header and lines commit together; dropping the transaction on error rolls back.
    let txn = db.begin().await?;
    header
        .insert(&txn)
        .await
        .inspect_err(|e| error!(order_id, "Failed to insert order: {}", e))?;
    OrderItem::insert_many(lines)
        .exec(&txn)
        .await
        .inspect_err(|e| error!(order_id, "Failed to insert order items: {}", e))?;
    txn.commit().await?;

    info!(
        order_id,
        total = priced.total,
        delivery_type = %delivery.delivery_type(),
        "Order created"
    );
    Ok(order_id)
}

/// Loads an order header, failing with [`Error::NotFound`] if it does not exist.
pub async fn find_order<C>(db: &C, order_id: &str) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Order", order_id))
}

/// Loads the lines of an order in their original order.
pub async fn get_order_items<C>(db: &C, order_id: &str) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Who is looking at an order. Determines which fields are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderView {
    /// Administrators see every field
    Admin,
    /// Customers see only their own orders, without payment secrets
    Customer {
        /// Phone number the caller authenticated with
        user_phone: String,
    },
}

/// Payment sub-record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Gateway name
    pub provider: Option<String>,
    /// Gateway order id recorded at checkout
    pub provider_order_id: Option<String>,
    /// Admin view only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_payment_id: Option<String>,
    /// Admin view only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_signature: Option<String>,
    /// Payment sub-record status
    pub status: PaymentStatus,
}

/// An order with its lines, projected for a [`OrderView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    /// Order id
    pub id: String,
    /// Customer phone
    pub user_phone: String,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Home delivery or boutique pickup
    pub delivery_type: DeliveryType,
    /// Present for `HOME` delivery
    pub delivery_address: Option<DeliveryAddress>,
    /// Present for `BOUTIQUE` pickup
    pub pickup_boutique_id: Option<String>,
    /// Priced lines in their original order
    pub items: Vec<PricedLine>,
    /// Server-computed total
    pub total: f64,
    /// Payment sub-record, projected for the view
    pub payment: PaymentDetails,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
    /// Last change
    pub updated_at: DateTime<Utc>,
}

impl OrderDetails {
    fn project(order: order::Model, items: Vec<order_item::Model>, view: &OrderView) -> Self {
        let delivery_address = match (order.delivery_street, order.delivery_city) {
            (Some(street), Some(city)) => Some(DeliveryAddress {
                street,
                city,
                state: order.delivery_state,
                postal_code: order.delivery_postal_code,
            }),
            _ => None,
        };

        let is_admin = matches!(view, OrderView::Admin);
        let payment = PaymentDetails {
            provider: order.payment_provider,
            provider_order_id: order.payment_provider_order_id,
            provider_payment_id: order.payment_provider_payment_id.filter(|_| is_admin),
            provider_signature: order.payment_provider_signature.filter(|_| is_admin),
            status: order.payment_status,
        };

        let items = items
            .into_iter()
            .map(|item| PricedLine {
                fabric_id: item.fabric_id,
                fabric_name: item.fabric_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_subtotal: item.line_subtotal,
            })
            .collect();

        Self {
            id: order.id,
            user_phone: order.user_phone,
            status: order.status,
            delivery_type: order.delivery_type,
            delivery_address,
            pickup_boutique_id: order.pickup_boutique_id,
            items,
            total: order.total,
            payment,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Fetches an order with its lines for the given view.
///
/// A customer asking for someone else's order gets [`Error::NotFound`], exactly as if
/// the order did not exist.
pub async fn get_order_details(
    db: &DatabaseConnection,
    order_id: &str,
    view: &OrderView,
) -> Result<OrderDetails> {
    let order = find_order(db, order_id).await?;

    if matches!(view, OrderView::Customer { user_phone } if order.user_phone != user_phone.trim()) {
        warn!(order_id, "Customer requested an order that is not theirs");
        return Err(Error::not_found("Order", order_id));
    }

    let items = get_order_items(db, order_id).await?;
    Ok(OrderDetails::project(order, items, view))
}

/// Applies `update` to the order only if its status is still `observed`.
///
/// Returns the reloaded order, or [`Error::InvalidTransition`] if the status changed
/// underneath the caller.
pub(crate) async fn update_if_status<C>(
    db: &C,
    order_id: &str,
    observed: OrderStatus,
    target: OrderStatus,
    update: sea_orm::UpdateMany<Order>,
) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let result = update
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(observed))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let current = find_order(db, order_id).await?;
        warn!(
            order_id,
            observed = %observed,
            current = %current.status,
            "Order changed while being updated"
        );
        return Err(Error::InvalidTransition {
            from: current.status.to_string(),
            to: target.to_string(),
        });
    }

    find_order(db, order_id).await
}

/// Moves an order to `new_status` on behalf of `role`.
///
/// # Errors
/// - [`Error::NotFound`] when the order does not exist
/// - [`Error::Forbidden`] when `role` may not set `new_status`
/// - [`Error::InvalidTransition`] when the edge is not in the state machine
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: &str,
    role: AdminRole,
    new_status: OrderStatus,
) -> Result<order::Model> {
    let order = find_order(db, order_id).await?;
    status::authorize_transition(role, order.status, new_status)
        .inspect_err(|e| warn!(order_id, "Rejected status change: {}", e))?;

    let update = Order::update_many().col_expr(order::Column::Status, Expr::value(new_status));
    let updated = update_if_status(db, order_id, order.status, new_status, update).await?;

    info!(
        order_id,
        from = %order.status,
        to = %new_status,
        role = %role,
        "Order status changed"
    );
    Ok(updated)
}

/// Converts a home-delivery order into a boutique pickup and marks it `READY_FOR_PICKUP`.
///
/// The delivery address is cleared. This is the only path that sets a status outside
/// the transition table.
///
/// # Errors
/// - [`Error::NotFound`] when the order or boutique does not exist
/// - [`Error::Forbidden`] when `role` may not mark orders ready for pickup
/// - [`Error::InvalidTransition`] when the order is `DELIVERED`, `CANCELLED` or `SHIPPED`
/// - [`Error::Validation`] when the order is already a boutique pickup
#[instrument(skip(db))]
pub async fn convert_to_pickup(
    db: &DatabaseConnection,
    order_id: &str,
    role: AdminRole,
    pickup_boutique_id: Option<&str>,
) -> Result<order::Model> {
    let order = find_order(db, order_id).await?;

    if !role.may_assign(OrderStatus::ReadyForPickup) {
        return Err(Error::Forbidden {
            role: role.to_string(),
            action: "convert orders to pickup".to_string(),
        });
    }

    if !status::can_convert_to_pickup(order.status) {
        warn!(order_id, status = %order.status, "Rejected pickup conversion");
        return Err(Error::InvalidTransition {
            from: order.status.to_string(),
            to: OrderStatus::ReadyForPickup.to_string(),
        });
    }

    if order.delivery_type == DeliveryType::Boutique {
        return Err(Error::validation(
            "deliveryType",
            "order is already a boutique pickup",
        ));
    }

    let boutique_id = delivery::resolve_pickup_boutique(db, pickup_boutique_id).await?;

    let update = Order::update_many()
        .col_expr(order::Column::DeliveryType, Expr::value(DeliveryType::Boutique))
        .col_expr(
            order::Column::PickupBoutiqueId,
            Expr::value(Some(boutique_id.clone())),
        )
        .col_expr(order::Column::DeliveryStreet, Expr::value(Option::<String>::None))
        .col_expr(order::Column::DeliveryCity, Expr::value(Option::<String>::None))
        .col_expr(order::Column::DeliveryState, Expr::value(Option::<String>::None))
        .col_expr(
            order::Column::DeliveryPostalCode,
            Expr::value(Option::<String>::None),
        )
        .col_expr(
            order::Column::Status,
            Expr::value(OrderStatus::ReadyForPickup),
        );
    let updated =
        update_if_status(db, order_id, order.status, OrderStatus::ReadyForPickup, update).await?;

    info!(order_id, boutique_id, from = %order.status, "Order converted to boutique pickup");
    Ok(updated)
}
