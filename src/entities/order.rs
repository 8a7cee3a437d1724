//! Order entity - A single customer purchase and its lifecycle enums.
//!
//! The order header stores the server-computed total, the resolved delivery fields
//! and the payment sub-record as flat columns. Line items live in
//! [`super::order_item`]. Enums are stored as their upper-case wire names.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How the customer receives the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    /// Shipped to the customer's address
    #[sea_orm(string_value = "HOME")]
    Home,
    /// Collected by the customer at a boutique
    #[sea_orm(string_value = "BOUTIQUE")]
    Boutique,
}

/// Order lifecycle status. See [`crate::core::status`] for the allowed transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, awaiting payment
    #[sea_orm(string_value = "CREATED")]
    Created,
    /// Payment confirmed
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Being cut and packed
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    /// Waiting at the boutique for collection
    #[sea_orm(string_value = "READY_FOR_PICKUP")]
    ReadyForPickup,
    /// Handed to the courier
    #[sea_orm(string_value = "SHIPPED")]
    Shipped,
    /// Received by the customer
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    /// Abandoned; no further changes
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Status of the payment sub-record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No confirmed payment yet
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Gateway signature verified
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Last confirmation attempt failed verification
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl DeliveryType {
    /// Wire name (`"HOME"` / `"BOUTIQUE"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Boutique => "BOUTIQUE",
        }
    }
}

impl OrderStatus {
    /// Wire name (e.g. `"READY_FOR_PICKUP"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Paid => "PAID",
            Self::Processing => "PROCESSING",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// `DELIVERED` and `CANCELLED` accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOME" => Ok(Self::Home),
            "BOUTIQUE" => Ok(Self::Boutique),
            other => Err(format!("unknown delivery type '{other}'")),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "PAID" => Ok(Self::Paid),
            "PROCESSING" => Ok(Self::Processing),
            "READY_FOR_PICKUP" => Ok(Self::ReadyForPickup),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Generated UUID v4
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Phone number identifying the customer
    pub user_phone: String,
    /// Server-computed total, rounded to 2 decimal places
    pub total: f64,
    /// Home delivery or boutique pickup
    pub delivery_type: DeliveryType,
    /// Populated only for `HOME` delivery
    pub delivery_street: Option<String>,
    /// Populated only for `HOME` delivery
    pub delivery_city: Option<String>,
    /// Optional part of a `HOME` address
    pub delivery_state: Option<String>,
    /// Optional part of a `HOME` address
    pub delivery_postal_code: Option<String>,
    /// Populated only for `BOUTIQUE` delivery
    pub pickup_boutique_id: Option<String>,
    /// Payment gateway name (e.g. `"razorpay"`)
    pub payment_provider: Option<String>,
    /// Gateway order id recorded at checkout
    pub payment_provider_order_id: Option<String>,
    /// Gateway payment id, set once the payment is confirmed
    #[sea_orm(unique)]
    pub payment_provider_payment_id: Option<String>,
    /// Signature of the confirmed payment
    pub payment_provider_signature: Option<String>,
    /// State of the payment sub-record
    pub payment_status: PaymentStatus,
    /// Lifecycle status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// Last lifecycle or payment change
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    /// Pickup orders reference one boutique
    #[sea_orm(
        belongs_to = "super::boutique::Entity",
        from = "Column::PickupBoutiqueId",
        to = "super::boutique::Column::Id"
    )]
    Boutique,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::boutique::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Boutique.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
