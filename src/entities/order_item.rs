//! Order item entity - One server-priced line of an order.
//!
//! Lines are written once together with their order and never edited.
//! `line_subtotal` is always `quantity * unit_price`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: String,
    /// Position of the line within the order, starting at 0
    pub position: i32,
    /// Referenced fabric
    pub fabric_id: String,
    /// Fabric name at the time of ordering
    pub fabric_name: String,
    /// Meters ordered (fractional allowed)
    pub quantity: f64,
    /// Catalog price per meter at the time of ordering
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub line_subtotal: f64,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// Each line references one fabric
    #[sea_orm(
        belongs_to = "super::fabric::Entity",
        from = "Column::FabricId",
        to = "super::fabric::Column::Id"
    )]
    Fabric,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::fabric::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fabric.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
