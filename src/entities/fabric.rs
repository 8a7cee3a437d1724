//! Fabric entity - A sellable catalog item priced per meter.
//!
//! `customer_price` is the authoritative price the order flow checks client
//! submissions against. Fabrics are soft-deleted so historic orders keep their references.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fabric database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fabrics")]
pub struct Model {
    /// Catalog identifier (e.g. `"F1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name shown to customers and used in error messages
    pub name: String,
    /// Price per meter charged to customers
    pub customer_price: f64,
    /// Soft delete flag - deleted fabrics cannot be ordered
    pub is_deleted: bool,
    /// When the fabric was created
    pub created_at: DateTime,
    /// When the fabric was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Fabric and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One fabric appears on many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
