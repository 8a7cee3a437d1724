//! Boutique entity - A physical location where customers collect pickup orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Boutique database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "boutiques")]
pub struct Model {
    /// Boutique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Boutique name
    pub name: String,
    /// City the boutique is located in
    pub city: String,
    /// Street address
    pub address: String,
    /// Soft delete flag - deleted boutiques cannot be chosen for pickup
    pub is_deleted: bool,
}

/// Defines relationships between Boutique and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One boutique serves many pickup orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
