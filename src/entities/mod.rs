//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod boutique;
pub mod fabric;
pub mod order;
pub mod order_item;

// Re-export specific types to avoid conflicts
pub use boutique::{Column as BoutiqueColumn, Entity as Boutique, Model as BoutiqueModel};
pub use fabric::{Column as FabricColumn, Entity as Fabric, Model as FabricModel};
pub use order::{
    Column as OrderColumn, DeliveryType, Entity as Order, Model as OrderModel, OrderStatus,
    PaymentStatus,
};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
