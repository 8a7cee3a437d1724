//! Core business logic - framework-agnostic order operations.
//!
//! Order creation is a four-stage pipeline: [`intake`] checks request shape,
//! [`pricing`] re-prices every line from the catalog, [`delivery`] resolves the delivery
//! branch, and [`order`] persists the result. Lifecycle changes go through [`status`];
//! payment callbacks through [`payment`].

/// Fabric and boutique lookups, creation and seeding
pub mod catalog;
/// Delivery type branching and address/boutique validation
pub mod delivery;
/// Request shapes and fail-fast field validation
pub mod intake;
/// Order creation, details query, status changes and pickup conversion
pub mod order;
/// Gateway signature verification and payment confirmation
pub mod payment;
/// Anti-tamper price and total recomputation
pub mod pricing;
/// Order status state machine and role policy
pub mod status;
