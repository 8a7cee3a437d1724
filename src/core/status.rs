//! Order status state machine and role policy.
//!
//! ```text
//! CREATED -> PAID -> PROCESSING -> READY_FOR_PICKUP -> SHIPPED -> DELIVERED
//! ```
//!
//! `PROCESSING` may skip straight to `SHIPPED` and `READY_FOR_PICKUP` straight to
//! `DELIVERED`. `CANCELLED` is reachable from every non-terminal state. `DELIVERED`
//! and `CANCELLED` are terminal.
//!
//! Every status change goes through [`authorize_transition`]: the caller's role must be
//! allowed to target the new status and the edge must be in the table, whoever the
//! caller is.

use crate::{
    entities::OrderStatus,
    errors::{Error, Result},
};
use std::{fmt, str::FromStr};

/// Administrative role of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRole {
    /// Elevated role, may target any status
    SuperAdmin,
    /// Standard operator, limited to fulfilment statuses
    Operator,
}

impl AdminRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Operator => "OPERATOR",
        }
    }

    /// Statuses this role may set.
    #[must_use]
    pub const fn assignable_statuses(self) -> &'static [OrderStatus] {
        match self {
            Self::SuperAdmin => &[
                OrderStatus::Created,
                OrderStatus::Paid,
                OrderStatus::Processing,
                OrderStatus::ReadyForPickup,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ],
            Self::Operator => &[
                OrderStatus::Processing,
                OrderStatus::ReadyForPickup,
                OrderStatus::Shipped,
            ],
        }
    }

    /// Whether this role may set `status`.
    #[must_use]
    pub fn may_assign(self, status: OrderStatus) -> bool {
        self.assignable_statuses().contains(&status)
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUPER_ADMIN" | "SUPERADMIN" => Ok(Self::SuperAdmin),
            "OPERATOR" => Ok(Self::Operator),
            other => Err(Error::Unauthorized {
                message: format!("unknown role '{other}'"),
            }),
        }
    }
}

/// Statuses reachable from `from` in one step.
#[must_use]
pub const fn next_statuses(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::{Cancelled, Created, Delivered, Paid, Processing, ReadyForPickup, Shipped};
    match from {
        Created => &[Paid, Cancelled],
        Paid => &[Processing, Cancelled],
        Processing => &[ReadyForPickup, Shipped, Cancelled],
        ReadyForPickup => &[Shipped, Delivered, Cancelled],
        Shipped => &[Delivered, Cancelled],
        Delivered | Cancelled => &[],
    }
}

/// Whether `from -> to` is an edge of the state machine.
#[must_use]
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    next_statuses(from).contains(&to)
}

/// Checks the transition edge, ignoring roles.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Checks that `role` may move an order from `from` to `to`.
///
/// # Errors
/// - [`Error::Forbidden`] when the role may not target `to` at all
/// - [`Error::InvalidTransition`] when `from -> to` is not an edge
pub fn authorize_transition(role: AdminRole, from: OrderStatus, to: OrderStatus) -> Result<()> {
    if !role.may_assign(to) {
        return Err(Error::Forbidden {
            role: role.to_string(),
            action: format!("set status {to}"),
        });
    }
    check_transition(from, to)
}

/// Statuses that block conversion to boutique pickup.
pub const PICKUP_CONVERSION_BLOCKED: [OrderStatus; 3] = [
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
    OrderStatus::Shipped,
];

/// Whether an order in `status` may still be converted to boutique pickup.
#[must_use]
pub fn can_convert_to_pickup(status: OrderStatus) -> bool {
    !PICKUP_CONVERSION_BLOCKED.contains(&status)
}
