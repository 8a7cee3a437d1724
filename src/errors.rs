//! Unified error type for the order service.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer maps each
//! variant to a status code through [`Error::status_code`] and renders the `Display`
//! text as the user-facing message.

use thiserror::Error;

/// All errors produced by the order service.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input. `field` names the first offending field.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Request field that failed validation
        field: String,
        /// What was wrong with it
        message: String,
    },

    /// A referenced record does not exist (or is soft-deleted).
    #[error("{entity} not found: {reference}")]
    NotFound {
        /// Kind of record, e.g. `"Fabric"` or `"Boutique"`
        entity: &'static str,
        /// The dangling reference as submitted
        reference: String,
    },

    /// Client-submitted unit price differs from the catalog price.
    #[error("Price mismatch for '{item}': submitted {submitted}, catalog price is {expected:.2}")]
    PriceMismatch {
        /// Name of the offending catalog item
        item: String,
        /// Price the client sent
        submitted: f64,
        /// Authoritative catalog price
        expected: f64,
    },

    /// Client-submitted order total differs from the server-computed total.
    #[error("Total mismatch: server computed {server_total:.2}, client submitted {client_total}")]
    TotalMismatch {
        /// Total recomputed from catalog prices, rounded to 2 decimal places
        server_total: f64,
        /// Total the client sent
        client_total: f64,
    },

    /// The requested status change is not an edge of the order state machine.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Caller's role does not allow the operation.
    #[error("Role {role} may not {action}")]
    Forbidden {
        /// Role claimed by the caller
        role: String,
        /// Operation that was refused
        action: String,
    },

    /// No usable role was presented.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the caller was rejected
        message: String,
    },

    /// Payment gateway signature did not verify.
    #[error("Payment verification failed for order {order_id}")]
    PaymentVerification {
        /// Order whose payment was rejected
        order_id: String,
    },

    /// Configuration error (missing file, bad TOML, bad env value).
    #[error("Configuration error: {message}")]
    Config {
        /// Details of the configuration problem
        message: String,
    },

    /// Storage-layer failure.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O failure (config files, socket binding).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::Database(value.to_string())
    }
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, reference: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            reference: reference.into(),
        }
    }

    /// True for the anti-tamper failures (price or total recomputation mismatch).
    #[must_use]
    pub const fn is_tamper(&self) -> bool {
        matches!(self, Self::PriceMismatch { .. } | Self::TotalMismatch { .. })
    }

    /// HTTP status code this error is surfaced with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. }
            | Self::PriceMismatch { .. }
            | Self::TotalMismatch { .. }
            | Self::InvalidTransition { .. }
            | Self::PaymentVerification { .. } => 400,
            Self::Unauthorized { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => 500,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
