//! # Fulfillment Error Type
//!
//! The single error surface a transport layer maps to its own responses.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation   MissingField, InvalidSpread        → reject, never retry │
//! │  State        OrderNotFound, ReadingNotFound,                          │
//! │               InvalidState, PaymentNotConfirmed  → caller must correct │
//! │  Dependency   GatewayUnavailable                 → retry with backoff  │
//! │               InsufficientCatalog                → fatal config defect │
//! │  Internal     Store, Internal                    → surface as 500      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use pleyazul_core::{CoreError, OracleType, OrderStatus, ValidationError};
use pleyazul_db::DbError;

use crate::gateway::GatewayError;

/// Errors returned by the fulfillment service.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// A required request field is missing or empty.
    #[error("{field} is required")]
    MissingField { field: String },

    /// The requested spread does not exist in the catalog.
    #[error("Invalid spread_id: {0}")]
    InvalidSpread(String),

    /// Request field failed validation (length, format).
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// No order with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// No reading has been generated for this order.
    #[error("Reading not found for order: {0}")]
    ReadingNotFound(String),

    /// The order is not in a state that allows the requested operation.
    #[error("Order {order_id} is {status:?}, cannot perform operation")]
    InvalidState {
        order_id: String,
        status: OrderStatus,
    },

    /// Reading generation was requested before payment was captured.
    #[error("Payment not confirmed for order {0}")]
    PaymentNotConfirmed(String),

    /// The payment provider could not be reached. Retryable.
    #[error("Payment provider unavailable: {0}")]
    GatewayUnavailable(String),

    /// The content catalog cannot satisfy a spread's draw count.
    ///
    /// A configuration defect, logged at error level before surfacing.
    #[error("{oracle} catalog cannot satisfy spread: {available} available, {required} required")]
    InsufficientCatalog {
        oracle: OracleType,
        available: usize,
        required: usize,
    },

    /// Store failure.
    #[error(transparent)]
    Store(#[from] DbError),

    /// Anything else that should never happen.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error kinds for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingField,
    InvalidSpread,
    ValidationError,
    OrderNotFound,
    ReadingNotFound,
    InvalidState,
    PaymentNotConfirmed,
    GatewayUnavailable,
    InsufficientCatalog,
    Internal,
}

impl FulfillmentError {
    /// The machine-readable kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::MissingField { .. } => ErrorKind::MissingField,
            FulfillmentError::InvalidSpread(_) => ErrorKind::InvalidSpread,
            FulfillmentError::Validation(_) => ErrorKind::ValidationError,
            FulfillmentError::OrderNotFound(_) => ErrorKind::OrderNotFound,
            FulfillmentError::ReadingNotFound(_) => ErrorKind::ReadingNotFound,
            FulfillmentError::InvalidState { .. } => ErrorKind::InvalidState,
            FulfillmentError::PaymentNotConfirmed(_) => ErrorKind::PaymentNotConfirmed,
            FulfillmentError::GatewayUnavailable(_) => ErrorKind::GatewayUnavailable,
            FulfillmentError::InsufficientCatalog { .. } => ErrorKind::InsufficientCatalog,
            FulfillmentError::Store(_) | FulfillmentError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same request with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FulfillmentError::GatewayUnavailable(_))
    }
}

/// Absent required fields get their own kind; other validation failures
/// stay under ValidationError.
impl From<ValidationError> for FulfillmentError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Required { field } => FulfillmentError::MissingField { field },
            other => FulfillmentError::Validation(other),
        }
    }
}

impl From<CoreError> for FulfillmentError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientCatalog {
                oracle,
                available,
                required,
            } => FulfillmentError::InsufficientCatalog {
                oracle,
                available,
                required,
            },
            CoreError::MalformedSpread { spread_id, reason } => {
                FulfillmentError::Internal(format!("malformed spread {}: {}", spread_id, reason))
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<GatewayError> for FulfillmentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable(msg) => FulfillmentError::GatewayUnavailable(msg),
            GatewayError::NotConfigured => {
                FulfillmentError::GatewayUnavailable("gateway not configured".to_string())
            }
        }
    }
}

/// Result type for fulfillment operations.
pub type FulfillmentResult<T> = Result<T, FulfillmentError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_maps_to_missing_field() {
        let err: FulfillmentError = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_other_validation_keeps_validation_kind() {
        let err: FulfillmentError = ValidationError::TooLong {
            field: "custom_question".to_string(),
            max: 500,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_insufficient_catalog_propagates_context() {
        let err: FulfillmentError = CoreError::InsufficientCatalog {
            oracle: OracleType::Rueda,
            available: 3,
            required: 5,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InsufficientCatalog);
        assert!(err.to_string().contains("3 available"));
    }

    #[test]
    fn test_only_gateway_unavailable_is_retryable() {
        let gateway: FulfillmentError =
            GatewayError::Unavailable("timeout".to_string()).into();
        assert!(gateway.is_retryable());

        let not_found = FulfillmentError::OrderNotFound("x".to_string());
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::PaymentNotConfirmed).unwrap();
        assert_eq!(json, "\"PAYMENT_NOT_CONFIRMED\"");
    }
}
