//! # Payment Gateway Adapter
//!
//! The capability interface the fulfillment core calls to create and
//! capture payments, polymorphic over the live and test variants:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PaymentGateway trait                               │
//! │                                                                         │
//! │   FulfillmentService ──► create_payment(order) ──► PaymentHandle       │
//! │                     └──► capture_payment(ref)  ──► Capture             │
//! │                                                                         │
//! │   ┌─────────────────────┐          ┌─────────────────────┐             │
//! │   │    PayPalGateway    │          │     MockGateway     │             │
//! │   │  OAuth + Checkout   │          │  fabricated handles │             │
//! │   │  Orders v2 (live)   │          │  (test mode only)   │             │
//! │   └─────────────────────┘          └─────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Which variant is active is a process-wide decision made once at
//! service construction from [`FulfillmentConfig::test_mode`], never
//! per request.
//!
//! [`FulfillmentConfig::test_mode`]: crate::config::FulfillmentConfig

pub mod mock;
pub mod paypal;

use async_trait::async_trait;
use thiserror::Error;

use pleyazul_core::Order;

pub use mock::MockGateway;
pub use paypal::PayPalGateway;

// =============================================================================
// Capability Types
// =============================================================================

/// Provider-side handle for a created payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentHandle {
    /// The reference the customer (or mock confirmation call) presents
    /// back for capture.
    pub provider_order_id: String,

    /// Where to send the customer to approve the payment (live only).
    pub approval_url: Option<String>,
}

/// Outcome of a capture attempt.
///
/// `confirmed == false` is a definitive decline, not an outage; outages
/// surface as [`GatewayError::Unavailable`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub confirmed: bool,

    /// Provider capture id, when one was issued.
    pub capture_id: Option<String>,
}

/// Payment gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure or provider timeout. Retryable by the caller.
    #[error("Payment provider unavailable: {0}")]
    Unavailable(String),

    /// The gateway has no usable credentials.
    #[error("Payment gateway not configured")]
    NotConfigured,
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// Capability Trait
// =============================================================================

/// Creates and captures payments for orders.
///
/// Implementations never treat a capture failure as success: a decline
/// comes back as `Capture { confirmed: false, .. }` and an outage as
/// `GatewayError::Unavailable`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short identifier for logs and the status report.
    fn name(&self) -> &'static str;

    /// Whether the gateway can actually reach its provider.
    fn is_configured(&self) -> bool;

    /// Creates a payment for the order, returning the provider handle.
    async fn create_payment(&self, order: &Order) -> GatewayResult<PaymentHandle>;

    /// Captures a previously created payment by its reference.
    async fn capture_payment(&self, reference: &str) -> GatewayResult<Capture>;
}
