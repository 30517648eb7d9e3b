//! # Fulfillment Service
//!
//! The orchestrator that owns the order state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order State Machine                                │
//! │                                                                         │
//! │  create_order                  confirm_payment        generate_reading │
//! │       │                              │                       │          │
//! │       ▼                              ▼                       ▼          │
//! │  created ──► awaiting_payment ──► paid ────────────► Reading persisted │
//! │                     │                                                   │
//! │                     └──► failed  (capture declined or                  │
//! │                                   payment creation failed)             │
//! │                                                                         │
//! │  generate_demo_reading: stateless, bypasses the machine entirely       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Requests run concurrently. Per-order serialization comes from two
//! mechanisms:
//! - payment transitions are compare-and-swap UPDATEs in the store
//! - reading generation holds a keyed async lock for the whole
//!   check-generate-persist sequence, so concurrent callers observe one
//!   payload
//!
//! Gateway calls run under a configured deadline; an elapsed call maps
//! to `GatewayUnavailable` instead of hanging the request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use pleyazul_core::{
    reading, validation, Order, OrderStatus, Reading, ReadingResult, Spread, DEMO_ID_PREFIX,
};
use pleyazul_db::Database;

use crate::config::FulfillmentConfig;
use crate::content::ContentRepository;
use crate::error::{FulfillmentError, FulfillmentResult};
use crate::gateway::{GatewayResult, MockGateway, PayPalGateway, PaymentGateway};

// =============================================================================
// Response Types
// =============================================================================

/// Result of creating an order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub payment: PaymentInstructions,
}

/// How the caller completes payment for a fresh order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentInstructions {
    /// Test mode: call `confirm_payment` with this reference.
    Mock { reference: String },

    /// Live mode: send the customer to the provider, then confirm with
    /// the provider order id.
    Redirect {
        provider_order_id: String,
        approval_url: Option<String>,
    },
}

/// Result of a payment confirmation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub confirmed: bool,
    pub status: OrderStatus,
}

/// An order together with its reading, when one exists.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithReading {
    pub order: Order,
    pub reading: Option<Reading>,
}

/// Integration snapshot for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: &'static str,
    pub test_mode: bool,
    pub gateway: &'static str,
    pub gateway_configured: bool,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Per-Order Locks
// =============================================================================

/// Keyed async locks serializing reading generation per order id.
#[derive(Debug, Default)]
struct OrderLocks {
    cells: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OrderLocks {
    /// Returns the lock cell for an order, creating it on first use.
    fn for_order(&self, order_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut cells = self.cells.lock().expect("order lock map poisoned");
        cells.entry(order_id.to_string()).or_default().clone()
    }
}

// =============================================================================
// Fulfillment Service
// =============================================================================

/// The fulfillment orchestrator.
///
/// Holds the injected configuration, the read-only content repository,
/// the active payment gateway and the store. Cheap to share behind an
/// `Arc` across request handlers.
pub struct FulfillmentService {
    config: FulfillmentConfig,
    content: Arc<dyn ContentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    db: Database,
    locks: OrderLocks,
}

impl FulfillmentService {
    /// Creates a service, selecting the gateway from the configuration.
    ///
    /// Test mode wires in [`MockGateway`]; live mode wires in
    /// [`PayPalGateway`]. The choice is made exactly once, here.
    pub fn new(
        config: FulfillmentConfig,
        content: Arc<dyn ContentRepository>,
        db: Database,
    ) -> Self {
        let gateway: Arc<dyn PaymentGateway> = if config.test_mode {
            Arc::new(MockGateway::new())
        } else {
            Arc::new(PayPalGateway::new(
                config.paypal.clone(),
                config.gateway_timeout,
            ))
        };

        Self::with_gateway(config, content, db, gateway)
    }

    /// Creates a service with an explicit gateway (test seam).
    pub fn with_gateway(
        config: FulfillmentConfig,
        content: Arc<dyn ContentRepository>,
        db: Database,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        info!(
            test_mode = config.test_mode,
            gateway = gateway.name(),
            "Fulfillment service initialized"
        );

        FulfillmentService {
            config,
            content,
            gateway,
            db,
            locks: OrderLocks::default(),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Creates an order for a spread and initiates payment.
    ///
    /// The order is persisted as Created and advanced to AwaitingPayment
    /// before the gateway is asked for a payment. If payment creation
    /// fails the order moves to Failed and the gateway error surfaces.
    pub async fn create_order(
        &self,
        email: &str,
        spread_id: &str,
        custom_question: Option<&str>,
    ) -> FulfillmentResult<CheckoutResponse> {
        validation::validate_email(email)?;
        validation::validate_spread_id(spread_id)?;
        let custom_question = validation::validate_custom_question(custom_question)?;

        // No order is persisted for an unknown spread
        let Some(spread) = self.content.spread(spread_id) else {
            return Err(FulfillmentError::InvalidSpread(spread_id.to_string()));
        };

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            spread_id: spread.id.clone(),
            custom_question,
            status: OrderStatus::Created,
            payment_reference: None,
            amount_cents: self.config.price_cents,
            currency: self.config.currency.clone(),
            test_mode: self.config.test_mode,
            created_at: now,
            updated_at: now,
            paid_at: None,
        };

        let orders = self.db.orders();
        orders.insert(&order).await?;
        orders.mark_awaiting_payment(&order.id).await?;

        let handle = match self.gateway_call(self.gateway.create_payment(&order)).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(order_id = %order.id, error = %err, "Payment creation failed");
                orders.mark_failed(&order.id).await?;
                return Err(err);
            }
        };

        orders
            .set_payment_reference(&order.id, &handle.provider_order_id)
            .await?;

        info!(
            order_id = %order.id,
            spread_id = %spread.id,
            gateway = self.gateway.name(),
            "Order created"
        );

        let payment = if self.config.test_mode {
            PaymentInstructions::Mock {
                reference: handle.provider_order_id,
            }
        } else {
            PaymentInstructions::Redirect {
                provider_order_id: handle.provider_order_id,
                approval_url: handle.approval_url,
            }
        };

        Ok(CheckoutResponse {
            order_id: order.id,
            status: OrderStatus::AwaitingPayment,
            payment,
        })
    }

    /// Verifies a payment reference against the gateway and advances the
    /// order to Paid.
    ///
    /// Idempotent: re-confirming a Paid order with its recorded
    /// reference is a no-op success. A definitive decline moves the
    /// order to Failed and reports `confirmed: false`; an unreachable
    /// provider surfaces as `GatewayUnavailable` with no state change.
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        reference: &str,
    ) -> FulfillmentResult<PaymentConfirmation> {
        let orders = self.db.orders();
        let order = orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.to_string()))?;

        match order.status {
            OrderStatus::AwaitingPayment => {}
            OrderStatus::Paid if order.payment_reference.as_deref() == Some(reference) => {
                debug!(order_id = %order.id, "Order already paid, re-confirmation is a no-op");
                return Ok(PaymentConfirmation {
                    order_id: order.id,
                    confirmed: true,
                    status: OrderStatus::Paid,
                });
            }
            status => {
                return Err(FulfillmentError::InvalidState {
                    order_id: order.id,
                    status,
                });
            }
        }

        // Capturing a reference this order never created would pay some
        // other provider order
        if order.payment_reference.as_deref() != Some(reference) {
            return Err(FulfillmentError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }

        let capture = self
            .gateway_call(self.gateway.capture_payment(reference))
            .await?;

        if !capture.confirmed {
            warn!(order_id = %order.id, "Payment capture declined");
            orders.mark_failed(&order.id).await?;
            return Ok(PaymentConfirmation {
                order_id: order.id,
                confirmed: false,
                status: OrderStatus::Failed,
            });
        }

        if orders.mark_paid(&order.id).await? {
            info!(order_id = %order.id, capture_id = ?capture.capture_id, "Payment confirmed");
            return Ok(PaymentConfirmation {
                order_id: order.id,
                confirmed: true,
                status: OrderStatus::Paid,
            });
        }

        // Lost the compare-and-swap: another confirmation got here first
        let current = orders
            .get_by_id(&order.id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order.id.clone()))?;

        if current.status == OrderStatus::Paid {
            Ok(PaymentConfirmation {
                order_id: current.id,
                confirmed: true,
                status: OrderStatus::Paid,
            })
        } else {
            Err(FulfillmentError::InvalidState {
                order_id: current.id,
                status: current.status,
            })
        }
    }

    /// Generates (or returns the already-generated) reading for a paid
    /// order.
    ///
    /// Serialized per order id: two concurrent calls draw once, both
    /// receive the same payload.
    pub async fn generate_reading(&self, order_id: &str) -> FulfillmentResult<Reading> {
        let cell = self.locks.for_order(order_id);
        let _guard = cell.lock().await;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.to_string()))?;

        if let Some(existing) = self.db.readings().get_by_order(&order.id).await? {
            debug!(order_id = %order.id, "Reading already exists, returning stored payload");
            return Ok(existing);
        }

        if order.status != OrderStatus::Paid {
            return Err(FulfillmentError::PaymentNotConfirmed(order.id));
        }

        let spread = self
            .content
            .spread(&order.spread_id)
            .ok_or_else(|| FulfillmentError::InvalidSpread(order.spread_id.clone()))?;

        let result = self.draw(&spread)?;

        let reading = Reading {
            id: order.id.clone(),
            order_id: order.id.clone(),
            result,
            is_demo: false,
            generated_at: Utc::now(),
        };

        self.db.readings().insert(&reading).await?;

        info!(order_id = %order.id, oracle = %spread.oracle, "Reading generated");

        // The insert ignores conflicts; re-read so that even a racing
        // writer outside this process observes a single stored payload
        let stored = self.db.readings().get_by_order(&order.id).await?;
        Ok(stored.unwrap_or(reading))
    }

    /// Generates a preview reading without an order or payment.
    ///
    /// Stateless: nothing touches the store, the synthesized id carries
    /// the `demo_` prefix, and `is_demo` is set.
    pub async fn generate_demo_reading(&self, spread_id: &str) -> FulfillmentResult<Reading> {
        validation::validate_spread_id(spread_id)?;

        let spread = self
            .content
            .spread(spread_id)
            .ok_or_else(|| FulfillmentError::InvalidSpread(spread_id.to_string()))?;

        let result = self.draw(&spread)?;
        let demo_id = format!("{}{}", DEMO_ID_PREFIX, Uuid::new_v4().simple());

        info!(demo_id = %demo_id, spread_id = %spread.id, "Demo reading generated");

        Ok(Reading {
            id: demo_id.clone(),
            order_id: demo_id,
            result,
            is_demo: true,
            generated_at: Utc::now(),
        })
    }

    /// Fetches an order and its reading, when one has been generated.
    pub async fn get_order(&self, order_id: &str) -> FulfillmentResult<OrderWithReading> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.to_string()))?;

        let reading = self.db.readings().get_by_order(order_id).await?;

        Ok(OrderWithReading { order, reading })
    }

    /// Fetches the reading for an order.
    pub async fn get_reading(&self, order_id: &str) -> FulfillmentResult<Reading> {
        self.db
            .readings()
            .get_by_order(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::ReadingNotFound(order_id.to_string()))
    }

    /// Lists all orders in insertion order.
    pub async fn list_orders(&self) -> FulfillmentResult<Vec<Order>> {
        Ok(self.db.orders().list_all().await?)
    }

    /// Integration snapshot for the status endpoint.
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            service: "Pleyazul Oráculos API",
            test_mode: self.config.test_mode,
            gateway: self.gateway.name(),
            gateway_configured: self.gateway.is_configured(),
            timestamp: Utc::now(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Runs a gateway call under the configured deadline.
    async fn gateway_call<T>(
        &self,
        call: impl Future<Output = GatewayResult<T>>,
    ) -> FulfillmentResult<T> {
        match timeout(self.config.gateway_timeout, call).await {
            Ok(result) => result.map_err(FulfillmentError::from),
            Err(_) => Err(FulfillmentError::GatewayUnavailable(
                "gateway call timed out".to_string(),
            )),
        }
    }

    /// Draws a reading for a spread from the content catalog.
    fn draw(&self, spread: &Spread) -> FulfillmentResult<ReadingResult> {
        let mut rng = StdRng::from_os_rng();

        reading::generate(spread, self.content.catalog(), &mut rng).map_err(|err| {
            let mapped = FulfillmentError::from(err);
            if let FulfillmentError::InsufficientCatalog { .. } = mapped {
                error!(spread_id = %spread.id, error = %mapped, "Catalog cannot satisfy spread");
            }
            mapped
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
