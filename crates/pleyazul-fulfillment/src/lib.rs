//! # pleyazul-fulfillment: Order/Payment/Reading Orchestration
//!
//! The fulfillment core for Pleyazul Oráculos: a customer selects a
//! spread, pays (live PayPal or test-mode mock), and receives a
//! generated reading assembled from the content catalog.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Transport (JSON-over-HTTP, out of scope)                 │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼─────────────────────────────────────────┐
//! │              ★ pleyazul-fulfillment (THIS CRATE) ★                      │
//! │                                                                         │
//! │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌────────────┐      │
//! │   │  service   │  │  content   │  │  gateway   │  │   config   │      │
//! │   │  state     │  │  catalog   │  │  PayPal /  │  │  env +     │      │
//! │   │  machine   │  │  seam      │  │  Mock      │  │  defaults  │      │
//! │   └────────────┘  └────────────┘  └────────────┘  └────────────┘      │
//! └───────────────┬─────────────────────────────┬───────────────────────────┘
//!                 │                             │
//!      ┌──────────▼──────────┐       ┌──────────▼──────────┐
//!      │   pleyazul-core     │       │    pleyazul-db      │
//!      │   pure domain       │       │    SQLite store     │
//!      └─────────────────────┘       └─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pleyazul_db::{Database, DbConfig};
//! use pleyazul_fulfillment::{FulfillmentConfig, FulfillmentService, InMemoryContent};
//!
//! let config = FulfillmentConfig::load()?;
//! let content = Arc::new(InMemoryContent::from_json(spreads, tarot, iching, rueda)?);
//! let db = Database::new(DbConfig::new("orders.db")).await?;
//!
//! let service = FulfillmentService::new(config, content, db);
//! let checkout = service.create_order("cliente@example.com", "tarot_3_ppf", None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod content;
pub mod error;
pub mod gateway;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, FulfillmentConfig, PayPalConfig};
pub use content::{ContentRepository, InMemoryContent};
pub use error::{ErrorKind, FulfillmentError, FulfillmentResult};
pub use gateway::{
    Capture, GatewayError, GatewayResult, MockGateway, PayPalGateway, PaymentGateway,
    PaymentHandle,
};
pub use service::{
    CheckoutResponse, FulfillmentService, OrderWithReading, PaymentConfirmation,
    PaymentInstructions, ServiceStatus,
};
