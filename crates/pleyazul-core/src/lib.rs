//! # pleyazul-core: Pure Business Logic for Pleyazul Oráculos
//!
//! This crate is the heart of the fulfillment pipeline. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Pleyazul Oráculos Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Transport (JSON-over-HTTP, out of scope)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pleyazul-fulfillment                           │   │
//! │  │    create_order, confirm_payment, generate_reading, demo       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pleyazul-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  reading  │  │ validation│  │   error   │  │   │
//! │  │   │  Spread   │  │ generator │  │   rules   │  │   types   │  │   │
//! │  │   │  Order    │  │  (pure)   │  │  checks   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • INJECTED RANDOMNESS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pleyazul-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Spread, Order, Reading, catalog records)
//! - [`reading`] - The reading generator (pure function of spread + RNG)
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the generator draws from an injected `Rng`, so
//!    the same seed replays the same reading
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod reading;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a customer email address.
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum length of a spread identifier.
pub const MAX_SPREAD_ID_LEN: usize = 64;

/// Maximum length of a customer's custom question.
///
/// Long enough for a paragraph, short enough to keep order rows small.
pub const MAX_QUESTION_LEN: usize = 500;
