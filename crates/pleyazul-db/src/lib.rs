//! # pleyazul-db: Database Layer for Pleyazul Oráculos
//!
//! This crate provides the Order/Reading store for the fulfillment
//! pipeline. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fulfillment Data Flow                              │
//! │                                                                         │
//! │  FulfillmentService (create_order, generate_reading, ...)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   pleyazul-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄──│ OrderRepo      │   │  (embedded)  │   │   │
//! │  │   │   SqlitePool  │   │ ReadingRepo    │   │ 001_init.sql │   │   │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (order, reading)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pleyazul_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("orders.db")).await?;
//! let order = db.orders().get_by_id("...").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::reading::ReadingRepository;
