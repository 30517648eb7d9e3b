//! # Repository Implementations
//!
//! One repository per aggregate:
//! - [`order::OrderRepository`] - orders and their status transitions
//! - [`reading::ReadingRepository`] - generated readings, keyed by order

pub mod order;
pub mod reading;
