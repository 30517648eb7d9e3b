//! # Reading Repository
//!
//! Database operations for generated readings.
//!
//! Readings are keyed by order id (PRIMARY KEY), one per order. Inserts
//! use `ON CONFLICT DO NOTHING`: if two generation attempts race past
//! the service-level lock, the first stored payload wins and the loser's
//! draw is discarded, which is exactly the idempotence the fulfillment
//! core promises.
//!
//! Demo readings never reach this repository.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use pleyazul_core::{Reading, ReadingResult};

/// Repository for reading database operations.
#[derive(Debug, Clone)]
pub struct ReadingRepository {
    pool: SqlitePool,
}

impl ReadingRepository {
    /// Creates a new ReadingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReadingRepository { pool }
    }

    /// Inserts a reading for an order.
    ///
    /// A duplicate insert for the same order id is a no-op; callers that
    /// need the stored payload re-read with [`get_by_order`].
    ///
    /// [`get_by_order`]: ReadingRepository::get_by_order
    pub async fn insert(&self, reading: &Reading) -> DbResult<()> {
        debug!(order_id = %reading.order_id, "Inserting reading");

        let result_json = serde_json::to_string(&reading.result)?;

        sqlx::query(
            r#"
            INSERT INTO readings (order_id, result_json, generated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(order_id) DO NOTHING
            "#,
        )
        .bind(&reading.order_id)
        .bind(result_json)
        .bind(reading.generated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the reading for an order, if one has been generated.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<Reading>> {
        let row = sqlx::query(
            r#"
            SELECT order_id, result_json, generated_at
            FROM readings
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_id: String = row.try_get("order_id")?;
        let result_json: String = row.try_get("result_json")?;
        let generated_at: DateTime<Utc> = row.try_get("generated_at")?;

        let result: ReadingResult = serde_json::from_str(&result_json)?;

        Ok(Some(Reading {
            id: order_id.clone(),
            order_id,
            result,
            is_demo: false,
            generated_at,
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
