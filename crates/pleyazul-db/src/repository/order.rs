//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → Order { status: Created }                           │
//! │                                                                         │
//! │  2. PAYMENT INITIATED                                                  │
//! │     └── mark_awaiting_payment() → status: AwaitingPayment              │
//! │     └── set_payment_reference() → provider order id recorded           │
//! │                                                                         │
//! │  3. CAPTURE                                                            │
//! │     └── mark_paid()   → status: Paid   (capture confirmed)             │
//! │     └── mark_failed() → status: Failed (capture declined)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Transitions
//! Every status change is an `UPDATE ... WHERE id = ? AND status = ?`.
//! The WHERE clause makes the transition a compare-and-swap: under
//! concurrent confirmation attempts exactly one caller wins, the rest
//! observe `false` and re-read.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use pleyazul_core::{Order, OrderStatus};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, spread_id = %order.spread_id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, email, spread_id, custom_question,
                status, payment_reference, amount_cents, currency,
                test_mode, created_at, updated_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.email)
        .bind(&order.spread_id)
        .bind(&order.custom_question)
        .bind(order.status)
        .bind(&order.payment_reference)
        .bind(order.amount_cents)
        .bind(&order.currency)
        .bind(order.test_mode)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, spread_id, custom_question,
                   status, payment_reference, amount_cents, currency,
                   test_mode, created_at, updated_at, paid_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_order).transpose()
    }

    /// Lists all orders in insertion order.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, spread_id, custom_question,
                   status, payment_reference, amount_cents, currency,
                   test_mode, created_at, updated_at, paid_at
            FROM orders
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_order).collect()
    }

    /// Advances a Created order to AwaitingPayment.
    ///
    /// Returns `false` when the order was not in Created (or doesn't
    /// exist); the caller re-reads to find out which.
    pub async fn mark_awaiting_payment(&self, id: &str) -> DbResult<bool> {
        self.transition(id, OrderStatus::Created, OrderStatus::AwaitingPayment)
            .await
    }

    /// Advances an AwaitingPayment order to Paid and stamps paid_at.
    pub async fn mark_paid(&self, id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'paid',
                paid_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'awaiting_payment'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let won = result.rows_affected() == 1;
        debug!(id = %id, won, "mark_paid");
        Ok(won)
    }

    /// Moves an AwaitingPayment order to Failed.
    pub async fn mark_failed(&self, id: &str) -> DbResult<bool> {
        self.transition(id, OrderStatus::AwaitingPayment, OrderStatus::Failed)
            .await
    }

    /// Records the provider-side payment reference.
    pub async fn set_payment_reference(&self, id: &str, reference: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payment_reference = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(reference)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Compare-and-swap status transition.
    async fn transition(&self, id: &str, from: OrderStatus, to: OrderStatus) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let won = result.rows_affected() == 1;
        debug!(id = %id, from = from.as_str(), to = to.as_str(), won, "Order transition");
        Ok(won)
    }
}

/// Maps a database row to an Order.
fn map_order(row: &SqliteRow) -> DbResult<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        spread_id: row.try_get("spread_id")?,
        custom_question: row.try_get("custom_question")?,
        status: row.try_get("status")?,
        payment_reference: row.try_get("payment_reference")?,
        amount_cents: row.try_get("amount_cents")?,
        currency: row.try_get("currency")?,
        test_mode: row.try_get("test_mode")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        paid_at: row.try_get("paid_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    fn test_order(spread_id: &str) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4().to_string(),
            email: "cliente@pleyazul.com".to_string(),
            spread_id: spread_id.to_string(),
            custom_question: None,
            status: OrderStatus::Created,
            payment_reference: None,
            amount_cents: 1999,
            currency: "EUR".to_string(),
            test_mode: true,
            created_at: now,
            updated_at: now,
            paid_at: None,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let db = test_db().await;
        let order = test_order("tarot_3_ppf");

        db.orders().insert(&order).await.unwrap();
        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, order.id);
        assert_eq!(loaded.email, order.email);
        assert_eq!(loaded.status, OrderStatus::Created);
        assert_eq!(loaded.amount_cents, 1999);
        assert!(loaded.test_mode);
        assert!(loaded.paid_at.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let db = test_db().await;
        let loaded = db.orders().get_by_id("nope").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let db = test_db().await;
        let repo = db.orders();

        let first = test_order("tarot_3_ppf");
        let second = test_order("rueda_astral");
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[tokio::test]
    async fn test_transition_chain() {
        let db = test_db().await;
        let repo = db.orders();
        let order = test_order("tarot_3_ppf");
        repo.insert(&order).await.unwrap();

        assert!(repo.mark_awaiting_payment(&order.id).await.unwrap());
        repo.set_payment_reference(&order.id, "PAYPAL-123")
            .await
            .unwrap();
        assert!(repo.mark_paid(&order.id).await.unwrap());

        let loaded = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
        assert_eq!(loaded.payment_reference.as_deref(), Some("PAYPAL-123"));
        assert!(loaded.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_paid_requires_awaiting_payment() {
        let db = test_db().await;
        let repo = db.orders();
        let order = test_order("tarot_3_ppf");
        repo.insert(&order).await.unwrap();

        // Still in Created: the CAS must lose
        assert!(!repo.mark_paid(&order.id).await.unwrap());

        let loaded = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_paid_is_terminal() {
        let db = test_db().await;
        let repo = db.orders();
        let order = test_order("tarot_3_ppf");
        repo.insert(&order).await.unwrap();

        assert!(repo.mark_awaiting_payment(&order.id).await.unwrap());
        assert!(repo.mark_paid(&order.id).await.unwrap());

        // A second capture or a late failure must not move the order
        assert!(!repo.mark_paid(&order.id).await.unwrap());
        assert!(!repo.mark_failed(&order.id).await.unwrap());

        let loaded = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_mark_failed_from_awaiting() {
        let db = test_db().await;
        let repo = db.orders();
        let order = test_order("iching_consulta");
        repo.insert(&order).await.unwrap();

        assert!(repo.mark_awaiting_payment(&order.id).await.unwrap());
        assert!(repo.mark_failed(&order.id).await.unwrap());

        let loaded = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_unique_violation() {
        let db = test_db().await;
        let repo = db.orders();
        let order = test_order("tarot_3_ppf");

        repo.insert(&order).await.unwrap();
        let err = repo.insert(&order).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
