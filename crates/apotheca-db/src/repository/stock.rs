//! # Stock Ledger
//!
//! Applies signed quantity deltas to `items.stock_quantity`.
//!
//! ## Delta Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: Absolute update (loses concurrent sales)                │
//! │     UPDATE items SET stock_quantity = 7 WHERE id = ?               │
//! │                                                                     │
//! │  ✅ CORRECT: Relative update                                       │
//! │     UPDATE items SET stock_quantity = stock_quantity - 3           │
//! │                                                                     │
//! │  sale created   → delta = -quantity                                │
//! │  sale reversed  → delta = +quantity (update, delete)               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger has no commit boundary of its own. It always runs on the
//! connection of the caller's transaction, so a failed sale write takes its
//! stock changes down with it.

use apotheca_core::CoreError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::debug;

use super::format_timestamp;
use crate::error::{DbError, DbResult};

/// What to do when a decrement would take stock below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Overselling is recorded; stock may go negative.
    #[default]
    AllowNegative,
    /// The write fails with `CoreError::InsufficientStock`.
    RejectNegative,
}

/// Stock adjuster bound to a policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockLedger {
    policy: StockPolicy,
}

impl StockLedger {
    pub fn new(policy: StockPolicy) -> Self {
        StockLedger { policy }
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Adds `delta` to the stock of `item_id` on the given connection.
    ///
    /// ## Errors
    /// - `DbError::ForeignKeyViolation` - the item doesn't exist
    /// - `DbError::Domain(InsufficientStock)` - negative result under
    ///   [`StockPolicy::RejectNegative`]
    pub async fn apply_delta(
        &self,
        conn: &mut SqliteConnection,
        item_id: i64,
        delta: i64,
    ) -> DbResult<()> {
        debug!(item_id = %item_id, delta = %delta, "Applying stock delta");

        let now = format_timestamp(Utc::now());
        let guard_negative = self.policy == StockPolicy::RejectNegative && delta < 0;

        let sql = if guard_negative {
            r#"
            UPDATE items
            SET stock_quantity = stock_quantity + ?1,
                updated_at = ?2
            WHERE id = ?3 AND stock_quantity + ?1 >= 0
            "#
        } else {
            r#"
            UPDATE items
            SET stock_quantity = stock_quantity + ?1,
                updated_at = ?2
            WHERE id = ?3
            "#
        };

        let result = sqlx::query(sql)
            .bind(delta)
            .bind(&now)
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing updated: either the item is missing or the guard refused.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM items WHERE id = ?1")
                .bind(item_id)
                .fetch_optional(&mut *conn)
                .await?;

        match available {
            None => Err(DbError::foreign_key(format!("Item {item_id} does not exist"))),
            Some(available) => Err(CoreError::InsufficientStock {
                item_id,
                available,
                requested: -delta,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use apotheca_core::{Money, NewItem};

    async fn setup(policy: StockPolicy) -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory().stock_policy(policy))
            .await
            .unwrap();
        let item = db
            .items()
            .insert(&NewItem {
                name: "Ibuprofen 200mg".to_string(),
                price: Money::parse("4.50").unwrap(),
                stock_quantity: 3,
            })
            .await
            .unwrap();
        (db, item.id)
    }

    #[tokio::test]
    async fn test_apply_delta_both_directions() {
        let (db, id) = setup(StockPolicy::AllowNegative).await;
        let ledger = StockLedger::default();
        let mut conn = db.pool().acquire().await.unwrap();

        ledger.apply_delta(&mut conn, id, -5).await.unwrap();
        ledger.apply_delta(&mut conn, id, 1).await.unwrap();
        drop(conn);

        assert_eq!(db.items().stock(id).await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_missing_item_is_foreign_key_violation() {
        let (db, _) = setup(StockPolicy::AllowNegative).await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = StockLedger::default()
            .apply_delta(&mut conn, 999, -1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_reject_negative_policy() {
        let (db, id) = setup(StockPolicy::RejectNegative).await;
        let ledger = StockLedger::new(StockPolicy::RejectNegative);
        let mut conn = db.pool().acquire().await.unwrap();

        ledger.apply_delta(&mut conn, id, -3).await.unwrap();
        let err = ledger.apply_delta(&mut conn, id, -1).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            })
        ));

        // Increments are never guarded.
        ledger.apply_delta(&mut conn, id, 2).await.unwrap();
        drop(conn);
        assert_eq!(db.items().stock(id).await.unwrap(), 2);
    }
}
