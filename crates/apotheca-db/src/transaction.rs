//! # Transaction Boundary
//!
//! Every sale write runs as one unit of work inside a single SQLite
//! transaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  with_transaction(pool, work)                                          │
//! │       │                                                                 │
//! │       ├── BEGIN IMMEDIATE                                               │
//! │       ├── work(&mut tx) ──► stock deltas, sale rows, sale_items rows   │
//! │       │                                                                 │
//! │       ├── Ok(value)  ──► COMMIT   ──► Ok(value)                        │
//! │       └── Err(err)   ──► ROLLBACK ──► Err(err)                         │
//! │                                                                         │
//! │  Nothing the unit of work wrote survives a failure.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let id = with_transaction(&pool, move |tx| {
//!     Box::pin(async move {
//!         ledger.apply_delta(&mut **tx, item_id, -2).await?;
//!         insert_sale(&mut **tx, &payload).await
//!     })
//! })
//! .await?;
//! ```
//!
//! The unit of work must own what it touches (clone payloads into the
//! closure); only the transaction itself is borrowed.
//!
//! The write lock is taken at `BEGIN`, so a unit of work that reads before
//! it writes waits behind another writer instead of failing with
//! `SQLITE_BUSY` on its first write.

use std::future::Future;
use std::pin::Pin;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Future returned by a unit of work, borrowing the transaction for `'t`.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = DbResult<T>> + Send + 't>>;

/// Statement opening every write transaction.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Runs `work` inside a transaction: commits on `Ok`, rolls back on `Err`.
pub async fn with_transaction<T, F>(pool: &SqlitePool, work: F) -> DbResult<T>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut Transaction<'static, Sqlite>) -> TxFuture<'t, T> + Send,
{
    let mut tx = pool
        .begin_with(BEGIN_WRITE)
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                // Dropping the transaction still rolls it back.
                warn!(error = %rollback_err, "Explicit rollback failed");
            }
            debug!(error = %err, "Transaction rolled back");
            Err(err)
        }
    }
}
