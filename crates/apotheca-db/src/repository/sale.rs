//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Stock-Reconciling Writes (one transaction each)         │
//! │                                                                         │
//! │  create(payload)                                                       │
//! │     ├── for each line: stock -= quantity                               │
//! │     ├── INSERT sales (date, total = Σ price × qty)                     │
//! │     └── INSERT sale_items                                              │
//! │                                                                         │
//! │  update(id, payload)                                                   │
//! │     ├── sale exists? else NotFound (nothing touched yet)               │
//! │     ├── for each old line: stock += quantity                           │
//! │     ├── DELETE old sale_items                                          │
//! │     ├── for each new line: stock -= quantity                           │
//! │     └── UPDATE sales (date, total) + INSERT new sale_items             │
//! │                                                                         │
//! │  delete(id)                                                            │
//! │     ├── load sale (NotFound if absent)                                 │
//! │     ├── for each line: stock += quantity                               │
//! │     └── DELETE sales (sale_items cascade)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure inside a write rolls back every stock change and row change
//! made by that write.

use std::collections::HashMap;

use apotheca_core::{ItemRef, Page, Sale, SaleItem, SaleLine, SalePayload, SaleQuery};
use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::stock::StockLedger;
use super::{format_timestamp, parse_money, parse_timestamp};
use crate::error::{DbError, DbResult};
use crate::transaction::with_transaction;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct SaleRow {
    id: i64,
    date: String,
    total: String,
    created_at: String,
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: i64,
    sale_id: i64,
    item_id: i64,
    quantity: i64,
    price: String,
    item_name: Option<String>,
}

impl TryFrom<SaleItemRow> for SaleItem {
    type Error = DbError;

    fn try_from(row: SaleItemRow) -> DbResult<Self> {
        Ok(SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            item_id: row.item_id,
            quantity: row.quantity,
            price: parse_money("sale_items.price", &row.price)?,
            item: row.item_name.map(|name| ItemRef {
                id: row.item_id,
                name,
            }),
        })
    }
}

fn assemble(row: SaleRow, sale_items: Vec<SaleItem>) -> DbResult<Sale> {
    Ok(Sale {
        id: row.id,
        date: parse_timestamp("sales.date", &row.date)?,
        total: parse_money("sales.total", &row.total)?,
        created_at: parse_timestamp("sales.created_at", &row.created_at)?,
        sale_items,
    })
}

const SELECT_SALE_ITEMS: &str = r#"
    SELECT si.id, si.sale_id, si.item_id, si.quantity, si.price, i.name AS item_name
    FROM sale_items si
    LEFT JOIN items i ON i.id = si.item_id
"#;

// =============================================================================
// Connection-Level Helpers
// =============================================================================
// These take a bare connection so they can run inside a transaction
// (`&mut **tx`) or on a pooled connection alike.

/// Loads one sale with its line items and item names.
async fn fetch_sale(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Sale>> {
    let row: Option<SaleRow> =
        sqlx::query_as("SELECT id, date, total, created_at FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items: Vec<SaleItemRow> =
        sqlx::query_as(&format!("{SELECT_SALE_ITEMS} WHERE si.sale_id = ?1 ORDER BY si.id"))
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

    let items = items
        .into_iter()
        .map(SaleItem::try_from)
        .collect::<DbResult<Vec<_>>>()?;

    assemble(row, items).map(Some)
}

/// Inserts the line items of a sale.
async fn insert_lines(conn: &mut SqliteConnection, sale_id: i64, lines: &[SaleLine]) -> DbResult<()> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO sale_items (sale_id, item_id, quantity, price)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(sale_id)
        .bind(line.item_id)
        .bind(line.quantity)
        .bind(line.price.to_storage_string())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Loads `(item_id, quantity)` of every current line of a sale.
async fn current_lines(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Vec<(i64, i64)>> {
    let lines: Vec<(i64, i64)> =
        sqlx::query_as("SELECT item_id, quantity FROM sale_items WHERE sale_id = ?1 ORDER BY id")
            .bind(sale_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(lines)
}

// =============================================================================
// Sale Repository
// =============================================================================

/// Repository for sale database operations.
///
/// ## Usage
/// ```rust,ignore
/// let sales = db.sales();
///
/// let sale = sales.create(&payload).await?;
/// let page = sales.list(&SaleQuery::default()).await?;
/// let removed = sales.delete(sale.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    ledger: StockLedger,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, ledger: StockLedger) -> Self {
        SaleRepository { pool, ledger }
    }

    /// Records a sale and consumes stock for every line.
    ///
    /// ## Errors
    /// - `DbError::ForeignKeyViolation` - a line references a missing item
    /// - `DbError::Domain(InsufficientStock)` - rejected by the stock policy
    /// - `DbError::Domain(AmountOverflow)` - the total does not fit a `Decimal`
    pub async fn create(&self, payload: &SalePayload) -> DbResult<Sale> {
        let payload = payload.clone();
        let ledger = self.ledger;
        let total = payload.total()?;

        debug!(lines = payload.items.len(), total = %total, "Creating sale");

        let sale = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                for line in &payload.items {
                    ledger.apply_delta(&mut **tx, line.item_id, -line.quantity).await?;
                }

                let id: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO sales (date, total, created_at)
                    VALUES (?1, ?2, ?3)
                    RETURNING id
                    "#,
                )
                .bind(format_timestamp(payload.date))
                .bind(total.to_storage_string())
                .bind(format_timestamp(Utc::now()))
                .fetch_one(&mut **tx)
                .await?;

                insert_lines(&mut **tx, id, &payload.items).await?;

                fetch_sale(&mut **tx, id)
                    .await?
                    .ok_or_else(|| DbError::Internal(format!("Sale {id} vanished after insert")))
            })
        })
        .await?;

        info!(id = %sale.id, total = %sale.total, "Sale created");
        Ok(sale)
    }

    /// Replaces a sale's date and lines, reconciling stock in between.
    ///
    /// ## Errors
    /// - `DbError::NotFound` - no sale with this id (nothing is modified)
    /// - same as [`SaleRepository::create`] for the new lines
    pub async fn update(&self, id: i64, payload: &SalePayload) -> DbResult<Sale> {
        let payload = payload.clone();
        let ledger = self.ledger;
        let total = payload.total()?;

        debug!(id = %id, lines = payload.items.len(), total = %total, "Updating sale");

        let sale = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM sales WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut **tx)
                    .await?;
                if exists.is_none() {
                    return Err(DbError::not_found("Sale", id));
                }

                for (item_id, quantity) in current_lines(&mut **tx, id).await? {
                    ledger.apply_delta(&mut **tx, item_id, quantity).await?;
                }

                sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;

                for line in &payload.items {
                    ledger.apply_delta(&mut **tx, line.item_id, -line.quantity).await?;
                }

                sqlx::query("UPDATE sales SET date = ?1, total = ?2 WHERE id = ?3")
                    .bind(format_timestamp(payload.date))
                    .bind(total.to_storage_string())
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;

                insert_lines(&mut **tx, id, &payload.items).await?;

                fetch_sale(&mut **tx, id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Sale", id))
            })
        })
        .await?;

        info!(id = %sale.id, total = %sale.total, "Sale updated");
        Ok(sale)
    }

    /// Deletes a sale and restores the stock its lines consumed.
    ///
    /// ## Returns
    /// The sale as it was just before deletion.
    pub async fn delete(&self, id: i64) -> DbResult<Sale> {
        let ledger = self.ledger;

        debug!(id = %id, "Deleting sale");

        let sale = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let sale = fetch_sale(&mut **tx, id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Sale", id))?;

                for line in &sale.sale_items {
                    ledger.apply_delta(&mut **tx, line.item_id, line.quantity).await?;
                }

                sqlx::query("DELETE FROM sales WHERE id = ?1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;

                Ok::<_, DbError>(sale)
            })
        })
        .await?;

        info!(id = %sale.id, "Sale deleted");
        Ok(sale)
    }

    /// Gets a sale by ID, with its line items and item names.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the sale doesn't exist.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Lists sales newest first, optionally restricted to a range of days.
    ///
    /// ## Filtering
    /// The range applies to the sale `date`; both ends are inclusive to the
    /// millisecond. Ordering is by creation time, ties broken by id.
    pub async fn list(&self, query: &SaleQuery) -> DbResult<Page<Sale>> {
        let pagination = query.pagination;
        let (start, end) = match query.range {
            Some(range) => (
                Some(format_timestamp(range.start_instant())),
                Some(format_timestamp(range.end_instant())),
            ),
            None => (None, None),
        };

        debug!(
            page = pagination.page(),
            limit = pagination.limit(),
            start = ?start,
            end = ?end,
            "Listing sales"
        );

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE (?1 IS NULL OR date >= ?1)
              AND (?2 IS NULL OR date <= ?2)
            "#,
        )
        .bind(&start)
        .bind(&end)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, date, total, created_at FROM sales
            WHERE (?1 IS NULL OR date >= ?1)
              AND (?2 IS NULL OR date <= ?2)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(&start)
        .bind(&end)
        .bind(i64::from(pagination.limit()))
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale = self.load_items(rows.iter().map(|r| r.id)).await?;

        let result = rows
            .into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.id).unwrap_or_default();
                assemble(row, items)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = result.len(), total = total, "Sales listed");
        Ok(Page::new(result, total, pagination))
    }

    /// Loads the line items of several sales in one query.
    async fn load_items(
        &self,
        sale_ids: impl Iterator<Item = i64>,
    ) -> DbResult<HashMap<i64, Vec<SaleItem>>> {
        let sale_ids: Vec<i64> = sale_ids.collect();
        let mut grouped: HashMap<i64, Vec<SaleItem>> = HashMap::new();
        if sale_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_SALE_ITEMS);
        builder.push(" WHERE si.sale_id IN (");
        let mut separated = builder.separated(", ");
        for id in &sale_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY si.sale_id, si.id");

        let rows: Vec<SaleItemRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        for row in rows {
            let item = SaleItem::try_from(row)?;
            grouped.entry(item.sale_id).or_default().push(item);
        }
        Ok(grouped)
    }

    /// Counts all sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
