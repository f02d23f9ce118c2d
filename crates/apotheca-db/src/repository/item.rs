//! # Item Repository
//!
//! Database operations for stocked items.
//!
//! Items are an external aggregate to the sale ledger: this repository only
//! registers them and reads them back. Stock changes caused by sales go
//! through [`super::stock::StockLedger`] inside the sale's transaction.

use apotheca_core::{Item, NewItem};
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use super::{format_timestamp, parse_money, parse_timestamp};
use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    price: String,
    stock_quantity: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        Ok(Item {
            id: row.id,
            name: row.name,
            price: parse_money("items.price", &row.price)?,
            stock_quantity: row.stock_quantity,
            created_at: parse_timestamp("items.created_at", &row.created_at)?,
            updated_at: parse_timestamp("items.updated_at", &row.updated_at)?,
        })
    }
}

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
///
/// let item = repo.insert(&new_item).await?;
/// let on_hand = repo.stock(item.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Inserts a new item and returns it with its generated id.
    pub async fn insert(&self, item: &NewItem) -> DbResult<Item> {
        debug!(name = %item.name, "Inserting item");

        let now = format_timestamp(Utc::now());
        let row: ItemRow = sqlx::query_as(
            r#"
            INSERT INTO items (name, price, stock_quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, name, price, stock_quantity, created_at, updated_at
            "#,
        )
        .bind(&item.name)
        .bind(item.price.to_storage_string())
        .bind(item.stock_quantity)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, price, stock_quantity, created_at, updated_at
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    /// Lists items ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, price, stock_quantity, created_at, updated_at
            FROM items
            ORDER BY name, id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    /// Current stock of an item.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the item doesn't exist.
    pub async fn stock(&self, id: i64) -> DbResult<i64> {
        sqlx::query_scalar("SELECT stock_quantity FROM items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Counts items (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
