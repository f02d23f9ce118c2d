//! # Sale Service
//!
//! The boundary between typed repository calls and the result envelope.
//! Every operation catches its errors here and answers with a
//! [`ServiceResponse`]; nothing escapes as a raw error.
//!
//! | Operation          | Success message                 | Failure default          |
//! |--------------------|---------------------------------|--------------------------|
//! | `get_sales`        | Sales fetched successfully      | Error fetching sales     |
//! | `create_sale`      | Sale created successfully       | Error creating sale      |
//! | `get_sale_by_id`   | Sale fetched successfully       | Error fetching sale      |
//! | `update_sale`      | Sale updated successfully       | Error updating sale      |
//! | `delete_sale`      | Sale deleted successfully       | Error deleting sale      |
//! | `revenue_by_month` | Revenue fetched successfully    | Error fetching revenue   |

use apotheca_core::{Page, RevenueEntry, Sale, SalePayload, SaleQuery, ServiceResponse};
use apotheca_db::{Database, DbResult};
use tracing::debug;

use crate::error::ActionError;

/// Sale operations over one database.
#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
}

impl SaleService {
    pub fn new(db: Database) -> Self {
        SaleService { db }
    }

    /// Paged listing, newest first, optionally limited to a date range.
    pub async fn get_sales(&self, query: &SaleQuery) -> ServiceResponse<Page<Sale>> {
        debug!(page = query.pagination.page(), limit = query.pagination.limit(), "get_sales");
        respond(
            self.db.sales().list(query).await,
            "Sales fetched successfully",
            "Error fetching sales",
        )
    }

    pub async fn create_sale(&self, payload: &SalePayload) -> ServiceResponse<Sale> {
        respond(
            self.db.sales().create(payload).await,
            "Sale created successfully",
            "Error creating sale",
        )
    }

    pub async fn get_sale_by_id(&self, id: i64) -> ServiceResponse<Sale> {
        respond(
            self.db.sales().get_by_id(id).await,
            "Sale fetched successfully",
            "Error fetching sale",
        )
    }

    /// Replaces the date and lines of sale `id`, reconciling stock.
    pub async fn update_sale(&self, id: i64, payload: &SalePayload) -> ServiceResponse<Sale> {
        debug!(sale_id = id, lines = payload.items.len(), "update_sale");
        respond(
            self.db.sales().update(id, payload).await,
            "Sale updated successfully",
            "Error updating sale",
        )
    }

    /// Deletes sale `id`, restoring stock. The data is the deleted sale.
    pub async fn delete_sale(&self, id: i64) -> ServiceResponse<Sale> {
        respond(
            self.db.sales().delete(id).await,
            "Sale deleted successfully",
            "Error deleting sale",
        )
    }

    /// Twelve monthly totals for `year`.
    pub async fn revenue_by_month(&self, year: i32) -> ServiceResponse<Vec<RevenueEntry>> {
        respond(
            self.db.revenue().revenue_by_year(year).await,
            "Revenue fetched successfully",
            "Error fetching revenue",
        )
    }
}

fn respond<T>(result: DbResult<T>, success: &str, fallback: &str) -> ServiceResponse<T> {
    match result {
        Ok(data) => ServiceResponse::ok(success, data),
        Err(err) => ActionError::from_db(err, fallback).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_core::{Money, NewItem, Pagination, SaleLine};
    use apotheca_db::{DbConfig, StockPolicy};
    use chrono::{TimeZone, Utc};

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    async fn setup(policy: StockPolicy) -> (SaleService, Database, i64) {
        let db = Database::new(DbConfig::in_memory().stock_policy(policy))
            .await
            .unwrap();
        let item = db
            .items()
            .insert(&NewItem {
                name: "Paracetamol 500mg x20".to_string(),
                price: money("10.00"),
                stock_quantity: 10,
            })
            .await
            .unwrap();
        (SaleService::new(db.clone()), db, item.id)
    }

    fn payload(item_id: i64, qty: i64) -> SalePayload {
        SalePayload::new(
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
            vec![SaleLine::new(item_id, qty, money("10.00"))],
        )
    }

    #[tokio::test]
    async fn test_create_update_delete_envelopes() {
        let (service, db, item_id) = setup(StockPolicy::AllowNegative).await;

        let created = service.create_sale(&payload(item_id, 2)).await;
        assert!(created.success);
        assert_eq!(created.message.as_deref(), Some("Sale created successfully"));
        let sale = created.data.unwrap();
        assert_eq!(sale.total.to_string(), "20.00");
        assert_eq!(db.items().stock(item_id).await.unwrap(), 8);

        let updated = service.update_sale(sale.id, &payload(item_id, 1)).await;
        assert_eq!(updated.message.as_deref(), Some("Sale updated successfully"));
        assert_eq!(db.items().stock(item_id).await.unwrap(), 9);

        let deleted = service.delete_sale(sale.id).await;
        assert_eq!(deleted.message.as_deref(), Some("Sale deleted successfully"));
        assert_eq!(deleted.data.unwrap().id, sale.id);
        assert_eq!(db.items().stock(item_id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_missing_sale_is_not_found() {
        let (service, _db, item_id) = setup(StockPolicy::AllowNegative).await;

        for resp in [
            service.get_sale_by_id(404).await,
            service.update_sale(404, &payload(item_id, 1)).await,
            service.delete_sale(404).await,
        ] {
            assert!(!resp.success);
            assert_eq!(resp.message.as_deref(), Some("Sale not found"));
            assert!(resp.data.is_none());
        }
    }

    #[tokio::test]
    async fn test_unknown_item_fails_without_side_effects() {
        let (service, db, item_id) = setup(StockPolicy::AllowNegative).await;

        let mut bad = payload(item_id, 1);
        bad.items.push(SaleLine::new(9999, 1, money("1")));

        let resp = service.create_sale(&bad).await;
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(db.items().stock(item_id).await.unwrap(), 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reject_negative_reports_stock_message() {
        let (service, _db, item_id) = setup(StockPolicy::RejectNegative).await;

        let resp = service.create_sale(&payload(item_id, 11)).await;
        assert!(!resp.success);
        assert!(resp.message.unwrap().starts_with("Insufficient stock"));
    }

    #[tokio::test]
    async fn test_listing_and_revenue() {
        let (service, _db, item_id) = setup(StockPolicy::AllowNegative).await;
        service.create_sale(&payload(item_id, 3)).await;

        let page = service
            .get_sales(&SaleQuery::new(Pagination::new(1, 10), None))
            .await;
        assert_eq!(page.message.as_deref(), Some("Sales fetched successfully"));
        let page = page.data.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);

        let revenue = service.revenue_by_month(2025).await.data.unwrap();
        assert_eq!(revenue[0].total, "30.00");
        assert_eq!(revenue[1].total, "0");
    }

    #[tokio::test]
    async fn test_amount_overflow_is_a_failure_envelope() {
        let (service, db, item_id) = setup(StockPolicy::AllowNegative).await;

        let too_big = SalePayload::new(
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
            vec![SaleLine::new(item_id, 2, money("79228162514264337593543950335"))],
        );
        let resp = service.create_sale(&too_big).await;
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("Amount is too large"));
        assert_eq!(db.items().stock(item_id).await.unwrap(), 10);

        let half = SalePayload::new(
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
            vec![SaleLine::new(item_id, 1, money("50000000000000000000000000000"))],
        );
        assert!(service.create_sale(&half).await.success);
        assert!(service.create_sale(&half).await.success);

        let revenue = service.revenue_by_month(2025).await;
        assert!(!revenue.success);
        assert!(revenue.data.is_none());
        assert_eq!(revenue.message.as_deref(), Some("Amount is too large"));
    }

    #[tokio::test]
    async fn test_store_failure_uses_operation_message() {
        let (service, db, item_id) = setup(StockPolicy::AllowNegative).await;
        db.close().await;

        let resp = service.create_sale(&payload(item_id, 1)).await;
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("Error creating sale"));
    }
}
