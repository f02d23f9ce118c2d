//! # Form Actions
//!
//! Entry points taking raw form fields. Each action validates its input,
//! then runs the matching [`SaleService`](crate::service::SaleService)
//! operation inside [`with_auth`].
//!
//! ```text
//! FormData { id, date, saleItems, ... }
//!      │
//!      ├── invalid ──► ServiceResponse { success: false, message: null, errors }
//!      │
//!      ▼
//! with_auth(session, require_auth)
//!      │
//!      ├── anonymous ──► ServiceResponse { success: false, "Unauthorized" }
//!      │
//!      ▼
//! SaleService ──► ServiceResponse { success, message, data }
//! ```
//!
//! | Action                    | Fields read                              |
//! |---------------------------|------------------------------------------|
//! | `create_sale_action`      | `date`, `saleItems` (JSON array)         |
//! | `update_sale_action`      | `id`, `date`, `saleItems`                |
//! | `delete_sale_action`      | `id`                                     |
//! | `get_sale_action`         | `id`                                     |
//! | `list_sales_action`       | `page`, `limit`, `startDate`, `endDate`  |
//! | `revenue_by_month_action` | `year`                                   |

use std::collections::BTreeMap;

use apotheca_core::error::flatten_errors;
use apotheca_core::validation::{
    validate_list_filter, validate_sale_form, validate_sale_id, validate_year, ListFilter, SaleForm,
};
use apotheca_core::{FieldErrors, Page, RevenueEntry, Sale, ServiceResponse, ValidationError};
use serde::{Deserialize, Serialize};

use crate::auth::{with_auth, Session};
use crate::state::AppState;

/// Raw form submission: field name to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        FormData::default()
    }

    /// Adds a field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Field value, with blank values treated as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    fn sale_form(&self) -> SaleForm {
        SaleForm {
            date: self.get("date").map(str::to_string),
            sale_items: self.get("saleItems").map(str::to_string),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Write Actions
// =============================================================================

pub async fn create_sale_action(
    state: &AppState,
    session: &Session,
    form: &FormData,
) -> ServiceResponse<Sale> {
    let payload = match validate_sale_form(&form.sale_form()) {
        Ok(payload) => payload,
        Err(errors) => return ServiceResponse::invalid(errors),
    };

    let service = state.sales();
    with_auth(session, state.config().require_auth, async move {
        service.create_sale(&payload).await
    })
    .await
}

pub async fn update_sale_action(
    state: &AppState,
    session: &Session,
    form: &FormData,
) -> ServiceResponse<Sale> {
    let id = validate_sale_id(form.get("id"));
    let payload = validate_sale_form(&form.sale_form());

    let (id, payload) = match (id, payload) {
        (Ok(id), Ok(payload)) => (id, payload),
        (id, payload) => {
            let mut errors = payload.err().unwrap_or_default();
            if let Err(e) = id {
                merge(&mut errors, &[e]);
            }
            return ServiceResponse::invalid(errors);
        }
    };

    let service = state.sales();
    with_auth(session, state.config().require_auth, async move {
        service.update_sale(id, &payload).await
    })
    .await
}

pub async fn delete_sale_action(
    state: &AppState,
    session: &Session,
    form: &FormData,
) -> ServiceResponse<Sale> {
    let id = match validate_sale_id(form.get("id")) {
        Ok(id) => id,
        Err(e) => return ServiceResponse::invalid(flatten_errors(&[e])),
    };

    let service = state.sales();
    with_auth(session, state.config().require_auth, async move {
        service.delete_sale(id).await
    })
    .await
}

// =============================================================================
// Read Actions
// =============================================================================

pub async fn get_sale_action(
    state: &AppState,
    session: &Session,
    form: &FormData,
) -> ServiceResponse<Sale> {
    let id = match validate_sale_id(form.get("id")) {
        Ok(id) => id,
        Err(e) => return ServiceResponse::invalid(flatten_errors(&[e])),
    };

    let service = state.sales();
    with_auth(session, state.config().require_auth, async move {
        service.get_sale_by_id(id).await
    })
    .await
}

pub async fn list_sales_action(
    state: &AppState,
    session: &Session,
    form: &FormData,
) -> ServiceResponse<Page<Sale>> {
    let mut errors = Vec::new();
    let filter = ListFilter {
        page: integer_field(form, "page", &mut errors),
        limit: integer_field(form, "limit", &mut errors),
        start_date: form.get("startDate").map(str::to_string),
        end_date: form.get("endDate").map(str::to_string),
    };

    let query = match validate_list_filter(&filter) {
        Ok(query) if errors.is_empty() => query,
        Ok(_) => return ServiceResponse::invalid(flatten_errors(&errors)),
        Err(mut field_errors) => {
            merge(&mut field_errors, &errors);
            return ServiceResponse::invalid(field_errors);
        }
    };

    let service = state.sales();
    with_auth(session, state.config().require_auth, async move {
        service.get_sales(&query).await
    })
    .await
}

pub async fn revenue_by_month_action(
    state: &AppState,
    session: &Session,
    form: &FormData,
) -> ServiceResponse<Vec<RevenueEntry>> {
    let mut errors = Vec::new();
    let year = match integer_field(form, "year", &mut errors) {
        Some(year) => validate_year(year).map_err(|e| errors.push(e)).ok(),
        None if errors.is_empty() => {
            errors.push(ValidationError::Required {
                field: "year".to_string(),
            });
            None
        }
        None => None,
    };

    let Some(year) = year else {
        return ServiceResponse::invalid(flatten_errors(&errors));
    };

    let service = state.sales();
    with_auth(session, state.config().require_auth, async move {
        service.revenue_by_month(year).await
    })
    .await
}

/// Parses an optional integer field, recording a format error on failure.
fn integer_field(form: &FormData, name: &str, errors: &mut Vec<ValidationError>) -> Option<i64> {
    let raw = form.get(name)?.trim();
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(ValidationError::InvalidFormat {
                field: name.to_string(),
                reason: format!("'{raw}' is not an integer"),
            });
            None
        }
    }
}

fn merge(into: &mut FieldErrors, errors: &[ValidationError]) {
    for (field, messages) in flatten_errors(errors) {
        into.entry(field).or_default().extend(messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use apotheca_core::{Money, NewItem};
    use apotheca_db::{Database, DbConfig};

    async fn setup(require_auth: bool) -> (AppState, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db
            .items()
            .insert(&NewItem {
                name: "Vitamin C 1000mg x30".to_string(),
                price: Money::parse("10.00").unwrap(),
                stock_quantity: 10,
            })
            .await
            .unwrap();
        let config = AppConfig {
            require_auth,
            ..AppConfig::default()
        };
        (AppState::new(db, config), item.id)
    }

    fn sale_form(item_id: i64, qty: i64) -> FormData {
        FormData::new()
            .with("date", "2025-01-15T00:00:00.000Z")
            .with(
                "saleItems",
                format!(r#"[{{"name":"Vitamin C","itemId":{item_id},"quantity":{qty},"price":"10.00"}}]"#),
            )
    }

    async fn stock(state: &AppState, item_id: i64) -> i64 {
        state.db().items().stock(item_id).await.unwrap()
    }

    #[tokio::test]
    async fn test_sale_lifecycle_restores_stock() {
        let (state, item_id) = setup(false).await;
        let session = Session::anonymous();

        let created = create_sale_action(&state, &session, &sale_form(item_id, 2)).await;
        assert!(created.success);
        let sale = created.data.unwrap();
        assert_eq!(sale.total.to_string(), "20.00");
        assert_eq!(stock(&state, item_id).await, 8);

        let form = sale_form(item_id, 1).with("id", sale.id.to_string());
        let updated = update_sale_action(&state, &session, &form).await;
        assert!(updated.success);
        assert_eq!(updated.data.unwrap().total.to_string(), "10.00");
        assert_eq!(stock(&state, item_id).await, 9);

        let fetched = get_sale_action(&state, &session, &FormData::new().with("id", sale.id.to_string())).await;
        assert_eq!(fetched.message.as_deref(), Some("Sale fetched successfully"));

        let deleted =
            delete_sale_action(&state, &session, &FormData::new().with("id", sale.id.to_string())).await;
        assert!(deleted.success);
        assert_eq!(stock(&state, item_id).await, 10);
    }

    #[tokio::test]
    async fn test_invalid_form_returns_field_errors() {
        let (state, item_id) = setup(false).await;

        let form = FormData::new()
            .with("date", "yesterday")
            .with("saleItems", format!(r#"[{{"itemId":{item_id},"quantity":0,"price":"1"}}]"#));
        let resp = create_sale_action(&state, &Session::anonymous(), &form).await;

        assert!(!resp.success);
        assert!(resp.message.is_none());
        let errors = resp.errors.unwrap();
        assert!(errors.contains_key("date"));
        assert!(errors.contains_key("saleItems"));
        assert_eq!(stock(&state, item_id).await, 10);

        let json = serde_json::to_value(
            create_sale_action(&state, &Session::anonymous(), &FormData::new()).await,
        )
        .unwrap();
        assert!(json["message"].is_null());
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_oversized_price_is_a_field_error() {
        let (state, item_id) = setup(false).await;

        let form = FormData::new().with("date", "2025-01-15T00:00:00.000Z").with(
            "saleItems",
            format!(r#"[{{"itemId":{item_id},"quantity":2,"price":"79228162514264337593543950335"}}]"#),
        );
        let resp = create_sale_action(&state, &Session::anonymous(), &form).await;

        assert!(!resp.success);
        assert!(resp.errors.unwrap().contains_key("saleItems"));
        assert_eq!(stock(&state, item_id).await, 10);
        assert_eq!(state.db().sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_reports_id_and_payload_errors_together() {
        let (state, _) = setup(false).await;

        let form = FormData::new().with("id", "abc").with("date", "2025-01-15T00:00:00Z");
        let errors = update_sale_action(&state, &Session::anonymous(), &form)
            .await
            .errors
            .unwrap();
        assert!(errors.contains_key("id"));
        assert!(errors.contains_key("saleItems"));
    }

    #[tokio::test]
    async fn test_auth_required_blocks_writes() {
        let (state, item_id) = setup(true).await;

        let resp = create_sale_action(&state, &Session::anonymous(), &sale_form(item_id, 1)).await;
        assert_eq!(resp.message.as_deref(), Some("Unauthorized"));
        assert_eq!(stock(&state, item_id).await, 10);

        let resp = create_sale_action(&state, &Session::user("till-2"), &sale_form(item_id, 1)).await;
        assert!(resp.success);
    }

    #[tokio::test]
    async fn test_list_sales_action() {
        let (state, item_id) = setup(false).await;
        let session = Session::anonymous();
        for _ in 0..3 {
            create_sale_action(&state, &session, &sale_form(item_id, 1)).await;
        }

        let form = FormData::new()
            .with("page", "2")
            .with("limit", "2")
            .with("startDate", "2025-01-15")
            .with("endDate", "2025-01-15");
        let page = list_sales_action(&state, &session, &form).await.data.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.result.len(), 1);

        let form = FormData::new().with("startDate", "2025-02-01").with("endDate", "2025-02-28");
        let page = list_sales_action(&state, &session, &form).await.data.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);

        let resp = list_sales_action(&state, &session, &FormData::new().with("page", "two")).await;
        assert!(resp.errors.unwrap().contains_key("page"));
    }

    #[tokio::test]
    async fn test_revenue_action() {
        let (state, item_id) = setup(false).await;
        let session = Session::anonymous();
        create_sale_action(&state, &session, &sale_form(item_id, 2)).await;

        let resp = revenue_by_month_action(&state, &session, &FormData::new().with("year", "2025")).await;
        let report = resp.data.unwrap();
        assert_eq!(report.len(), 12);
        assert_eq!(report[0].total, "20.00");

        for year in ["", "0", "MMXXV"] {
            let resp = revenue_by_month_action(&state, &session, &FormData::new().with("year", year)).await;
            assert!(resp.errors.unwrap().contains_key("year"));
        }
    }

    #[tokio::test]
    async fn test_delete_missing_sale() {
        let (state, _) = setup(false).await;

        let resp = delete_sale_action(&state, &Session::anonymous(), &FormData::new().with("id", "77")).await;
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("Sale not found"));
    }
}
