//! # apotheca-actions: Service Boundary for Apotheca
//!
//! Turns raw form input into sale ledger operations and every outcome into a
//! `ServiceResponse` envelope. Also hosts the `apotheca` command line tool.
//!
//! ## Module Organization
//! ```text
//! apotheca_actions/
//! ├── lib.rs      ◄─── You are here (logging setup, exports)
//! ├── config.rs   ◄─── Environment configuration
//! ├── state.rs    ◄─── Database handle + config shared by actions
//! ├── auth.rs     ◄─── Session and the with_auth wrapper
//! ├── service.rs  ◄─── SaleService: repository calls → envelopes
//! ├── actions.rs  ◄─── Form actions: validate → with_auth → service
//! ├── error.rs    ◄─── ActionError: what a failure reports
//! └── main.rs     ◄─── `apotheca` CLI
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let state = AppState::connect(AppConfig::from_env()?).await?;
//! let form = FormData::new()
//!     .with("date", "2025-01-15T00:00:00.000Z")
//!     .with("saleItems", r#"[{"itemId":1,"quantity":2,"price":"10.00"}]"#);
//!
//! let resp = create_sale_action(&state, &Session::anonymous(), &form).await;
//! assert!(resp.success);
//! ```

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod state;

pub use actions::{
    create_sale_action, delete_sale_action, get_sale_action, list_sales_action,
    revenue_by_month_action, update_sale_action, FormData,
};
pub use auth::{with_auth, Session};
pub use config::{AppConfig, ConfigError};
pub use error::ActionError;
pub use service::SaleService;
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor `APOTHECA_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,apotheca=debug,sqlx=warn";

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over `fallback` (usually `AppConfig::log_filter`), which
/// wins over [`DEFAULT_LOG_FILTER`]. Logs go to stderr so stdout stays
/// clean for JSON output. Calling it twice is harmless.
pub fn init_tracing(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or(DEFAULT_LOG_FILTER)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
