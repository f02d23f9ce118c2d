//! # Application State
//!
//! The database handle and configuration shared by every action.
//!
//! The `Database` holds a `SqlitePool`, which is thread-safe, so actions can
//! run concurrently against one `AppState` without locking.
//!
//! ```rust,ignore
//! let state = AppState::connect(AppConfig::from_env()?).await?;
//! let resp = list_sales_action(&state, &Session::anonymous(), &form).await;
//! ```

use apotheca_db::{Database, DbResult};
use tracing::info;

use crate::config::AppConfig;
use crate::service::SaleService;

/// Shared state for actions and the CLI.
#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    config: AppConfig,
}

impl AppState {
    /// Opens the database described by `config` and runs migrations.
    pub async fn connect(config: AppConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(
            path = %config.db_path.display(),
            require_auth = config.require_auth,
            "Application state ready"
        );
        Ok(AppState { db, config })
    }

    /// Wraps an already open database.
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState { db, config }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Sale service over this state's database.
    pub fn sales(&self) -> SaleService {
        SaleService::new(self.db.clone())
    }
}
