//! # Action Error Type
//!
//! What a failed operation reports in its envelope. The envelope carries
//! only a message, so the error is its message.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository                      Service boundary                       │
//! │  ──────────                      ────────────────                       │
//! │                                                                         │
//! │  DbError::NotFound ─────────────► NotFound      "Sale not found"        │
//! │  DbError::ForeignKeyViolation ──► UnknownItem   "Sale references ..."   │
//! │  DbError::Domain(CoreError) ────► Rejected      the domain message      │
//! │  anything else ─────────────────► Store         operation default       │
//! │                                   (details logged, never shown)         │
//! │                                                                         │
//! │  ActionError ──► ServiceResponse { success: false, message }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use apotheca_core::{CoreError, ServiceResponse};
use apotheca_db::DbError;
use thiserror::Error;

/// A failure as the caller sees it. `Display` is the envelope message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Sale id does not exist
    #[error("Sale not found")]
    NotFound,

    /// No authenticated session
    #[error("Unauthorized")]
    Unauthorized,

    /// A line names an item the store doesn't have
    #[error("Sale references an item that does not exist")]
    UnknownItem,

    /// A domain rule refused the write (stock, validation, amount range)
    #[error("{0}")]
    Rejected(String),

    /// Store failure; carries the operation's default message
    #[error("{0}")]
    Store(String),
}

impl ActionError {
    /// Maps a store error, replacing hidden failures with `fallback`.
    ///
    /// `fallback` is the operation's own message, e.g. "Error creating sale".
    pub fn from_db(err: DbError, fallback: &str) -> Self {
        match err {
            DbError::NotFound { .. } => ActionError::NotFound,
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ActionError::UnknownItem
            }
            DbError::Domain(core) => ActionError::from_core(core),
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ActionError::Store(fallback.to_string())
            }
            other => {
                // Log the actual error but return the operation's message
                tracing::error!(error = %other, "{}", fallback);
                ActionError::Store(fallback.to_string())
            }
        }
    }

    /// Maps a domain error.
    pub fn from_core(err: CoreError) -> Self {
        if matches!(err, CoreError::AmountOverflow) {
            tracing::warn!("Sale amount overflow");
        }
        ActionError::Rejected(err.to_string())
    }

    /// The failure envelope for this error.
    pub fn into_response<T>(self) -> ServiceResponse<T> {
        ServiceResponse::fail(self.to_string())
    }
}
