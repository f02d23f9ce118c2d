//! # Authentication Wrapper
//!
//! Actions run inside [`with_auth`], which refuses to start the action when
//! a session is required and the caller has none. The sale service itself
//! never checks sessions.

use std::future::Future;

use apotheca_core::ServiceResponse;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ActionError;

/// Caller identity attached to an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { user_id: None }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Session {
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Runs `action` unless auth is required and `session` is anonymous.
///
/// The action future is dropped unpolled on rejection, so nothing it would
/// have written is touched.
pub async fn with_auth<T, F>(session: &Session, require_auth: bool, action: F) -> ServiceResponse<T>
where
    F: Future<Output = ServiceResponse<T>>,
{
    if require_auth && !session.is_authenticated() {
        warn!("Rejected unauthenticated action");
        return ActionError::Unauthorized.into_response();
    }
    action.await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_anonymous_when_required() {
        let resp: ServiceResponse<u8> =
            with_auth(&Session::anonymous(), true, async { ServiceResponse::ok("ran", 1) }).await;

        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("Unauthorized"));
        assert!(resp.data.is_none());
    }

    #[tokio::test]
    async fn test_runs_for_user_or_when_optional() {
        let resp = with_auth(&Session::user("pharmacist-1"), true, async {
            ServiceResponse::ok("ran", 1)
        })
        .await;
        assert!(resp.success);

        let resp = with_auth(&Session::anonymous(), false, async { ServiceResponse::ok("ran", 2) }).await;
        assert_eq!(resp.data, Some(2));
    }

    #[test]
    fn test_empty_user_id_is_anonymous() {
        assert!(!Session::user("").is_authenticated());
    }
}
