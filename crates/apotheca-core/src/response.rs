//! # Result Envelope
//!
//! Every action answers with the same shape, whether it succeeded or not.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  success  │ message                       │ data   │ errors            │
//! │  ─────────┼───────────────────────────────┼────────┼────────────────── │
//! │  true     │ "Sale created successfully"   │ Sale   │ (absent)          │
//! │  false    │ "Sale not found"              │ null   │ (absent)          │
//! │  false    │ null                          │ null   │ { "date": [...] } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::FieldErrors;

/// Uniform `{ success, message, data, errors? }` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[ts(optional, type = "Record<string, Array<string>>")]
    pub errors: Option<FieldErrors>,
}

impl<T> ServiceResponse<T> {
    /// Successful result carrying data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ServiceResponse {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            errors: None,
        }
    }

    /// Failed result with a human-readable message and no data.
    pub fn fail(message: impl Into<String>) -> Self {
        ServiceResponse {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    /// Failed result carrying per-field validation messages and no message.
    pub fn invalid(errors: FieldErrors) -> Self {
        ServiceResponse {
            success: false,
            message: None,
            data: None,
            errors: Some(errors),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Converts the payload while keeping the outcome and message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        ServiceResponse {
            success: self.success,
            message: self.message,
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let resp = ServiceResponse::ok("Sales fetched successfully", 3);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Sales fetched successfully");
        assert_eq!(json["data"], 3);
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_fail_envelope_has_null_data() {
        let resp: ServiceResponse<u8> = ServiceResponse::fail("Sale not found");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_invalid_envelope_carries_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("date".to_string(), vec!["date is required".to_string()]);

        let resp: ServiceResponse<u8> = ServiceResponse::invalid(errors);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["message"].is_null());
        assert_eq!(json["errors"]["date"][0], "date is required");
    }
}
