//! API response types
//!
//! Every JSON body carries `success`. Successful bodies may add `message`,
//! `count` (lists) and `data`; failures carry `code` and `message`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
        }
    }

    /// Create a success response with a human-readable message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Create a list response; `count` is the number of items
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::success(items)
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response that only carries a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Pair the body with a status code
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_response_counts_items() {
        let value = serde_json::to_value(ApiResponse::list(vec!["a", "b"])).unwrap();
        assert_eq!(value, json!({ "success": true, "count": 2, "data": ["a", "b"] }));
    }

    #[test]
    fn test_message_only_response_omits_data() {
        let value = serde_json::to_value(ApiResponse::message("File deleted successfully")).unwrap();
        assert_eq!(value, json!({ "success": true, "message": "File deleted successfully" }));
    }

    #[test]
    fn test_error_response_shape() {
        let value = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "File not found")).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "code": "NOT_FOUND", "message": "File not found" })
        );
    }
}
