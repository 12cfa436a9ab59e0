use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// JSON object response whose top-level keys name what they carry, e.g.
/// `{"products": [...], "metadata": {...}}`.
#[derive(Debug)]
pub struct ApiResponse {
    pub body: Map<String, Value>,
    pub status_code: StatusCode,
}

impl ApiResponse {
    /// 200 response with `data` under `key`
    pub fn envelope(key: &str, data: impl Serialize) -> Self {
        Self {
            body: Map::new(),
            status_code: StatusCode::OK,
        }
        .with(key, data)
    }

    /// 201 response with `data` under `key`
    pub fn created(key: &str, data: impl Serialize) -> Self {
        Self::envelope(key, data).status(StatusCode::CREATED)
    }

    /// `{"message": ...}` with 200
    pub fn message(message: &str) -> Self {
        Self::envelope("message", message)
    }

    /// Add another top-level key.
    pub fn with(mut self, key: &str, data: impl Serialize) -> Self {
        let value = serde_json::to_value(data).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response data for {}: {}", key, e);
            Value::Null
        });
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if self.body.values().any(Value::is_null) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": true,
                    "message": "Failed to serialize response data",
                    "code": "INTERNAL_SERVER_ERROR"
                })),
            )
                .into_response();
        }
        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_each_key() {
        let response = ApiResponse::envelope("products", vec![1, 2]).with("metadata", json!({"currentPage": 1}));
        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body["products"], json!([1, 2]));
        assert_eq!(response.body["metadata"]["currentPage"], 1);
    }

    #[test]
    fn created_uses_201() {
        let response = ApiResponse::created("stores", json!({"id": 1}));
        assert_eq!(response.status_code, StatusCode::CREATED);
        assert_eq!(ApiResponse::message("success").body["message"], "success");
    }
}
