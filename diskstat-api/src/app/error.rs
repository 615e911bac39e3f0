use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diskstat_core::StatsError;
use serde_json::json;

use super::response::NoStoreJson;

#[derive(Debug)]
pub struct ApiError {
    error: &'static str,
    message: String,
    status: StatusCode,
}

impl ApiError {
    pub fn new(error: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error,
            status,
            message: message.into(),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        // Exec/Query/Parse 对调用方一视同仁，只透出错误信息
        ApiError::new(
            "disk stats failed",
            StatusCode::INTERNAL_SERVER_ERROR,
            err.to_string(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "message": self.message,
        });
        NoStoreJson(self.status, body).into_response()
    }
}
