use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// JSON 响应：固定 charset 并禁止缓存
#[derive(Debug)]
pub struct NoStoreJson<T>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for NoStoreJson<T> {
    fn into_response(self) -> Response {
        let body = match serde_json::to_vec(&self.1) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                return (StatusCode::INTERNAL_SERVER_ERROR, "serialization failed").into_response();
            }
        };
        (
            self.0,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8)),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
                (header::CONTENT_LENGTH, HeaderValue::from(body.len())),
            ],
            body,
        )
            .into_response()
    }
}
