use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::response::NoStoreJson;

pub async fn health() -> impl IntoResponse {
    NoStoreJson(StatusCode::OK, json!({ "status": "ok" }))
}

/// 未定义路径：纯文本 404
pub async fn handler_404(uri: Uri) -> impl IntoResponse {
    tracing::warn!(path = uri.path(), "404 request");
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Not found",
    )
}
