//! 磁盘用量 API

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::app::response::NoStoreJson;
use crate::app::{ApiError, AppState};

/// 获取配置路径的磁盘用量（可能来自缓存）
#[instrument(skip_all)]
pub async fn get_disk_stats(State(state): State<AppState>) -> Result<Response, ApiError> {
    let record = state.stats.get_stats().await.map_err(|e| {
        tracing::error!(path = state.stats.path(), error = %e, "disk stats failed");
        ApiError::from(e)
    })?;
    Ok(NoStoreJson(StatusCode::OK, &*record).into_response())
}
