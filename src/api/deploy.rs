//! 部署 API
//!
//! 包含 /api/deploy, /api/status/:pipeline_id 端点

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::warn;

use crate::domain::deploy::{DeployRequest, DeployResponse, PipelineStatus};
use crate::error::ApiResult;
use crate::state::AppState;

/// 创建部署路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/deploy", post(trigger_deployment))
        .route("/api/status/:pipeline_id", get(get_pipeline_status))
}

/// 触发部署
///
/// POST /api/deploy
///
/// 客户端断开时 handler future 被丢弃，进行中的 CI 请求随之取消
async fn trigger_deployment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> ApiResult<Json<DeployResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected deploy request body");
        rejection
    })?;
    let response = state.gateway.trigger_deployment(&request).await?;
    Ok(Json(response))
}

/// 查询 pipeline 状态
///
/// GET /api/status/:pipeline_id
async fn get_pipeline_status(
    State(state): State<Arc<AppState>>,
    Path(pipeline_id): Path<String>,
) -> ApiResult<Json<PipelineStatus>> {
    let status = state.gateway.pipeline_status(&pipeline_id).await?;
    Ok(Json(status))
}
