//! 服务信息和健康检查 API
//!
//! 包含 /, /health 端点

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::services::{HealthStatus, ServiceInfo};
use crate::state::AppState;

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
}

/// 服务描述
///
/// GET /
async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(state.gateway.service_info())
}

/// 健康检查 - 用于 Kubernetes 探针
///
/// GET /health
/// 不访问 CI 服务，token 缺失时也返回 200
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.gateway.health())
}
