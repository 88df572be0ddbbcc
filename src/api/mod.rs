//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod deploy;
pub mod health;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// 构建完整的 API 路由
///
/// 所有端点允许任意来源跨域访问
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Service info & Health
        .merge(health::router())
        // Deploy & Status
        .merge(deploy::router())
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
