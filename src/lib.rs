//! CI Deploy Gateway - GitOps 个性化部署网关
//!
//! 接收用户名，触发 CI pipeline，并查询 pipeline 状态

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::{EnvConfig, ProviderConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// 命令行参数覆盖的运行时配置
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// 覆盖 PORT 环境变量
    pub port_override: Option<u16>,
}

/// 初始化日志
///
/// 默认 info 级别，可用 RUST_LOG 调整
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 加载配置并启动 HTTP 服务，直到收到退出信号
pub async fn init_and_run_with_config(runtime: RuntimeConfig) -> anyhow::Result<()> {
    init_tracing();

    let mut config = EnvConfig::from_env();
    if let Some(port) = runtime.port_override {
        config.port = port;
    }

    info!(
        version = config::env::constants::VERSION,
        provider_configured = config.provider.is_configured(),
        owner = ?config.provider.owner,
        repo = %config.provider.repo,
        api_base_url = %config.provider.api_base_url,
        "CI deploy gateway starting"
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let state = Arc::new(AppState::new(config.provider)?);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("CI deploy gateway stopped");
    Ok(())
}

/// 等待 Ctrl+C / SIGTERM 或全局 shutdown token
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let token = state::get_shutdown_token();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
        () = token.cancelled() => info!("shutdown requested"),
    }

    state::trigger_shutdown();
}
