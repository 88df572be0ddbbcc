//! 应用状态

use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::services::DeploymentGateway;

/// 全局 shutdown token，用于优雅关闭 HTTP 服务
static GLOBAL_SHUTDOWN: std::sync::OnceLock<CancellationToken> = std::sync::OnceLock::new();

/// 获取全局 shutdown token
pub fn get_shutdown_token() -> CancellationToken {
    GLOBAL_SHUTDOWN
        .get_or_init(CancellationToken::new)
        .clone()
}

/// 触发全局 shutdown
pub fn trigger_shutdown() {
    if let Some(token) = GLOBAL_SHUTDOWN.get() {
        token.cancel();
    }
}

/// 应用状态
///
/// 启动后只读，handler 之间不共享可变状态
pub struct AppState {
    /// 部署网关
    pub gateway: DeploymentGateway,
}

impl AppState {
    /// 根据 CI 服务配置创建应用状态
    pub fn new(provider: ProviderConfig) -> anyhow::Result<Self> {
        let gateway = DeploymentGateway::new(provider)?;
        Ok(Self { gateway })
    }
}
