//! 环境变量配置加载

use std::env;
use std::time::Duration;
use tracing::warn;

use self::constants::*;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 服务监听地址
    pub host: String,
    /// 服务监听端口
    pub port: u16,
    /// CI 服务配置
    pub provider: ProviderConfig,
}

/// CI 服务（CircleCI API v2）配置
///
/// 启动时加载一次，之后只读
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// API token，未设置时 deploy/status 端点返回配置错误
    pub token: Option<String>,
    /// 仓库所属账号
    pub owner: Option<String>,
    /// 仓库名
    pub repo: String,
    /// API 基础 URL
    pub api_base_url: String,
    /// Web 控制台基础 URL（用于拼接给用户的 pipeline 链接）
    pub app_base_url: String,
    /// VCS 类型 (github / bitbucket)
    pub vcs: String,
    /// 触发的分支
    pub branch: String,
    /// 认证 header 名
    pub token_header: String,
    /// 出站请求超时
    pub timeout: Duration,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            host,
            port,
            provider: ProviderConfig::from_env(),
        }
    }
}

impl ProviderConfig {
    /// 从环境变量加载 CI 服务配置
    pub fn from_env() -> Self {
        let token = load_with_fallback("CIRCLECI_TOKEN", "CI_PROVIDER_TOKEN");
        if token.is_none() {
            warn!("CIRCLECI_TOKEN not set, deploy and status endpoints are disabled");
        }

        let owner = load_with_fallback("GITHUB_USERNAME", "CI_PROVIDER_OWNER");
        if owner.is_none() {
            warn!("GITHUB_USERNAME not set, deployments cannot be triggered");
        }

        let timeout_secs = env::var("CI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            token,
            owner,
            repo: non_empty_var("REPO_NAME").unwrap_or_else(|| DEFAULT_REPO.to_string()),
            api_base_url: non_empty_var("CIRCLECI_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            app_base_url: non_empty_var("CIRCLECI_APP_URL")
                .unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            vcs: non_empty_var("CI_VCS").unwrap_or_else(|| DEFAULT_VCS.to_string()),
            branch: non_empty_var("CI_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            token_header: non_empty_var("CI_TOKEN_HEADER")
                .unwrap_or_else(|| DEFAULT_TOKEN_HEADER.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 是否配置了 token
    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    /// 用户可访问的 pipeline 页面链接
    pub fn pipeline_url(&self, owner: &str, number: u64) -> String {
        format!(
            "{}/pipelines/{}/{}/{}/{}",
            self.app_base_url.trim_end_matches('/'),
            self.vcs,
            owner,
            self.repo,
            number
        )
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: DEFAULT_REPO.to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            app_base_url: DEFAULT_APP_URL.to_string(),
            vcs: DEFAULT_VCS.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// 加载环境变量，支持 fallback
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    non_empty_var(primary).or_else(|| non_empty_var(fallback))
}

/// 空字符串视为未设置
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// 常量
pub mod constants {
    /// 服务名称
    pub const SERVICE_TITLE: &str = "GitOps Platform API";

    /// 健康检查中的服务标识
    pub const SERVICE_NAME: &str = "backend";

    /// 默认监听地址
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 8000;

    /// 默认仓库名
    pub const DEFAULT_REPO: &str = "gitops";

    /// CircleCI API v2
    pub const DEFAULT_API_URL: &str = "https://circleci.com/api/v2";

    /// CircleCI Web 控制台
    pub const DEFAULT_APP_URL: &str = "https://app.circleci.com";

    pub const DEFAULT_VCS: &str = "github";

    pub const DEFAULT_BRANCH: &str = "main";

    pub const DEFAULT_TOKEN_HEADER: &str = "Circle-Token";

    /// 出站请求超时（秒）
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
