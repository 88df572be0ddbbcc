//! 部署网关
//!
//! 校验用户输入、调用 CI 服务、把结果转换为面向用户的响应。
//! 每个操作最多一次出站请求，不做重试

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use crate::config::env::constants::{SERVICE_NAME, SERVICE_TITLE, VERSION};
use crate::config::ProviderConfig;
use crate::domain::deploy::{
    DeployRequest, DeployResponse, PipelineStatus, SanitizedUsername, WorkflowState,
};
use crate::domain::provider::TriggerPipelineBody;
use crate::error::{ApiError, ApiResult};
use crate::infra::CiProviderClient;

/// 服务描述（GET /）
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub provider_configured: bool,
}

/// 部署网关
pub struct DeploymentGateway {
    config: ProviderConfig,
    /// 仅在配置了 token 时存在
    client: Option<CiProviderClient>,
}

impl DeploymentGateway {
    /// 根据配置创建网关，token 缺失时不创建 client
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let client = match config.token.as_deref() {
            Some(token) => Some(CiProviderClient::new(&config, token)?),
            None => None,
        };

        Ok(Self { config, client })
    }

    /// 服务描述
    pub fn service_info(&self) -> ServiceInfo {
        let endpoints = BTreeMap::from([
            ("health", "/health"),
            ("deploy", "/api/deploy"),
            ("status", "/api/status/{pipeline_id}"),
        ]);

        ServiceInfo {
            message: SERVICE_TITLE,
            version: VERSION,
            status: "running",
            endpoints,
        }
    }

    /// 健康检查，不发起任何出站请求
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy",
            service: SERVICE_NAME,
            provider_configured: self.client.is_some(),
        }
    }

    /// 触发部署
    pub async fn trigger_deployment(&self, request: &DeployRequest) -> ApiResult<DeployResponse> {
        let client = self.client()?;
        let owner = self.config.owner.as_deref().ok_or_else(|| {
            error!("GITHUB_USERNAME not configured, cannot trigger deployment");
            ApiError::configuration("CI repository owner not configured. Add GITHUB_USERNAME to the environment")
        })?;

        let username = SanitizedUsername::parse(request.username.as_deref()).map_err(|e| {
            warn!(error = %e, "Rejected deploy request");
            ApiError::bad_request(e.to_string())
        })?;

        info!(username = %username, owner = %owner, repo = %self.config.repo, "Triggering deployment");

        let body = TriggerPipelineBody::deploy(username.as_str(), &self.config.branch);
        let created = client
            .trigger_pipeline(&self.config.vcs, owner, &self.config.repo, &body)
            .await
            .map_err(|e| {
                error!(username = %username, error = %e, "Failed to trigger pipeline");
                ApiError::from(e)
            })?;

        let pipeline_url = created
            .number
            .map(|number| self.config.pipeline_url(owner, number));

        info!(
            username = %username,
            pipeline_id = ?created.id,
            pipeline_number = ?created.number,
            "Pipeline triggered successfully"
        );

        Ok(DeployResponse::started(&username, created.id, pipeline_url))
    }

    /// 查询 pipeline 状态（取第一个 workflow）
    pub async fn pipeline_status(&self, pipeline_id: &str) -> ApiResult<PipelineStatus> {
        let client = self.client()?;

        let workflows = client.list_workflows(pipeline_id).await.map_err(|e| {
            error!(pipeline_id = %pipeline_id, error = %e, "Failed to fetch pipeline status");
            ApiError::from(e)
        })?;

        let Some(workflow) = workflows.items.into_iter().next() else {
            info!(pipeline_id = %pipeline_id, "Pipeline has no workflows yet");
            return Ok(PipelineStatus::pending(pipeline_id));
        };

        let state = WorkflowState::parse(workflow.status.as_deref().unwrap_or("unknown"));
        info!(pipeline_id = %pipeline_id, status = %state.as_str(), "Fetched pipeline status");

        Ok(PipelineStatus {
            pipeline_id: pipeline_id.to_string(),
            status: state.as_str().to_string(),
            message: state.message(),
            created_at: workflow.created_at,
            stopped_at: workflow.stopped_at,
        })
    }

    fn client(&self) -> ApiResult<&CiProviderClient> {
        self.client.as_ref().ok_or_else(|| {
            error!("CIRCLECI_TOKEN not configured");
            ApiError::configuration("CI provider token not configured. Add CIRCLECI_TOKEN to the environment")
        })
    }
}
