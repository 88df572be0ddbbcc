//! 部署相关领域模型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户名最小长度（按原始输入计算）
pub const MIN_USERNAME_LEN: usize = 2;

/// 触发部署请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployRequest {
    /// 用户提供的原始用户名，未经过滤
    #[serde(default)]
    pub username: Option<String>,
}

/// 用户名校验错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("username must be at least 2 characters")]
    TooShort,
    #[error("invalid username: use only letters, digits and hyphens")]
    Invalid,
}

/// 过滤后的用户名，只包含 `[a-z0-9-]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedUsername(String);

impl SanitizedUsername {
    /// 校验并过滤原始用户名
    ///
    /// 长度检查针对原始输入，过滤后为空再单独报错，两个检查顺序不能合并
    pub fn parse(raw: Option<&str>) -> Result<Self, UsernameError> {
        let raw = raw.unwrap_or_default();
        if raw.chars().count() < MIN_USERNAME_LEN {
            return Err(UsernameError::TooShort);
        }

        let sanitized = sanitize(raw);
        if sanitized.is_empty() {
            return Err(UsernameError::Invalid);
        }

        Ok(Self(sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 只保留 ASCII 字母、数字和连字符，并转为小写
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 触发部署响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployResponse {
    pub success: bool,
    pub message: String,
    pub pipeline_id: Option<String>,
    pub pipeline_url: Option<String>,
}

impl DeployResponse {
    /// 部署已成功触发
    pub fn started(
        username: &SanitizedUsername,
        pipeline_id: Option<String>,
        pipeline_url: Option<String>,
    ) -> Self {
        Self {
            success: true,
            message: format!(
                "Deployment started for {}! Your personalized build is on its way...",
                username
            ),
            pipeline_id,
            pipeline_url,
        }
    }
}

/// Pipeline 状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineStatus {
    pub pipeline_id: String,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<String>,
}

impl PipelineStatus {
    /// workflow 尚未创建
    pub fn pending(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            status: "pending".to_string(),
            message: "workflow not yet started".to_string(),
            created_at: None,
            stopped_at: None,
        }
    }
}

/// CI workflow 状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Running,
    Success,
    Failed,
    Canceled,
    OnHold,
    /// 其他状态原样保留
    Other(String),
}

impl WorkflowState {
    pub fn parse(value: &str) -> Self {
        match value {
            "running" => Self::Running,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            "on_hold" => Self::OnHold,
            other => Self::Other(other.to_string()),
        }
    }

    /// 转换为字符串
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::OnHold => "on_hold",
            Self::Other(value) => value,
        }
    }

    /// 面向用户的状态描述
    pub fn message(&self) -> String {
        match self {
            Self::Running => "pipeline running".to_string(),
            Self::Success => "deployment completed successfully".to_string(),
            Self::Failed => "deployment failed".to_string(),
            Self::Canceled => "deployment canceled".to_string(),
            Self::OnHold => "pipeline on hold pending approval".to_string(),
            Self::Other(value) => format!("Status: {}", value),
        }
    }
}
