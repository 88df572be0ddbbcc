//! CI 服务 API 数据结构
//!
//! 只声明网关实际用到的字段，其余字段忽略

use serde::{Deserialize, Serialize};

/// 触发 pipeline 请求体
///
/// POST /project/{vcs}/{owner}/{repo}/pipeline
#[derive(Debug, Clone, Serialize)]
pub struct TriggerPipelineBody<'a> {
    pub parameters: PipelineParameters<'a>,
    pub branch: &'a str,
}

/// pipeline 参数
#[derive(Debug, Clone, Serialize)]
pub struct PipelineParameters<'a> {
    pub username: &'a str,
    #[serde(rename = "trigger-deploy")]
    pub trigger_deploy: bool,
}

impl<'a> TriggerPipelineBody<'a> {
    pub fn deploy(username: &'a str, branch: &'a str) -> Self {
        Self {
            parameters: PipelineParameters {
                username,
                trigger_deploy: true,
            },
            branch,
        }
    }
}

/// 新建 pipeline 响应（201）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedPipeline {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
}

/// pipeline 的 workflow 列表
///
/// GET /pipeline/{id}/workflow
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowList {
    #[serde(default)]
    pub items: Vec<Workflow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub stopped_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_body_shape() {
        let body = TriggerPipelineBody::deploy("alice", "main");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "parameters": { "username": "alice", "trigger-deploy": true },
                "branch": "main"
            })
        );
    }

    #[test]
    fn test_created_pipeline_ignores_extra_fields() {
        let created: CreatedPipeline = serde_json::from_str(
            r#"{"id":"abc123","number":42,"state":"created","created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(created.id.as_deref(), Some("abc123"));
        assert_eq!(created.number, Some(42));
    }

    #[test]
    fn test_workflow_list_defaults() {
        let list: WorkflowList = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());

        let list: WorkflowList =
            serde_json::from_str(r#"{"items":[{"name":"deploy","status":null}],"next_page_token":null}"#)
                .unwrap();
        assert_eq!(list.items.len(), 1);
        assert!(list.items[0].status.is_none());
        assert!(list.items[0].created_at.is_none());
    }

    #[test]
    fn test_workflow_list_rejects_wrong_shape() {
        assert!(serde_json::from_str::<WorkflowList>(r#"{"items":"nope"}"#).is_err());
        assert!(serde_json::from_str::<WorkflowList>("not json").is_err());
    }
}
