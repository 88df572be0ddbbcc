//! CI 服务 HTTP Client
//!
//! 封装与 CI 服务（CircleCI API v2）的所有 HTTP 交互，复用连接池。
//! reqwest 的错误在这里统一转换为 `ProviderError`，不向外泄漏

use anyhow::{bail, Context};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::domain::provider::{CreatedPipeline, TriggerPipelineBody, WorkflowList};

/// CI 服务调用错误
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// 请求超时
    #[error("request to CI provider timed out")]
    Timeout,
    /// 网络/连接错误（DNS、连接被拒绝、TLS 等）
    #[error("transport error: {0}")]
    Transport(String),
    /// CI 服务返回非预期状态码
    #[error("CI provider returned {status}: {body}")]
    Upstream { status: u16, body: String },
    /// 响应体结构不符合预期
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// CI 服务客户端
///
/// 只有配置了 token 才会创建，所有请求都带认证 header 和统一超时
#[derive(Clone)]
pub struct CiProviderClient {
    client: Client,
    base_url: Url,
    token_header: String,
    token: String,
}

impl CiProviderClient {
    /// 创建新的 CI 服务客户端
    ///
    /// # Arguments
    /// * `config` - CI 服务配置，超时时间对所有请求生效
    /// * `token` - API token
    pub fn new(config: &ProviderConfig, token: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .with_context(|| format!("invalid CI API URL: {}", config.api_base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("CI API URL cannot be used as a base: {}", config.api_base_url);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token_header: config.token_header.clone(),
            token: token.into(),
        })
    }

    /// 触发 pipeline
    ///
    /// 只有 201 视为成功
    pub async fn trigger_pipeline(
        &self,
        vcs: &str,
        owner: &str,
        repo: &str,
        body: &TriggerPipelineBody<'_>,
    ) -> Result<CreatedPipeline, ProviderError> {
        let url = self.endpoint(&["project", vcs, owner, repo, "pipeline"]);
        debug!(url = %url, "Triggering pipeline");

        let request = self.client.post(url).json(body);
        let (status, text) = self.send(request).await?;

        if status != StatusCode::CREATED {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        decode(&text)
    }

    /// 获取 pipeline 的 workflow 列表
    ///
    /// 只有 200 视为成功，列表顺序由 CI 服务决定
    pub async fn list_workflows(&self, pipeline_id: &str) -> Result<WorkflowList, ProviderError> {
        let url = self.endpoint(&["pipeline", pipeline_id, "workflow"]);
        debug!(url = %url, "Fetching pipeline workflows");

        let request = self.client.get(url);
        let (status, text) = self.send(request).await?;

        if status != StatusCode::OK {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        decode(&text)
    }

    /// 拼接 API 路径，每个片段单独做 percent-encoding
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// 发送请求并读取完整响应体
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ProviderError> {
        let response = request
            .header(self.token_header.as_str(), self.token.as_str())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "CI provider request failed");
                ProviderError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// 解析响应体，结构错误转换为 `ProviderError::Decode`
fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProviderError> {
    serde_json::from_str(text).map_err(|e| ProviderError::Decode(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn config_for(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            token: Some(TEST_TOKEN.to_string()),
            owner: Some("acme".to_string()),
            api_base_url: base_url.to_string(),
            timeout: Duration::from_millis(300),
            ..ProviderConfig::default()
        }
    }

    fn client_for(base_url: &str) -> CiProviderClient {
        CiProviderClient::new(&config_for(base_url), TEST_TOKEN).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client_for("https://circleci.com/api/v2");
        let url = client.endpoint(&["pipeline", "a/b c", "workflow"]);
        assert_eq!(
            url.as_str(),
            "https://circleci.com/api/v2/pipeline/a%2Fb%20c/workflow"
        );

        let client = client_for("https://circleci.com/api/v2/");
        let url = client.endpoint(&["pipeline", "abc", "workflow"]);
        assert_eq!(url.as_str(), "https://circleci.com/api/v2/pipeline/abc/workflow");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = config_for("not a url");
        assert!(CiProviderClient::new(&config, TEST_TOKEN).is_err());
    }

    #[tokio::test]
    async fn test_trigger_pipeline_sends_token_and_body() {
        let router = Router::new().route(
            "/project/:vcs/:owner/:repo/pipeline",
            post(
                |Path((vcs, owner, repo)): Path<(String, String, String)>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    assert_eq!(headers.get("Circle-Token").unwrap(), TEST_TOKEN);
                    assert_eq!((vcs.as_str(), owner.as_str(), repo.as_str()), ("github", "acme", "gitops"));
                    assert_eq!(body["parameters"]["username"], "alice");
                    assert_eq!(body["parameters"]["trigger-deploy"], true);
                    assert_eq!(body["branch"], "main");
                    (AxumStatus::CREATED, Json(json!({"id": "abc123", "number": 42})))
                },
            ),
        );
        let base_url = spawn_provider(router).await;
        let client = client_for(&base_url);

        let created = client
            .trigger_pipeline(
                "github",
                "acme",
                "gitops",
                &TriggerPipelineBody::deploy("alice", "main"),
            )
            .await
            .unwrap();
        assert_eq!(created.id.as_deref(), Some("abc123"));
        assert_eq!(created.number, Some(42));
    }

    #[tokio::test]
    async fn test_trigger_pipeline_non_created_is_upstream_error() {
        let router = Router::new().route(
            "/project/:vcs/:owner/:repo/pipeline",
            post(|| async { (AxumStatus::OK, "{}") }),
        );
        let base_url = spawn_provider(router).await;
        let client = client_for(&base_url);

        let err = client
            .trigger_pipeline("github", "acme", "gitops", &TriggerPipelineBody::deploy("alice", "main"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_list_workflows_forbidden() {
        let router = Router::new().route(
            "/pipeline/:id/workflow",
            get(|| async { (AxumStatus::FORBIDDEN, "forbidden") }),
        );
        let base_url = spawn_provider(router).await;
        let client = client_for(&base_url);

        match client.list_workflows("abc").await {
            Err(ProviderError::Upstream { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected result: {:?}", other.map(|l| l.items.len())),
        }
    }

    #[tokio::test]
    async fn test_list_workflows_invalid_json() {
        let router = Router::new().route(
            "/pipeline/:id/workflow",
            get(|| async { (AxumStatus::OK, "<html>oops</html>") }),
        );
        let base_url = spawn_provider(router).await;
        let client = client_for(&base_url);

        let err = client.list_workflows("abc").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_not_transport_error() {
        let router = Router::new().route(
            "/pipeline/:id/workflow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"items": []}))
            }),
        );
        let base_url = spawn_provider(router).await;
        let client = client_for(&base_url);

        let err = client.list_workflows("abc").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = client_for(&unused_url().await);

        let err = client.list_workflows("abc").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)), "got {:?}", err);
    }
}
