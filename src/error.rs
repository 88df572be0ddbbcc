//! 统一错误处理
//!
//! 提供 `ApiError` 枚举实现 `IntoResponse`，把网关的错误分类映射为 HTTP 状态码和 JSON 错误体

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::infra::ci_provider::ProviderError;

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// 请求体解析失败时返回给用户的固定提示
const INVALID_BODY_MESSAGE: &str = "request body must be a JSON object like {\"username\": \"...\"}";

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 500 - 服务端配置缺失（如 CI token 未设置）
    Configuration(String),
    /// 400 - 客户端输入无效
    BadRequest(String),
    /// 400 - 请求体不是合法 JSON 或字段类型不对，附带解析错误
    InvalidBody(String),
    /// CI 服务返回非成功状态码，原样透传状态码和响应体
    Upstream { status: u16, body: String },
    /// 504 - 调用 CI 服务超时
    Timeout(String),
    /// 500 - 网络/连接错误
    Transport(String),
}

impl ApiError {
    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// 创建请求无效错误
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// 创建上游错误
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Configuration(_) | ApiError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            // 上游返回 2xx/3xx 等无法作为错误透传的状态码时退回 502
            ApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Configuration(msg) => ErrorResponse::new("configuration_error", msg),
            ApiError::BadRequest(msg) => ErrorResponse::new("validation_error", msg),
            ApiError::InvalidBody(detail) => {
                ErrorResponse::new("validation_error", INVALID_BODY_MESSAGE).with_detail(detail)
            }
            ApiError::Upstream { status, body } => ErrorResponse::new(
                "upstream_error",
                format!("CI provider returned status {}", status),
            )
            .with_detail(body),
            ApiError::Timeout(msg) => ErrorResponse::new("timeout", msg),
            ApiError::Transport(msg) => ErrorResponse::new("transport_error", msg),
        };

        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Configuration(m) => write!(f, "Configuration error: {}", m),
            ApiError::BadRequest(m) => write!(f, "Bad request: {}", m),
            ApiError::InvalidBody(m) => write!(f, "Invalid request body: {}", m),
            ApiError::Upstream { status, body } => {
                write!(f, "Upstream error: {} - {}", status, body)
            }
            ApiError::Timeout(m) => write!(f, "Timeout: {}", m),
            ApiError::Transport(m) => write!(f, "Transport error: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout => {
                ApiError::Timeout("Timed out connecting to the CI provider, please try again".to_string())
            }
            ProviderError::Transport(e) => {
                ApiError::Transport(format!("Connection error with the CI provider: {}", e))
            }
            ProviderError::Upstream { status, body } => ApiError::Upstream { status, body },
            ProviderError::Decode(e) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                body: format!("Invalid response from the CI provider: {}", e),
            },
        }
    }
}

/// 请求体 JSON 解析失败统一按校验错误返回
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_new() {
        let resp = ErrorResponse::new("test_error", "Test message");
        assert_eq!(resp.error, "test_error");
        assert_eq!(resp.message, "Test message");
        assert!(resp.detail.is_none());
    }

    #[test]
    fn test_error_response_with_detail() {
        let resp = ErrorResponse::new("test_error", "Test message").with_detail("Extra info");
        assert_eq!(resp.detail, Some("Extra info".to_string()));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::configuration("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Timeout("x".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Transport("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status_passthrough() {
        assert_eq!(
            ApiError::upstream(403, "forbidden").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::upstream(404, "").status_code(),
            StatusCode::NOT_FOUND
        );
        // 非错误状态码不能原样返回
        assert_eq!(
            ApiError::upstream(200, "").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_invalid_body_keeps_parser_text_in_detail() {
        let err = ApiError::InvalidBody("Failed to parse the request body as JSON: expected value".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], INVALID_BODY_MESSAGE);
        assert!(body["detail"].as_str().unwrap().contains("expected value"));
    }

    #[test]
    fn test_provider_error_mapping() {
        assert!(matches!(
            ApiError::from(ProviderError::Timeout),
            ApiError::Timeout(_)
        ));
        assert!(matches!(
            ApiError::from(ProviderError::Transport("refused".into())),
            ApiError::Transport(m) if m.contains("refused")
        ));
        assert!(matches!(
            ApiError::from(ProviderError::Decode("eof".into())),
            ApiError::Upstream { status: 502, .. }
        ));
    }
}
