//! 领域模型模块
//!
//! 网关对外的请求/响应结构以及 CI 服务 API 的数据结构

pub mod deploy;
pub mod provider;

pub use deploy::{
    DeployRequest, DeployResponse, PipelineStatus, SanitizedUsername, UsernameError,
    WorkflowState,
};
pub use provider::{CreatedPipeline, TriggerPipelineBody, Workflow, WorkflowList};
