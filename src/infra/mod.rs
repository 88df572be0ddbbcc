//! 基础设施模块
//!
//! 封装外部依赖（CI 服务 HTTP client）

pub mod ci_provider;

pub use ci_provider::{CiProviderClient, ProviderError};
