//! 业务服务模块

pub mod gateway;

pub use gateway::{DeploymentGateway, HealthStatus, ServiceInfo};
