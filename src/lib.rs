//! Botbridge - HTTP 动作桥接服务
//!
//! 把同步的 HTTP 请求/响应契约桥接到异步的事件驱动机器人核心：
//! 每个入站请求规范化为一个 ActionCommand，投递给后台分发管线，
//! 结果经关联标识符送回原始调用方。
//!
//! 领域层 (domain/):
//! - Action: 动作命令、关联标识符、操作结果
//!
//! 应用层 (application/):
//! - Ports: BotBackendPort（外部机器人核心上下文）
//! - Operations: 操作处理器与分发注册表
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 监听生命周期、鉴权门、请求规范化、动作处理器
//! - Memory: 关联表与响应解析器
//! - Worker: DispatchWorker 后台命令分发
//! - Adapters: FakeBotBackend 演示/测试后端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
