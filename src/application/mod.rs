//! 应用层
//!
//! Ports: BotBackendPort（外部机器人核心上下文）
//! Operations: 操作处理器与分发注册表

pub mod error;
pub mod operations;
pub mod ports;

pub use error::OperationError;
pub use operations::{build_registry, OperationHandler, OperationRegistry, RegistryError};
