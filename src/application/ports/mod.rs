//! Application Ports
//!
//! 定义后端上下文的抽象接口，具体实现在 infrastructure 层（或进程外部）

pub mod bot_backend;

pub use bot_backend::{AppInfo, BackendError, BackendStatus, BotBackendPort, MessageTarget};
