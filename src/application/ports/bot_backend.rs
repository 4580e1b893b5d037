//! Bot Backend Port - 机器人核心上下文
//!
//! 定义后端执行上下文的抽象接口。实际的消息协议客户端
//! （会话/登录、线编码、加密）是外部协作者，不在本服务内实现

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 后端错误
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend not connected")]
    NotConnected,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("backend timed out")]
    Timeout,
}

/// 消息目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    /// 私聊
    Private(i64),
    /// 群聊
    Group(i64),
}

/// 后端运行状态快照
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub online: bool,
    pub good: bool,
}

/// 应用与协议版本信息
#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    pub app_name: String,
    pub app_version: String,
    pub protocol_version: String,
}

/// Bot Backend Port
///
/// 操作处理器通过该上下文驱动事件驱动的机器人核心
#[async_trait]
pub trait BotBackendPort: Send + Sync {
    /// 发送一条文本消息，返回消息 ID
    async fn send_message(&self, target: MessageTarget, text: &str) -> Result<i64, BackendError>;

    /// 当前运行状态
    fn status(&self) -> BackendStatus;

    /// 应用版本信息
    fn app_info(&self) -> AppInfo;
}
