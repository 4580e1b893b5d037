//! Action 数据模型
//!
//! 动作命令、关联标识符与操作结果，把入站请求的表示从传输编码中解耦

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 操作结果状态码
pub mod status {
    /// 成功
    pub const OK: i32 = 0;
    /// 通用失败
    pub const FAILED: i32 = 1;
    /// 参数形状不匹配
    pub const INVALID_PARAMS: i32 = 1400;
    /// 动作未注册
    pub const ACTION_NOT_FOUND: i32 = 1404;
    /// 服务关闭中
    pub const SHUTTING_DOWN: i32 = 1503;
}

/// 动作命令
///
/// 每个被接受的请求恰好产生一个命令，创建后不可变。
/// 下游线格式: `{"action": <名称>, "params": <映射>}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCommand {
    pub action: String,
    pub params: Value,
}

impl ActionCommand {
    pub fn new(action: impl Into<String>, params: Value) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }
}

/// 关联标识符
///
/// 不透明的全局唯一字符串，把异步产出的结果关联回仍然打开的传输响应
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// 为一个被接受的请求生成新的标识符
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 操作结果
///
/// status 为 0 表示成功，非零表示失败类别（见 [`status`]）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub data: Option<Value>,
    pub status: i32,
    pub message: String,
}

impl OperationResult {
    /// 成功结果
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            data,
            status: status::OK,
            message: "ok".to_string(),
        }
    }

    /// 失败结果
    pub fn failed(status: i32, message: impl Into<String>) -> Self {
        Self {
            data: None,
            status,
            message: message.into(),
        }
    }

    /// 动作未注册
    pub fn action_not_found(action: &str) -> Self {
        Self::failed(
            status::ACTION_NOT_FOUND,
            format!("action not found: {}", action),
        )
    }

    /// 服务关闭中（关闭时丢弃的挂起请求收到此结果）
    pub fn shutting_down() -> Self {
        Self::failed(status::SHUTTING_DOWN, "service is shutting down")
    }

    pub fn is_ok(&self) -> bool {
        self.status == status::OK
    }
}
