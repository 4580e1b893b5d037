//! 应用层错误定义
//!
//! 操作处理器的统一错误类型

use thiserror::Error;

use crate::application::ports::BackendError;
use crate::domain::action::status;

/// 操作处理器错误
///
/// 在分发边界被捕获并转换为非零状态的 OperationResult，
/// 绝不作为未处理故障向外传播
#[derive(Debug, Error)]
pub enum OperationError {
    /// 参数形状不匹配（处理器自身的失败，而非分发层错误）
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// 后端执行失败
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// 处理器内部失败
    #[error("{0}")]
    Failed(String),
}

impl OperationError {
    /// 创建参数无效错误
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// 对应的结果状态码
    pub fn status(&self) -> i32 {
        match self {
            OperationError::InvalidParams(_) => status::INVALID_PARAMS,
            OperationError::Backend(_) => status::FAILED,
            OperationError::Failed(_) => status::FAILED,
        }
    }
}
