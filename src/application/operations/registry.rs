//! Operation Dispatch Registry
//!
//! 启动时构建的 action name -> handler 映射，启动后只读，
//! 查找无需同步

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::application::error::OperationError;
use crate::application::ports::BotBackendPort;
use crate::domain::action::{ActionCommand, OperationResult};

/// 注册错误
#[derive(Debug, Error)]
pub enum RegistryError {
    /// 同名动作拒绝重复注册
    #[error("operation already registered: {0}")]
    Duplicate(String),
}

/// 操作处理器
///
/// 消费命令参数与后端上下文，产出结果或失败。
/// 处理器自行解释 params 的类型形状，形状不匹配属于处理器自身的失败
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn handle(
        &self,
        backend: Arc<dyn BotBackendPort>,
        params: Value,
    ) -> Result<Option<Value>, OperationError>;
}

/// 操作分发注册表
///
/// 每个动作名恰好注册一个处理器，注册顺序不影响查找
#[derive(Default)]
pub struct OperationRegistry {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// 注册操作处理器
    ///
    /// 重复名称返回 [`RegistryError::Duplicate`]，不做覆盖
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// 已注册的操作数量
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 分发命令
    ///
    /// 永远返回一个终结的 OperationResult：未注册的动作映射为
    /// ACTION_NOT_FOUND，处理器失败在此边界转换为非零状态，
    /// 不向调用方传播错误
    pub async fn dispatch(
        &self,
        command: &ActionCommand,
        backend: Arc<dyn BotBackendPort>,
    ) -> OperationResult {
        let handler = match self.handlers.get(&command.action) {
            Some(handler) => handler.clone(),
            None => {
                tracing::warn!(action = %command.action, "Action not registered");
                return OperationResult::action_not_found(&command.action);
            }
        };

        match handler.handle(backend, command.params.clone()).await {
            Ok(data) => OperationResult::ok(data),
            Err(e) => {
                tracing::warn!(action = %command.action, error = %e, "Operation failed");
                OperationResult::failed(e.status(), e.to_string())
            }
        }
    }
}
