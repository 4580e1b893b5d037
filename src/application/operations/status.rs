//! Status Operations
//!
//! get_status / get_version_info / echo

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::registry::OperationHandler;
use crate::application::error::OperationError;
use crate::application::ports::BotBackendPort;

/// 查询后端运行状态
pub struct GetStatusOperation;

#[async_trait]
impl OperationHandler for GetStatusOperation {
    async fn handle(
        &self,
        backend: Arc<dyn BotBackendPort>,
        _params: Value,
    ) -> Result<Option<Value>, OperationError> {
        let status = backend.status();
        let data = serde_json::to_value(status).map_err(|e| OperationError::Failed(e.to_string()))?;
        Ok(Some(data))
    }
}

/// 查询应用版本信息
pub struct GetVersionOperation;

#[async_trait]
impl OperationHandler for GetVersionOperation {
    async fn handle(
        &self,
        backend: Arc<dyn BotBackendPort>,
        _params: Value,
    ) -> Result<Option<Value>, OperationError> {
        let info = backend.app_info();
        let data = serde_json::to_value(info).map_err(|e| OperationError::Failed(e.to_string()))?;
        Ok(Some(data))
    }
}

/// 原样返回参数，用于连通性诊断
pub struct EchoOperation;

#[async_trait]
impl OperationHandler for EchoOperation {
    async fn handle(
        &self,
        _backend: Arc<dyn BotBackendPort>,
        params: Value,
    ) -> Result<Option<Value>, OperationError> {
        Ok(Some(params))
    }
}
