//! Operations
//!
//! 内建操作与分发注册表。注册是启动时的显式调用，按字符串名称键控，
//! 不做运行时类型扫描

pub mod message;
pub mod registry;
pub mod status;

pub use registry::{OperationHandler, OperationRegistry, RegistryError};

use std::sync::Arc;

/// 构建内建操作注册表
pub fn build_registry() -> Result<OperationRegistry, RegistryError> {
    let mut registry = OperationRegistry::new();
    registry.register("send_msg", Arc::new(message::SendMsgOperation))?;
    registry.register("get_status", Arc::new(status::GetStatusOperation))?;
    registry.register("get_version_info", Arc::new(status::GetVersionOperation))?;
    registry.register("echo", Arc::new(status::EchoOperation))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 4);
    }
}
