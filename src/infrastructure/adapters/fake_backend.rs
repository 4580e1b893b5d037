//! Fake Bot Backend - 用于测试与演示的后端实现
//!
//! 不实际连接消息协议，发送返回递增的消息 ID

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::application::ports::{
    AppInfo, BackendError, BackendStatus, BotBackendPort, MessageTarget,
};

/// Fake Bot Backend
///
/// 实际部署时此处接入真正的协议客户端
pub struct FakeBotBackend {
    next_message_id: AtomicI64,
}

impl FakeBotBackend {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1),
        }
    }
}

impl Default for FakeBotBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BotBackendPort for FakeBotBackend {
    async fn send_message(&self, target: MessageTarget, text: &str) -> Result<i64, BackendError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            ?target,
            text_len = text.len(),
            message_id,
            "FakeBotBackend: message sent"
        );
        Ok(message_id)
    }

    fn status(&self) -> BackendStatus {
        BackendStatus {
            online: true,
            good: true,
        }
    }

    fn app_info(&self) -> AppInfo {
        AppInfo {
            app_name: "botbridge".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: "v11".to_string(),
        }
    }
}
