//! Application State
//!
//! 关联表与分发队列是并发请求之间仅有的共享可变结构

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::action::{ActionCommand, CorrelationId};
use crate::infrastructure::memory::PendingTable;

/// 应用状态
pub struct AppState {
    /// 配置的访问令牌，None 表示不鉴权
    pub access_token: Option<String>,
    /// 关联表
    pub pending: Arc<PendingTable>,
    /// 分发队列发送端
    pub queue: mpsc::Sender<(ActionCommand, CorrelationId)>,
    /// 关闭信号（接受循环与在途请求体读取共享）
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        access_token: Option<String>,
        pending: Arc<PendingTable>,
        queue: mpsc::Sender<(ActionCommand, CorrelationId)>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            access_token,
            pending,
            queue,
            shutdown,
        }
    }
}
