//! Response Resolver
//!
//! 按关联标识符取走挂起响应并投递操作结果

use std::sync::Arc;

use super::pending_table::PendingTable;
use crate::domain::action::{CorrelationId, OperationResult};

/// 响应解析器
///
/// claim 成功后独占完成该调用方的传输响应
#[derive(Clone)]
pub struct ResponseResolver {
    pending: Arc<PendingTable>,
}

impl ResponseResolver {
    pub fn new(pending: Arc<PendingTable>) -> Self {
        Self { pending }
    }

    /// 把结果投递给原始调用方
    ///
    /// id 不存在（已被 claim、从未存在或关闭时已丢弃）是静默 no-op，
    /// 调用方不得假设标识符仍然存活
    pub fn resolve(&self, id: &CorrelationId, result: OperationResult) {
        match self.pending.claim(id) {
            Some(sender) => {
                tracing::trace!(
                    correlation_id = %id,
                    status = result.status,
                    "Resolving pending response"
                );
                if sender.send(result).is_err() {
                    // 结果到达前调用方已断开连接
                    tracing::warn!(correlation_id = %id, "Caller gone before result delivery");
                }
            }
            None => {
                tracing::debug!(correlation_id = %id, "No pending entry for result, dropping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::status;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_resolve_delivers_result() {
        let table = Arc::new(PendingTable::new());
        let resolver = ResponseResolver::new(table.clone());
        let id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();
        table.insert(id.clone(), tx);

        resolver.resolve(&id, OperationResult::ok(None));

        assert!(rx.await.unwrap().is_ok());
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_noop() {
        let table = Arc::new(PendingTable::new());
        let resolver = ResponseResolver::new(table);
        resolver.resolve(&CorrelationId::new(), OperationResult::ok(None));
    }

    #[tokio::test]
    async fn test_second_resolve_is_noop() {
        let table = Arc::new(PendingTable::new());
        let resolver = ResponseResolver::new(table.clone());
        let id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();
        table.insert(id.clone(), tx);

        resolver.resolve(&id, OperationResult::ok(None));
        resolver.resolve(&id, OperationResult::failed(status::FAILED, "late"));

        // 只有第一次投递到达
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_resolve_with_dropped_receiver_does_not_panic() {
        let table = Arc::new(PendingTable::new());
        let resolver = ResponseResolver::new(table.clone());
        let id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();
        table.insert(id.clone(), tx);
        drop(rx);

        resolver.resolve(&id, OperationResult::ok(None));
    }
}
