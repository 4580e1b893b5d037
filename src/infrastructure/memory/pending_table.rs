//! Pending Response Table - 关联表内存实现
//!
//! correlation id -> 挂起的传输响应句柄。每个在途请求一个条目，
//! 条目被 claim（移除）恰好一次

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::oneshot;

use crate::domain::action::{CorrelationId, OperationResult};

/// 挂起的传输响应句柄
///
/// 发送端从插入到 claim 由关联表独占持有，claim 后所有权转移给
/// 解析方；接收端由仍然打开的请求处理 future 等待
pub type PendingResponse = oneshot::Sender<OperationResult>;

struct PendingEntry {
    sender: PendingResponse,
    inserted_at: DateTime<Utc>,
}

/// 关联表
///
/// 任意并发的 insert/claim/discard 安全，内部同步，
/// 调用方无需外部加锁
#[derive(Default)]
pub struct PendingTable {
    entries: DashMap<CorrelationId, PendingEntry>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// 插入挂起响应
    ///
    /// 前置条件: id 不存在（UUIDv4 保证）。被顶掉的旧条目按 bug 记录
    pub fn insert(&self, id: CorrelationId, sender: PendingResponse) {
        let entry = PendingEntry {
            sender,
            inserted_at: Utc::now(),
        };
        if let Some(displaced) = self.entries.insert(id.clone(), entry) {
            tracing::error!(
                correlation_id = %id,
                inserted_at = %displaced.inserted_at,
                "Correlation id collision, previous pending response displaced"
            );
        }
    }

    /// 原子地取走挂起响应
    ///
    /// 成功的 claim 移除条目，并发的第二次 claim 观察到 None，
    /// 不会出现对传输的双重写入
    pub fn claim(&self, id: &CorrelationId) -> Option<PendingResponse> {
        self.entries.remove(id).map(|(_, entry)| entry.sender)
    }

    /// 在途条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 释放所有仍然挂起的条目，返回释放数量
    ///
    /// 关闭时使用：向每个句柄投递给定结果并清空表。
    /// 先收集 id 再逐个 claim，不持表锁投递，与在途 claim 无死锁
    pub fn discard_all(&self, result: &OperationResult) -> usize {
        let ids: Vec<CorrelationId> = self.entries.iter().map(|e| e.key().clone()).collect();

        let mut discarded = 0;
        for id in ids {
            if let Some(sender) = self.claim(&id) {
                // 接收端可能已经放弃等待，投递失败忽略
                let _ = sender.send(result.clone());
                discarded += 1;
            }
        }
        discarded
    }
}
