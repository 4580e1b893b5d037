//! Dispatch Worker - 后台命令分发器
//!
//! 从队列消费 (ActionCommand, CorrelationId)，在有界并发下执行操作，
//! 并通过 ResponseResolver 把结果送回原始调用方

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::application::ports::BotBackendPort;
use crate::application::OperationRegistry;
use crate::domain::action::{status, ActionCommand, CorrelationId, OperationResult};
use crate::infrastructure::memory::ResponseResolver;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct DispatchWorkerConfig {
    /// 最大并发分发数
    pub max_concurrent: usize,
}

impl Default for DispatchWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

/// 分发 Worker
///
/// 每个命令在独立任务里执行，任务挂在 TaskTracker 上，
/// 关闭流程可以确定性地 join 所有在途分发
pub struct DispatchWorker {
    config: DispatchWorkerConfig,
    queue_receiver: mpsc::Receiver<(ActionCommand, CorrelationId)>,
    registry: Arc<OperationRegistry>,
    backend: Arc<dyn BotBackendPort>,
    resolver: ResponseResolver,
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl DispatchWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: DispatchWorkerConfig,
        queue_receiver: mpsc::Receiver<(ActionCommand, CorrelationId)>,
        registry: Arc<OperationRegistry>,
        backend: Arc<dyn BotBackendPort>,
        resolver: ResponseResolver,
        shutdown: CancellationToken,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            registry,
            backend,
            resolver,
            shutdown,
            tracker,
        }
    }

    /// 启动 Worker
    ///
    /// 收到取消信号或队列关闭后退出循环并关闭任务跟踪器；
    /// 已经 spawn 的分发任务继续运行，由关闭流程等待
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "DispatchWorker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));

        loop {
            let received = tokio::select! {
                _ = self.shutdown.cancelled() => None,
                msg = self.queue_receiver.recv() => msg,
            };

            let (command, id) = match received {
                Some(pair) => pair,
                None => break,
            };

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Dispatch semaphore closed");
                    break;
                }
            };

            let registry = self.registry.clone();
            let backend = self.backend.clone();
            let resolver = self.resolver.clone();

            self.tracker.spawn(async move {
                let _permit = permit; // 持有 permit 直到分发完成
                let result = Self::dispatch_one(&command, registry, backend).await;
                resolver.resolve(&id, result);
            });
        }

        self.tracker.close();
        tracing::info!("DispatchWorker stopped");
    }

    /// 执行单个命令
    ///
    /// 处理器 panic 被隔离在嵌套任务里，转换为 FAILED 结果，
    /// 不会让请求悬挂
    async fn dispatch_one(
        command: &ActionCommand,
        registry: Arc<OperationRegistry>,
        backend: Arc<dyn BotBackendPort>,
    ) -> OperationResult {
        let owned = command.clone();
        let handle = tokio::spawn(async move { registry.dispatch(&owned, backend).await });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    action = %command.action,
                    error = %e,
                    "Operation handler aborted"
                );
                OperationResult::failed(status::FAILED, "operation handler aborted")
            }
        }
    }
}
