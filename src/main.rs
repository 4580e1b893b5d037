//! Botbridge 服务入口
//!
//! 组装完整的桥接管线：配置 → 操作注册表 → 分发 Worker → HTTP 服务器，
//! 并负责优雅关闭时在途请求的收尾

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::EnvFilter;

use botbridge::application::build_registry;
use botbridge::config::{load_config, print_config};
use botbridge::domain::action::OperationResult;
use botbridge::infrastructure::adapters::FakeBotBackend;
use botbridge::infrastructure::http::{AppState, BridgeServer};
use botbridge::infrastructure::memory::{PendingTable, ResponseResolver};
use botbridge::infrastructure::worker::{DispatchWorker, DispatchWorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    let config = load_config()?;

    // 初始化日志
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},botbridge={},tower_http=debug",
            config.log.level, config.log.level
        ))
    });
    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting botbridge service...");
    print_config(&config);

    // 操作注册表
    let registry = Arc::new(build_registry()?);
    tracing::info!(operations = registry.len(), "Operation registry built");

    // 机器人后端
    // 实际部署时替换为真正的协议客户端
    let backend = Arc::new(FakeBotBackend::new());

    // 关联表与分发队列
    let pending = Arc::new(PendingTable::new());
    let (queue_tx, queue_rx) = mpsc::channel(config.dispatch.queue_capacity);

    // 关闭信号与在途分发跟踪
    let shutdown = CancellationToken::new();
    let tracker = TaskTracker::new();

    // 启动分发 Worker
    let worker = DispatchWorker::new(
        DispatchWorkerConfig {
            max_concurrent: config.dispatch.max_concurrent,
        },
        queue_rx,
        registry,
        backend,
        ResponseResolver::new(pending.clone()),
        shutdown.clone(),
        tracker.clone(),
    );
    tokio::spawn(worker.run());

    // Ctrl+C 触发关闭
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        });
    }

    // 收尾任务：取消后等待在途分发，宽限期超时则丢弃仍挂起的请求，
    // 让仍在等待结果的调用方拿到终止响应而不是悬挂连接
    let discard_task = {
        let shutdown = shutdown.clone();
        let pending = pending.clone();
        let grace = Duration::from_secs(config.dispatch.shutdown_grace_secs);
        tokio::spawn(async move {
            shutdown.cancelled().await;
            if timeout(grace, tracker.wait()).await.is_err() {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "In-flight dispatches did not finish within grace period"
                );
            }
            let discarded = pending.discard_all(&OperationResult::shutting_down());
            if discarded > 0 {
                tracing::info!(count = discarded, "Discarded pending requests on shutdown");
            }
        })
    };

    // 启动 HTTP 服务器
    let state = Arc::new(AppState::new(
        config.server.access_token.clone(),
        pending,
        queue_tx,
        shutdown.clone(),
    ));
    let server = BridgeServer::new(config.server.clone(), state);
    server.run_with_shutdown(shutdown.clone()).await?;

    // 等待收尾任务完成
    let _ = discard_task.await;

    tracing::info!("Server shutdown complete");
    Ok(())
}
