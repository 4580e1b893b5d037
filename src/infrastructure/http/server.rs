//! HTTP Server
//!
//! 监听端点的生命周期：绑定前探测端口占用、优雅关闭、
//! 关闭错误只记录不传播

use std::io;
use std::sync::Arc;

use axum::{middleware, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth::auth_middleware;
use super::handler::handle_action;
use super::state::AppState;
use crate::config::ServerConfig;

/// 服务器启动错误
///
/// 唯一会中止整个服务的错误类别
#[derive(Debug, Error)]
pub enum ServerError {
    /// 端口已被占用（绑定前探测到）
    #[error("port {0} is already in use")]
    PortInUse(u16),

    /// 绑定失败
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    /// 服务运行中的致命 IO 错误
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// HTTP 桥接服务器
pub struct BridgeServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl BridgeServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// 构建 Router
    ///
    /// 任意路径都是动作名，统一走回退处理器；
    /// 鉴权中间件在请求体被读取之前运行
    fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

        Router::new()
            .fallback(handle_action)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器（带优雅关闭）
    ///
    /// 观察到取消信号后停止接受新连接，等待在途连接完成；
    /// 取消之后的关闭错误非致命，记录后吞掉
    pub async fn run_with_shutdown(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let addr = self.config.addr();
        probe_port(&addr, self.config.port)?;

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        info!("HTTP bridge listening on {}", addr);

        let router = self.build_router();
        let serve = axum::serve(listener, router).with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        });

        if let Err(e) = serve.await {
            if shutdown.is_cancelled() {
                tracing::warn!(error = %e, "Listener close failed");
            } else {
                return Err(ServerError::Io(e));
            }
        }

        info!("HTTP bridge stopped");
        Ok(())
    }
}

/// 绑定前探测端口占用
///
/// 先用 std 监听器试绑一次，占用时直接快速失败，
/// 不把歧义的 OS 绑定错误带进启动路径
fn probe_port(addr: &str, port: u16) -> Result<(), ServerError> {
    match std::net::TcpListener::bind(addr) {
        Ok(probe) => {
            drop(probe);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => Err(ServerError::PortInUse(port)),
        Err(e) => Err(ServerError::Bind {
            addr: addr.to_string(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::PendingTable;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn test_state() -> Arc<AppState> {
        let (queue_tx, _queue_rx) = mpsc::channel(8);
        Arc::new(AppState::new(
            None,
            Arc::new(PendingTable::new()),
            queue_tx,
            CancellationToken::new(),
        ))
    }

    #[test]
    fn test_probe_port_detects_occupied_port() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let err = probe_port(&format!("127.0.0.1:{}", port), port).unwrap_err();
        assert!(matches!(err, ServerError::PortInUse(p) if p == port));
    }

    #[test]
    fn test_probe_port_passes_free_port() {
        assert!(probe_port("127.0.0.1:0", 0).is_ok());
    }

    #[tokio::test]
    async fn test_server_starts_and_stops_on_cancellation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            access_token: None,
        };
        let shutdown = CancellationToken::new();
        let server = BridgeServer::new(config, test_state());

        let handle = tokio::spawn(server.run_with_shutdown(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown.cancel();
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("server should stop within the grace window")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_start_fails_fast_when_port_in_use() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            access_token: None,
        };
        let server = BridgeServer::new(config, test_state());

        let err = server
            .run_with_shutdown(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::PortInUse(p) if p == port));
    }
}
