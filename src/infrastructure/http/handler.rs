//! Action Handler
//!
//! 捕获任意路径的回退处理器：规范化 -> 生成关联标识符 -> 插入关联表 ->
//! 投递分发队列 -> 挂起等待结果。响应保持打开，
//! 直到后端从独立执行上下文里解析该标识符

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::sync::oneshot;

use super::normalize::normalize;
use super::state::AppState;
use crate::domain::action::{status, CorrelationId, OperationResult};

/// 处理一个动作请求
pub async fn handle_action(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let command = match normalize(request, &state.shutdown).await {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    let id = CorrelationId::new();
    let (sender, receiver) = oneshot::channel();
    state.pending.insert(id.clone(), sender);

    tracing::info!(correlation_id = %id, action = %command.action, "Request received");

    if state.queue.send((command, id.clone())).await.is_err() {
        // Worker 已停止，收回刚插入的条目
        state.pending.claim(&id);
        tracing::warn!(correlation_id = %id, "Dispatch queue closed, rejecting request");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    match receiver.await {
        Ok(result) => {
            tracing::debug!(correlation_id = %id, status = result.status, "Response resolved");
            (transport_status(&result), Json(result)).into_response()
        }
        Err(_) => {
            // 发送端未投递即被丢弃：claim 之后必然 send，不应发生
            tracing::warn!(correlation_id = %id, "Pending response dropped without result");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// 结果状态码到传输状态码的映射
fn transport_status(result: &OperationResult) -> StatusCode {
    match result.status {
        status::ACTION_NOT_FOUND => StatusCode::NOT_FOUND,
        status::SHUTTING_DOWN => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    }
}
