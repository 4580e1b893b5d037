//! Auth Gate
//!
//! 可选 bearer 凭证校验：请求元数据上的无状态谓词，
//! 在读取任何请求体之前运行

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::normalize::parse_pairs;
use super::state::AppState;

/// 鉴权结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCheck {
    Allowed,
    MissingCredential,
    InvalidCredential,
}

/// 校验请求凭证
///
/// 未配置 token 时放行一切。否则取 Authorization 头，
/// 头缺失时回退到 access_token 查询参数（改写为 bearer 形式）
pub fn check(
    configured: Option<&str>,
    authorization: Option<&str>,
    query_token: Option<&str>,
) -> AuthCheck {
    let Some(token) = configured else {
        return AuthCheck::Allowed;
    };

    let presented = authorization
        .map(str::to_owned)
        .or_else(|| query_token.map(|t| format!("Bearer {}", t)));

    match presented {
        None => AuthCheck::MissingCredential,
        Some(value) if value == format!("Bearer {}", token) => AuthCheck::Allowed,
        Some(_) => AuthCheck::InvalidCredential,
    }
}

/// 鉴权中间件
///
/// 缺失凭证 -> 401 + WWW-Authenticate 提示，凭证不匹配 -> 403，
/// 两者都不消耗请求体
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let query_token = request.uri().query().and_then(|q| {
        parse_pairs(q)
            .get("access_token")
            .and_then(|v| v.as_str().map(str::to_owned))
    });

    match check(
        state.access_token.as_deref(),
        authorization.as_deref(),
        query_token.as_deref(),
    ) {
        AuthCheck::Allowed => next.run(request).await,
        AuthCheck::MissingCredential => {
            tracing::warn!(uri = %request.uri(), "Auth failed: missing credential");
            (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
            )
                .into_response()
        }
        AuthCheck::InvalidCredential => {
            tracing::warn!(uri = %request.uri(), "Auth failed: invalid credential");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
