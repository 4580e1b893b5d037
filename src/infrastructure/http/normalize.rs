//! Request Normalizer
//!
//! 把原始 HTTP 请求转换为 ActionCommand：
//! - GET: 查询参数 -> params（重复键 last-wins）
//! - POST + application/json: 请求体按 JSON 解析后原样使用
//! - POST + application/x-www-form-urlencoded: 按 & 分段、首个 = 拆分、值做百分号解码
//! - POST + 其他 content-type -> 406（软拒绝），其他方法 -> 405

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::action::ActionCommand;

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 规范化错误
///
/// 全部隔离在单个请求内，绝不让服务崩溃
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// 不支持的方法 -> 405
    #[error("unsupported method: {0}")]
    UnsupportedMethod(Method),

    /// 不支持的 content-type -> 406
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// 请求体不是合法 JSON -> 400
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// 读取请求体失败 -> 400
    #[error("failed to read body: {0}")]
    BodyRead(String),

    /// 读取中被关闭信号打断 -> 503
    #[error("request cancelled by shutdown")]
    Cancelled,
}

impl IntoResponse for NormalizeError {
    fn into_response(self) -> Response {
        let status = match &self {
            NormalizeError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            NormalizeError::UnsupportedContentType(_) => StatusCode::NOT_ACCEPTABLE,
            NormalizeError::MalformedBody(_) | NormalizeError::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            NormalizeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        };
        tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        status.into_response()
    }
}

/// 规范化请求
///
/// 动作名取自路径（去掉前导分隔符）。请求体读取与接受循环共享
/// 同一个关闭信号，关闭时在途读取干净地中止
pub async fn normalize(
    request: Request,
    shutdown: &CancellationToken,
) -> Result<ActionCommand, NormalizeError> {
    let method = request.method().clone();
    let action = request.uri().path().trim_start_matches('/').to_string();
    let query = request.uri().query().map(str::to_owned);
    let content_type = essence(request.headers().get(header::CONTENT_TYPE));

    let params = match method {
        Method::GET => Value::Object(query.as_deref().map(parse_pairs).unwrap_or_default()),
        Method::POST => match content_type.as_deref() {
            Some("application/json") => {
                let body = read_body(request.into_body(), shutdown).await?;
                serde_json::from_slice(&body)
                    .map_err(|e| NormalizeError::MalformedBody(e.to_string()))?
            }
            Some("application/x-www-form-urlencoded") => {
                let body = read_body(request.into_body(), shutdown).await?;
                let text = String::from_utf8_lossy(&body);
                Value::Object(parse_pairs(&text))
            }
            other => {
                return Err(NormalizeError::UnsupportedContentType(
                    other.unwrap_or("").to_string(),
                ))
            }
        },
        other => return Err(NormalizeError::UnsupportedMethod(other)),
    };

    Ok(ActionCommand::new(action, params))
}

/// content-type 去掉参数部分（如 "; charset=utf-8"）并小写化
fn essence(value: Option<&HeaderValue>) -> Option<String> {
    value
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
}

/// 读取完整请求体，与关闭信号竞争
async fn read_body(body: Body, shutdown: &CancellationToken) -> Result<Bytes, NormalizeError> {
    tokio::select! {
        _ = shutdown.cancelled() => Err(NormalizeError::Cancelled),
        read = to_bytes(body, MAX_BODY_BYTES) => {
            read.map_err(|e| NormalizeError::BodyRead(e.to_string()))
        }
    }
}

/// 解析 k=v&k=v 风格的参数对
///
/// 每段按首个 = 拆分一次，值做百分号解码（键保持原样）；
/// 无 = 的段映射为空字符串；重复键取最后一个值（last-wins）
pub(crate) fn parse_pairs(raw: &str) -> Map<String, Value> {
    let mut params = Map::new();
    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key, value),
            None => (segment, ""),
        };
        let decoded = percent_decode_str(value).decode_utf8_lossy().into_owned();
        params.insert(key.to_string(), Value::String(decoded));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    fn get(uri: &str) -> Request {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post(uri: &str, content_type: &str, body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_query_params() {
        let command = normalize(get("/send_msg?user_id=123&text=hi"), &token())
            .await
            .unwrap();
        assert_eq!(command.action, "send_msg");
        assert_eq!(command.params, json!({"user_id": "123", "text": "hi"}));
    }

    #[tokio::test]
    async fn test_get_without_query_yields_empty_params() {
        let command = normalize(get("/get_status"), &token()).await.unwrap();
        assert_eq!(command.action, "get_status");
        assert_eq!(command.params, json!({}));
    }

    #[tokio::test]
    async fn test_repeated_query_key_last_wins() {
        let command = normalize(get("/echo?k=first&k=second"), &token())
            .await
            .unwrap();
        assert_eq!(command.params, json!({"k": "second"}));
    }

    #[tokio::test]
    async fn test_post_json_body_used_as_is() {
        let command = normalize(
            post("/send_msg", "application/json", r#"{"user_id":123,"text":"hi"}"#),
            &token(),
        )
        .await
        .unwrap();
        assert_eq!(command.params, json!({"user_id": 123, "text": "hi"}));
    }

    #[tokio::test]
    async fn test_post_json_with_charset_param() {
        let command = normalize(
            post("/echo", "application/json; charset=utf-8", r#"{"a":1}"#),
            &token(),
        )
        .await
        .unwrap();
        assert_eq!(command.params, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_post_form_percent_decoded() {
        let command = normalize(
            post(
                "/echo",
                "application/x-www-form-urlencoded",
                "text=hello%20world&mark=a%2Bb",
            ),
            &token(),
        )
        .await
        .unwrap();
        assert_eq!(
            command.params,
            json!({"text": "hello world", "mark": "a+b"})
        );
    }

    #[tokio::test]
    async fn test_form_segment_without_equals_maps_to_empty() {
        let command = normalize(
            post("/echo", "application/x-www-form-urlencoded", "flag&k=v"),
            &token(),
        )
        .await
        .unwrap();
        assert_eq!(command.params, json!({"flag": "", "k": "v"}));
    }

    #[tokio::test]
    async fn test_post_other_content_type_rejected() {
        let err = normalize(post("/echo", "text/plain", "hello"), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, NormalizeError::UnsupportedContentType(ct) if ct == "text/plain"));
    }

    #[tokio::test]
    async fn test_post_without_content_type_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Body::from("hello"))
            .unwrap();
        let err = normalize(request, &token()).await.unwrap_err();
        assert!(matches!(err, NormalizeError::UnsupportedContentType(_)));
    }

    #[tokio::test]
    async fn test_other_method_rejected() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/echo")
            .body(Body::empty())
            .unwrap();
        let err = normalize(request, &token()).await.unwrap_err();
        assert!(matches!(err, NormalizeError::UnsupportedMethod(m) if m == Method::PUT));
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let err = normalize(post("/echo", "application/json", "{not json"), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_body_read_aborts_on_cancelled_token() {
        let cancelled = CancellationToken::new();
        cancelled.cancel();

        // Body 永不结束，只有取消信号能让读取返回
        let body = Body::from_stream(futures_util::stream::pending::<
            Result<Bytes, std::io::Error>,
        >());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let err = normalize(request, &cancelled).await.unwrap_err();
        assert!(matches!(err, NormalizeError::Cancelled));
    }
}
