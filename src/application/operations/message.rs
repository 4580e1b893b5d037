//! Message Operations
//!
//! send_msg: 向用户或群发送一条文本消息

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use super::registry::OperationHandler;
use crate::application::error::OperationError;
use crate::application::ports::{BotBackendPort, MessageTarget};

/// GET 请求的查询参数全是字符串，数字 ID 需要同时接受数字与字符串形式
fn flexible_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: {}", s))),
    }
}

/// send_msg 参数
#[derive(Debug, Deserialize)]
struct SendMsgParams {
    #[serde(default, deserialize_with = "flexible_i64")]
    user_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    group_id: Option<i64>,
    #[serde(alias = "message")]
    text: String,
}

/// 发送消息操作
pub struct SendMsgOperation;

#[async_trait]
impl OperationHandler for SendMsgOperation {
    async fn handle(
        &self,
        backend: Arc<dyn BotBackendPort>,
        params: Value,
    ) -> Result<Option<Value>, OperationError> {
        let params: SendMsgParams = serde_json::from_value(params)
            .map_err(|e| OperationError::invalid_params(e.to_string()))?;

        let target = match (params.user_id, params.group_id) {
            (Some(user_id), None) => MessageTarget::Private(user_id),
            (None, Some(group_id)) => MessageTarget::Group(group_id),
            _ => {
                return Err(OperationError::invalid_params(
                    "exactly one of user_id / group_id is required",
                ))
            }
        };

        let message_id = backend.send_message(target, &params.text).await?;
        Ok(Some(json!({ "message_id": message_id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::status;
    use crate::infrastructure::adapters::FakeBotBackend;

    fn backend() -> Arc<dyn BotBackendPort> {
        Arc::new(FakeBotBackend::new())
    }

    #[tokio::test]
    async fn test_send_msg_numeric_user_id() {
        let result = SendMsgOperation
            .handle(backend(), json!({"user_id": 123, "text": "hi"}))
            .await
            .unwrap();
        assert_eq!(result, Some(json!({"message_id": 1})));
    }

    #[tokio::test]
    async fn test_send_msg_accepts_string_ids_from_query_params() {
        // GET /send_msg?user_id=123&text=hi 会产生字符串形式的参数
        let result = SendMsgOperation
            .handle(backend(), json!({"user_id": "123", "text": "hi"}))
            .await
            .unwrap();
        assert_eq!(result, Some(json!({"message_id": 1})));
    }

    #[tokio::test]
    async fn test_send_msg_requires_exactly_one_target() {
        let err = SendMsgOperation
            .handle(backend(), json!({"text": "hi"}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), status::INVALID_PARAMS);

        let err = SendMsgOperation
            .handle(
                backend(),
                json!({"user_id": 1, "group_id": 2, "text": "hi"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), status::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_send_msg_shape_mismatch_is_invalid_params() {
        let err = SendMsgOperation
            .handle(backend(), json!({"user_id": "abc"}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), status::INVALID_PARAMS);
    }
}
