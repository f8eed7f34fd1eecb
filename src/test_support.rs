//! Test doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::api::{ApiError, ApiRequest, ApiResponse, Transport};

/// Transport that replays a fixed script of outcomes and records every
/// request it was asked to send.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(outcomes: impl IntoIterator<Item = Result<ApiResponse, ApiError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn from_responses(responses: impl IntoIterator<Item = ApiResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok))
    }

    pub(crate) fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.sent().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| Err(ApiError::http(request.url(), 599, "script exhausted")))
    }
}

pub(crate) fn header_map(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.insert(name, value);
        }
    }
    map
}

/// 200 with a JSON body.
pub(crate) fn json_response(body: &Value) -> ApiResponse {
    ApiResponse::new(200, HeaderMap::new(), body.to_string())
}

/// 403 announcing an exhausted quota that resets at `reset_epoch`.
pub(crate) fn exhausted_response(reset_epoch: u64) -> ApiResponse {
    ApiResponse::new(
        403,
        header_map(&[
            ("X-RateLimit-Remaining", "0"),
            ("X-RateLimit-Reset", &reset_epoch.to_string()),
        ]),
        r#"{"message":"API rate limit exceeded","documentation_url":"https://docs.github.com/rest"}"#,
    )
}

/// A listing of `count` fake commits whose `sha` encodes `page` and index.
pub(crate) fn commits(page: u32, count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| serde_json::json!({ "sha": format!("p{page}-{i}"), "commit": {} }))
            .collect(),
    )
}
