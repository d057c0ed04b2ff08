//! A session answering from canned payloads.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use econdata_core::{DataError, ProblemDetails, Result};
use serde_json::Value;

use crate::session::Session;

#[derive(Debug, Clone)]
struct Call {
    path: String,
    query: String,
    body: Option<Value>,
}

/// Answers GET and POST requests with payloads registered per path. Unregistered paths
/// fail with a 404 problem.
#[derive(Debug, Default)]
pub(crate) struct FakeSession {
    get: HashMap<String, Value>,
    post: HashMap<String, Value>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_get(mut self, path: &str, payload: Value) -> Self {
        self.get.insert(path.to_string(), payload);
        self
    }

    pub(crate) fn with_post(mut self, path: &str, payload: Value) -> Self {
        self.post.insert(path.to_string(), payload);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn last_call(&self, path: &str) -> Option<Call> {
        let calls = self.calls.lock().ok()?;
        calls.iter().rev().find(|c| c.path == path).cloned()
    }

    /// Query string of the last request to `path`, as `k=v&k=v`.
    pub(crate) fn last_query(&self, path: &str) -> String {
        self.last_call(path).map(|c| c.query).unwrap_or_default()
    }

    /// Body of the last request to `path`.
    pub(crate) fn last_body(&self, path: &str) -> Value {
        self.last_call(path).and_then(|c| c.body).unwrap_or_default()
    }

    fn record(&self, path: &str, params: &[(&str, String)], body: Option<&Value>) {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Call {
                path: path.to_string(),
                query,
                body: body.cloned(),
            });
        }
    }

    fn answer(method: &str, path: &str, payload: Option<&Value>) -> Result<Value> {
        payload.cloned().ok_or_else(|| {
            DataError::from(ProblemDetails::from_response(
                method,
                path,
                404,
                r#"{"title": "Not Found", "status": 404}"#,
            ))
        })
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn get_or_raise(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        self.record(path, params, None);
        Self::answer("GET", path, self.get.get(path))
    }

    async fn post_or_raise(&self, path: &str, body: &Value) -> Result<Value> {
        self.record(path, &[], Some(body));
        Self::answer("POST", path, self.post.get(path))
    }

    async fn delete_or_raise(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        self.record(path, params, None);
        Ok(Value::Null)
    }
}
