// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Assistants v2 API.
//!
//! Provides [`AssistantsClient`] which handles request construction,
//! authentication, response decoding, and error classification. Requests are
//! not retried here; the message handler owns retry policy.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use threadbridge_core::BridgeError;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, CreateMessageRequest, CreateRunRequest, MessageList, RunObject, ThreadObject,
};

/// Substring of the 400 error returned when a thread already has an active run.
pub const BUSY_THREAD_MARKER: &str = "Can't add messages to thread";

/// Number of messages requested per list call (the API maximum).
const MESSAGE_PAGE_LIMIT: u32 = 100;

/// HTTP client for the Assistants API.
#[derive(Debug, Clone)]
pub struct AssistantsClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AssistantsClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - bearer token for the `Authorization` header
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`
    /// * `timeout` - per-request timeout
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                BridgeError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Returns the API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /threads`
    pub async fn create_thread(&self) -> Result<ThreadObject, BridgeError> {
        let url = format!("{}/threads", self.base_url);
        self.execute(self.client.post(url).json(&serde_json::json!({})), "create_thread")
            .await
    }

    /// `POST /threads/{thread_id}/messages` with a user turn.
    ///
    /// Maps the active-run rejection to [`BridgeError::ThreadBusy`].
    pub async fn create_message(&self, thread_id: &str, content: &str) -> Result<(), BridgeError> {
        let url = format!("{}/threads/{thread_id}/messages", self.base_url);
        let request = self.client.post(url).json(&CreateMessageRequest::user(content));

        match self.execute::<IgnoredAny>(request, "create_message").await {
            Ok(_) => Ok(()),
            Err(BridgeError::Backend {
                status: Some(400),
                message,
                ..
            }) if message.contains(BUSY_THREAD_MARKER) => Err(BridgeError::ThreadBusy {
                thread_id: thread_id.to_string(),
                message,
            }),
            Err(e) => Err(e),
        }
    }

    /// `POST /threads/{thread_id}/runs`
    pub async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunObject, BridgeError> {
        let url = format!("{}/threads/{thread_id}/runs", self.base_url);
        let request = self.client.post(url).json(&CreateRunRequest { assistant_id });
        self.execute(request, "create_run").await
    }

    /// `GET /threads/{thread_id}/runs/{run_id}`
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, BridgeError> {
        let url = format!("{}/threads/{thread_id}/runs/{run_id}", self.base_url);
        self.execute(self.client.get(url), "retrieve_run").await
    }

    /// `POST /threads/{thread_id}/runs/{run_id}/cancel`
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, BridgeError> {
        let url = format!("{}/threads/{thread_id}/runs/{run_id}/cancel", self.base_url);
        self.execute(self.client.post(url), "cancel_run").await
    }

    /// `GET /threads/{thread_id}/messages`, newest first.
    pub async fn list_messages(&self, thread_id: &str) -> Result<MessageList, BridgeError> {
        let url = format!(
            "{}/threads/{thread_id}/messages?order=desc&limit={MESSAGE_PAGE_LIMIT}",
            self.base_url
        );
        self.execute(self.client.get(url), "list_messages").await
    }

    /// `GET /assistants/{assistant_id}`, used as a credential and id check.
    pub async fn retrieve_assistant(&self, assistant_id: &str) -> Result<(), BridgeError> {
        let url = format!("{}/assistants/{assistant_id}", self.base_url);
        self.execute::<IgnoredAny>(self.client.get(url), "retrieve_assistant")
            .await
            .map(|_| ())
    }

    /// Sends a request and decodes a successful JSON body into `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, BridgeError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BridgeError::Timeout {
                    duration: self.timeout,
                }
            } else {
                BridgeError::Backend {
                    message: format!("{operation}: HTTP request failed: {e}"),
                    status: None,
                    source: Some(Box::new(e)),
                }
            }
        })?;

        let status = response.status();
        debug!(operation, status = %status, "assistants API response received");

        let body = response.text().await.map_err(|e| BridgeError::Backend {
            message: format!("{operation}: failed to read response body: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| BridgeError::Backend {
            message: format!("{operation}: failed to parse API response: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })
    }
}

/// Builds a backend error from a non-2xx response, preferring the API's own message.
fn api_error(status: StatusCode, body: &str) -> BridgeError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("OpenAI API error ({status}): {}", api_err.error.message),
        Err(_) => format!("API returned {status}: {body}"),
    };
    BridgeError::Backend {
        message,
        status: Some(status.as_u16()),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbridge_core::RunStatus;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AssistantsClient {
        AssistantsClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn create_thread_sends_auth_and_beta_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-beta", "assistants=v2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "thread_abc", "object": "thread"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let thread = test_client(&server.uri()).create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_abc");
    }

    #[tokio::test]
    async fn create_message_posts_user_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_abc/messages"))
            .and(body_json(serde_json::json!({"role": "user", "content": "Hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1", "object": "thread.message", "role": "user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server.uri())
            .create_message("thread_abc", "Hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn active_run_rejection_maps_to_thread_busy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_abc/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "message": "Can't add messages to thread_abc while a run run_1 is active.",
                    "type": "invalid_request_error",
                    "code": null
                }
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_message("thread_abc", "Hello")
            .await
            .unwrap_err();
        assert!(err.is_busy(), "got: {err}");
    }

    #[tokio::test]
    async fn other_400_is_not_busy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_abc/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Invalid 'content': empty string.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_message("thread_abc", "")
            .await
            .unwrap_err();
        assert!(!err.is_busy());
        assert!(matches!(err, BridgeError::Backend { status: Some(400), .. }));
    }

    #[tokio::test]
    async fn busy_marker_on_other_status_is_not_busy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_abc/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "Can't add messages to thread right now"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_message("thread_abc", "Hello")
            .await
            .unwrap_err();
        assert!(!err.is_busy());
    }

    #[tokio::test]
    async fn retrieve_run_parses_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_abc/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "run_1", "object": "thread.run", "status": "in_progress"
            })))
            .mount(&server)
            .await;

        let run = test_client(&server.uri())
            .retrieve_run("thread_abc", "run_1")
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
    }

    #[tokio::test]
    async fn list_messages_requests_newest_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_abc/messages"))
            .and(query_param("order", "desc"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let list = test_client(&server.uri())
            .list_messages("thread_abc")
            .await
            .unwrap();
        assert!(list.data.is_empty());
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_in_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).create_thread().await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("502"), "got: {msg}");
        assert!(msg.contains("bad gateway"), "got: {msg}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).create_thread().await.unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = test_client("http://localhost:9999/v1/");
        assert_eq!(client.base_url(), "http://localhost:9999/v1");
    }
}
