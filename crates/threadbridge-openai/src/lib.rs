// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Assistants backend adapter for the threadbridge relay.
//!
//! This crate implements [`AssistantBackend`] for the Assistants v2 API:
//! threads, user messages, runs, and message listing.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use threadbridge_config::model::AssistantConfig;
use threadbridge_core::error::BridgeError;
use threadbridge_core::traits::{AssistantBackend, PluginAdapter};
use threadbridge_core::types::{
    AdapterType, HealthStatus, RunId, RunStatus, ThreadId, ThreadMessage,
};
use tracing::{debug, info};

use crate::client::AssistantsClient;

/// OpenAI Assistants backend implementing [`AssistantBackend`].
///
/// Credential resolution order: config -> environment variable -> error.
pub struct OpenAiAssistant {
    client: AssistantsClient,
    assistant_id: String,
}

impl OpenAiAssistant {
    /// Creates a new backend from the `[assistant]` configuration section.
    ///
    /// # Credential Resolution
    /// 1. `assistant.api_key` if set, else the `OPENAI_API_KEY` environment variable
    /// 2. `assistant.assistant_id` if set, else the `ASSISTANT_ID` environment variable
    pub fn new(config: &AssistantConfig) -> Result<Self, BridgeError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let assistant_id = resolve_assistant_id(&config.assistant_id)?;

        let client = AssistantsClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(
            base_url = client.base_url(),
            assistant_id = assistant_id.as_str(),
            "OpenAI assistant backend initialized"
        );

        Ok(Self {
            client,
            assistant_id,
        })
    }

    /// The assistant every run is bound to.
    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }
}

#[async_trait]
impl PluginAdapter for OpenAiAssistant {
    fn name(&self) -> &str {
        "openai-assistants"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        match self.client.retrieve_assistant(&self.assistant_id).await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        debug!("OpenAI assistant backend shutting down");
        Ok(())
    }
}

#[async_trait]
impl AssistantBackend for OpenAiAssistant {
    async fn create_thread(&self) -> Result<ThreadId, BridgeError> {
        let thread = self.client.create_thread().await?;
        debug!(thread_id = thread.id.as_str(), "thread created");
        Ok(ThreadId(thread.id))
    }

    async fn append_user_message(
        &self,
        thread_id: &ThreadId,
        content: &str,
    ) -> Result<(), BridgeError> {
        self.client.create_message(thread_id.as_str(), content).await
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> Result<RunId, BridgeError> {
        let run = self.client.create_run(thread_id.as_str(), assistant_id).await?;
        Ok(RunId(run.id))
    }

    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<RunStatus, BridgeError> {
        let run = self
            .client
            .retrieve_run(thread_id.as_str(), run_id.as_str())
            .await?;
        Ok(run.status)
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, BridgeError> {
        let page = self.client.list_messages(thread_id.as_str()).await?;
        // The page is newest first; callers expect oldest first.
        Ok(page
            .data
            .into_iter()
            .rev()
            .map(|m| m.into_thread_message())
            .collect())
    }

    async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), BridgeError> {
        let run = self
            .client
            .cancel_run(thread_id.as_str(), run_id.as_str())
            .await?;
        debug!(run_id = run.id.as_str(), status = %run.status, "run cancel requested");
        Ok(())
    }
}

/// Resolves the API key: config -> `OPENAI_API_KEY` env var -> error.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, BridgeError> {
    resolve_credential(
        config_key,
        "OPENAI_API_KEY",
        "OpenAI API key not found. Set assistant.api_key in config or OPENAI_API_KEY environment variable.",
    )
}

/// Resolves the assistant id: config -> `ASSISTANT_ID` env var -> error.
fn resolve_assistant_id(config_id: &Option<String>) -> Result<String, BridgeError> {
    resolve_credential(
        config_id,
        "ASSISTANT_ID",
        "Assistant ID not found. Set assistant.assistant_id in config or ASSISTANT_ID environment variable.",
    )
}

fn resolve_credential(
    configured: &Option<String>,
    env_var: &str,
    missing: &str,
) -> Result<String, BridgeError> {
    if let Some(value) = configured
        && !value.is_empty()
    {
        return Ok(value.clone());
    }

    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(BridgeError::Config(missing.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbridge_core::MessageRole;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_backend(base_url: &str) -> OpenAiAssistant {
        let config = AssistantConfig {
            api_key: Some("sk-test".into()),
            assistant_id: Some("asst_1".into()),
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        };
        OpenAiAssistant::new(&config).unwrap()
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("sk-abc".into())).unwrap(), "sk-abc");
    }

    #[test]
    fn resolve_assistant_id_from_config() {
        assert_eq!(
            resolve_assistant_id(&Some("asst_9".into())).unwrap(),
            "asst_9"
        );
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Succeeds only if OPENAI_API_KEY happens to be set.
        if let Err(e) = result {
            assert!(e.to_string().contains("API key not found"), "got: {e}");
        }
    }

    #[test]
    fn empty_configured_value_is_ignored() {
        let result = resolve_credential(
            &Some(String::new()),
            "THREADBRIDGE_TEST_UNSET_VARIABLE",
            "missing",
        );
        assert!(matches!(result, Err(BridgeError::Config(m)) if m == "missing"));
    }

    #[test]
    fn adapter_identity() {
        let backend = test_backend("http://localhost:1");
        assert_eq!(backend.name(), "openai-assistants");
        assert_eq!(backend.adapter_type(), AdapterType::Assistant);
        assert_eq!(backend.assistant_id(), "asst_1");
    }

    #[tokio::test]
    async fn create_run_binds_assistant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_json(serde_json::json!({"assistant_id": "asst_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "run_1", "object": "thread.run", "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let run = backend
            .create_run(&ThreadId::from("thread_1"), "asst_1")
            .await
            .unwrap();
        assert_eq!(run, RunId::from("run_1"));
    }

    #[tokio::test]
    async fn list_messages_returns_oldest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "msg_2", "role": "assistant", "run_id": "run_1",
                     "content": [{"type": "text", "text": {"value": "Hi there!", "annotations": []}}]},
                    {"id": "msg_1", "role": "user", "run_id": null,
                     "content": [{"type": "text", "text": {"value": "Hello", "annotations": []}}]}
                ],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let messages = backend
            .list_messages(&ThreadId::from("thread_1"))
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text, "Hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].run_id, Some(RunId::from("run_1")));
        assert_eq!(messages[1].text, "Hi there!");
    }

    #[tokio::test]
    async fn cancel_run_posts_to_cancel_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs/run_1/cancel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "run_1", "object": "thread.run", "status": "cancelling"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        backend
            .cancel_run(&ThreadId::from("thread_1"), &RunId::from("run_1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn health_check_reports_unknown_assistant_as_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assistants/asst_1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "No assistant found with id 'asst_1'.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let status = backend.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(m) if m.contains("No assistant found")));
    }

    #[tokio::test]
    async fn health_check_healthy_when_assistant_exists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assistants/asst_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "asst_1", "object": "assistant"
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        assert_eq!(backend.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
