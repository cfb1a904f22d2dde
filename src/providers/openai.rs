use crate::{
    config::ProviderConfig,
    error::ProviderError,
    logging::SensitiveApiKey,
    models::openai::{ChatCompletionRequest, ChatCompletionResponse},
    providers::VisionProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Provider speaking the OpenAI Chat Completions API (Groq, OpenAI, local servers)
pub struct OpenAiCompatibleProvider {
    client: Client,
    name: String,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiCompatibleProvider {
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        tracing::debug!(
            provider = %config.name,
            base_url = %config.base_url,
            api_key = %SensitiveApiKey::new(&config.api_key),
            "Configured model provider"
        );

        Self {
            client,
            name: config.name.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl VisionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, ProviderError> {
        let model = request.model.clone();

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        // Check for HTTP errors
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Status {
                status,
                message: error_text,
            });
        }

        let bytes = response.bytes().await?;
        let body: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if let Some(usage) = &body.usage {
            tracing::debug!(
                model = %model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model call completed"
            );
        }

        body.first_text()
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::openai::{ChatMessage, MessageContent};
    use axum::http::StatusCode;
    use httpmock::prelude::*;
    use serde_json::json;

    fn create_test_config(base_url: String) -> ProviderConfig {
        ProviderConfig {
            api_key: "gsk-test-key".to_string(),
            base_url,
            timeout_seconds: 5,
            ..ProviderConfig::default()
        }
    }

    fn create_test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "llama3-8b-8192".to_string(),
            messages: vec![ChatMessage::user(MessageContent::Text("Hi".to_string()))],
            max_tokens: Some(10),
            temperature: None,
        }
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let provider = OpenAiCompatibleProvider::new(
            Client::new(),
            &create_test_config("https://api.groq.com/openai/v1/".to_string()),
        );
        assert_eq!(
            provider.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(provider.name(), "Groq");
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer gsk-test-key");
                then.status(200).json_body(json!({
                    "id": "chatcmpl-1",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}}]
                }));
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(Client::new(), &create_test_config(server.base_url()));
        let text = provider.complete(create_test_request()).await.unwrap();

        assert_eq!(text, "Hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(Client::new(), &create_test_config(server.base_url()));
        let err = provider.complete(create_test_request()).await.unwrap_err();

        match err {
            ProviderError::Status { status, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_maps_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).body("<html>gateway</html>");
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(Client::new(), &create_test_config(server.base_url()));
        let err = provider.complete(create_test_request()).await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(Client::new(), &create_test_config(server.base_url()));
        let err = provider.complete(create_test_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        // Nothing listens on port 9 (discard) in test environments
        let provider = OpenAiCompatibleProvider::new(
            Client::new(),
            &create_test_config("http://127.0.0.1:9".to_string()),
        );
        let err = provider.complete(create_test_request()).await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
