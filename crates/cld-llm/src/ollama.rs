//! Ollama Provider Implementation
//!
//! Reasoner and Embedder backed by a local Ollama instance.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama API
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use cld_llm::{OllamaReasoner, OllamaEmbedder};
//!
//! let reasoner = OllamaReasoner::new("http://localhost:11434", "llama3.1");
//! let embedder = OllamaEmbedder::new("http://localhost:11434", "bge-m3:latest");
//! ```

use crate::ProviderError;
use cld_domain::{CompletionOptions, Embedder as EmbedderTrait, Message, Reasoner as ReasonerTrait, Role};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "llama3.1";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3:latest";

/// Default timeout for API requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama chat provider implementing the `Reasoner` boundary.
pub struct OllamaReasoner {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct OllamaChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OllamaSampling {
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
    options: OllamaSampling,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatResponseMessage,
}

#[derive(Deserialize)]
struct OllamaChatResponseMessage {
    content: String,
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

impl OllamaReasoner {
    /// Create a new Ollama chat provider.
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: default chat model (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client: reqwest::Client::new(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a provider against the default local endpoint.
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Complete a chat conversation via the Ollama API.
    ///
    /// # Errors
    ///
    /// Returns an error if Ollama is not running, the model is not
    /// available, network communication fails, or the response format is
    /// invalid.
    pub async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.endpoint);
        let model = options.model.clone().unwrap_or_else(|| self.model.clone());

        let request_body = OllamaChatRequest {
            model: model.clone(),
            messages: messages
                .iter()
                .map(|m| OllamaChatMessage {
                    role: role_name(m.role),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: OllamaSampling {
                temperature: options.temperature,
                top_p: options.top_p,
                seed: options.seed,
            },
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&url)
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    if response.status().is_success() {
                        return match response.json::<OllamaChatResponse>().await {
                            Ok(chat) => Ok(chat.message.content),
                            Err(e) => Err(ProviderError::InvalidResponse(format!(
                                "Failed to parse chat response: {}",
                                e
                            ))),
                        };
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(ProviderError::ModelNotAvailable(model));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(ProviderError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(ProviderError::Communication(format!(
                        "Request failed: {}",
                        e
                    )));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Communication("Max retries exceeded".to_string())))
    }
}

impl ReasonerTrait for OllamaReasoner {
    type Error = ProviderError;

    fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, Self::Error> {
        // Blocking wrapper for the async implementation; the pipeline calls
        // this from spawn_blocking, where no ambient runtime exists.
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| ProviderError::Other(format!("Runtime error: {}", e)))?;
        runtime.block_on(async { OllamaReasoner::complete(self, messages, options).await })
    }
}

/// Ollama embedding provider implementing the `Embedder` boundary.
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedding provider.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider against the default local endpoint.
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Embed text via the Ollama API.
    ///
    /// Newlines are flattened to spaces before embedding. Fails immediately
    /// when the response carries no embedding; there is no fallback vector.
    pub async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/api/embed", self.endpoint);
        let model = model.unwrap_or(&self.model).to_string();

        let request_body = OllamaEmbedRequest {
            model: model.clone(),
            input: text.replace('\n', " "),
        };

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::Communication(format!("Request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::ModelNotAvailable(model));
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: OllamaEmbedResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse embed response: {}", e))
        })?;

        parsed.embeddings.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "Embeddings API returned no vector for model {}",
                model
            ))
        })
    }
}

impl EmbedderTrait for OllamaEmbedder {
    type Error = ProviderError;

    fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>, Self::Error> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| ProviderError::Other(format!("Runtime error: {}", e)))?;
        runtime.block_on(async { OllamaEmbedder::embed(self, text, model).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoner_creation() {
        let provider = OllamaReasoner::new("http://localhost:11434", "llama3.1");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model, "llama3.1");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_reasoner_default_endpoint() {
        let provider = OllamaReasoner::default_endpoint("mistral");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, "mistral");
    }

    #[test]
    fn test_reasoner_with_max_retries() {
        let provider = OllamaReasoner::new(DEFAULT_ENDPOINT, "llama3.1").with_max_retries(5);
        assert_eq!(provider.max_retries, 5);
    }

    #[test]
    fn test_chat_response_ignores_extra_fields() {
        let body = r#"{
            "model": "llama3.1",
            "message": {"role": "assistant", "content": "{}"},
            "done": true,
            "total_duration": 123
        }"#;
        let parsed: OllamaChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "{}");
    }

    #[test]
    fn test_embedder_creation() {
        let provider = OllamaEmbedder::default_endpoint("bge-m3:latest");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, "bge-m3:latest");
    }

    #[tokio::test]
    async fn test_reasoner_error_on_unreachable_endpoint() {
        let provider = OllamaReasoner::new("http://localhost:1", "llama3.1").with_max_retries(1);
        let messages = [Message::user("test")];
        let result = provider.complete(&messages, &CompletionOptions::default()).await;

        match result {
            Err(ProviderError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_embedder_error_on_unreachable_endpoint() {
        let provider = OllamaEmbedder::new("http://localhost:1", "bge-m3:latest");
        let result = provider.embed("test", None).await;
        assert!(matches!(result, Err(ProviderError::Communication(_))));
    }

    // Integration test (requires running Ollama)
    #[tokio::test]
    #[ignore]
    async fn test_ollama_chat_integration() {
        let provider = OllamaReasoner::default_endpoint(DEFAULT_CHAT_MODEL);
        let messages = [Message::user("Say 'hello' and nothing else")];
        let result = provider.complete(&messages, &CompletionOptions::default()).await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
