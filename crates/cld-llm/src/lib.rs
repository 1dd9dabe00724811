//! CLD Provider Layer
//!
//! Pluggable Reasoner and Embedder implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `Reasoner` and `Embedder`
//! traits from `cld-domain`. It supports a local Ollama backend and
//! deterministic mocks for testing.
//!
//! # Providers
//!
//! - `MockReasoner` / `MockEmbedder`: deterministic mocks for testing
//! - `OllamaReasoner` / `OllamaEmbedder`: local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use cld_llm::MockReasoner;
//! use cld_domain::{CompletionOptions, Message, Reasoner};
//!
//! let reasoner = MockReasoner::new("{\"causalRelationships\": []}");
//! let messages = [Message::user("some text")];
//! let result = reasoner.complete(&messages, &CompletionOptions::default()).unwrap();
//! assert!(result.contains("causalRelationships"));
//! ```

#![warn(missing_docs)]

pub mod ollama;

use cld_domain::{CompletionOptions, Embedder, Message, Reasoner};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::{
    OllamaEmbedder, OllamaReasoner, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_ENDPOINT,
};

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Provider error: {0}")]
    Other(String),
}

/// Mock Reasoner for deterministic testing
///
/// Responses are resolved in priority order: a substring rule matching the
/// latest user message, then the next scripted response in FIFO order, then
/// the default response. No network calls are made.
///
/// # Examples
///
/// ```
/// use cld_llm::MockReasoner;
/// use cld_domain::{CompletionOptions, Message, Reasoner};
///
/// let reasoner = MockReasoner::new("default");
/// reasoner.push_response("first");
/// reasoner.add_rule("Relationship:", "{\"answers\": [1]}");
///
/// let opts = CompletionOptions::default();
/// assert_eq!(reasoner.complete(&[Message::user("anything")], &opts).unwrap(), "first");
/// assert_eq!(reasoner.complete(&[Message::user("Relationship: a --> b")], &opts).unwrap(), "{\"answers\": [1]}");
/// assert_eq!(reasoner.complete(&[Message::user("anything")], &opts).unwrap(), "default");
/// ```
#[derive(Debug, Clone)]
pub struct MockReasoner {
    default_response: String,
    scripted: Arc<Mutex<VecDeque<String>>>,
    rules: Arc<Mutex<Vec<(String, String)>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockReasoner {
    /// Create a mock with a fixed default response.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a scripted response consumed by the next unmatched call.
    pub fn push_response(&self, response: impl Into<String>) {
        self.scripted.lock().unwrap().push_back(response.into());
    }

    /// Answer with `response` whenever the latest user message contains
    /// `needle`. Rules take priority over scripted responses.
    pub fn add_rule(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.rules.lock().unwrap().push((needle.into(), response.into()));
    }

    /// Number of completed calls.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockReasoner {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl Reasoner for MockReasoner {
    type Error = ProviderError;

    fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let latest_user = messages
            .iter()
            .rev()
            .find(|m| m.role == cld_domain::Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let rules = self.rules.lock().unwrap();
        if let Some((_, response)) = rules.iter().find(|(needle, _)| latest_user.contains(needle)) {
            return Ok(response.clone());
        }
        drop(rules);

        if let Some(response) = self.scripted.lock().unwrap().pop_front() {
            return Ok(response);
        }

        Ok(self.default_response.clone())
    }
}

/// Mock Embedder for deterministic testing
///
/// Returns a registered vector for known texts; unknown texts get a
/// deterministic vector derived from the text length so that distinct
/// strings rarely collide.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockEmbedder {
    /// Create a mock producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Register a fixed vector for a specific input text.
    pub fn add_vector(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.vectors.lock().unwrap().insert(text.into(), vector);
    }

    /// Number of embed calls.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Embedder for MockEmbedder {
    type Error = ProviderError;

    fn embed(&self, text: &str, _model: Option<&str>) -> Result<Vec<f32>, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(vector) = self.vectors.lock().unwrap().get(text) {
            return Ok(vector.clone());
        }

        let mut vector = vec![1.0; self.dimension];
        if let Some(first) = vector.first_mut() {
            *first = text.len() as f32;
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cld_domain::Role;

    fn user(content: &str) -> Vec<Message> {
        vec![Message {
            role: Role::User,
            content: content.to_string(),
        }]
    }

    #[test]
    fn test_mock_reasoner_default() {
        let reasoner = MockReasoner::new("fixed");
        let result = reasoner
            .complete(&user("any prompt"), &CompletionOptions::default())
            .unwrap();
        assert_eq!(result, "fixed");
    }

    #[test]
    fn test_mock_reasoner_scripted_order() {
        let reasoner = MockReasoner::new("default");
        reasoner.push_response("one");
        reasoner.push_response("two");

        let opts = CompletionOptions::default();
        assert_eq!(reasoner.complete(&user("a"), &opts).unwrap(), "one");
        assert_eq!(reasoner.complete(&user("b"), &opts).unwrap(), "two");
        assert_eq!(reasoner.complete(&user("c"), &opts).unwrap(), "default");
    }

    #[test]
    fn test_mock_reasoner_rules_take_priority() {
        let reasoner = MockReasoner::new("default");
        reasoner.push_response("scripted");
        reasoner.add_rule("Relationship:", "ruled");

        let opts = CompletionOptions::default();
        assert_eq!(
            reasoner.complete(&user("Relationship: a --> b"), &opts).unwrap(),
            "ruled"
        );
        assert_eq!(reasoner.complete(&user("other"), &opts).unwrap(), "scripted");
    }

    #[test]
    fn test_mock_reasoner_call_count_shared_across_clones() {
        let reasoner = MockReasoner::new("x");
        let clone = reasoner.clone();
        reasoner
            .complete(&user("a"), &CompletionOptions::default())
            .unwrap();
        assert_eq!(clone.call_count(), 1);
    }

    #[test]
    fn test_mock_embedder_registered_vector() {
        let embedder = MockEmbedder::new(4);
        embedder.add_vector("death rate", vec![1.0, 0.0, 0.0, 0.0]);

        let v = embedder.embed("death rate", None).unwrap();
        assert_eq!(v, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mock_embedder_fallback_is_deterministic() {
        let embedder = MockEmbedder::new(4);
        let a = embedder.embed("abc", None).unwrap();
        let b = embedder.embed("abc", None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert_eq!(a[0], 3.0);
        assert_eq!(embedder.call_count(), 2);
    }
}
