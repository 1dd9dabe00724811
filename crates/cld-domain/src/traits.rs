//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the external
//! text-generation and embedding services. Infrastructure implementations
//! live in other crates (cld-llm).

use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction.
    System,
    /// User turn.
    User,
    /// Prior assistant turn.
    Assistant,
}

/// One message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling options for a completion call.
///
/// Fixed `(messages, model, temperature=0, seed)` should produce
/// deterministic output; the pipeline relies on that for reproducible runs
/// but does not verify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Model identifier, provider default when `None`.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling cutoff.
    pub top_p: f64,
    /// Random seed for deterministic runs.
    pub seed: Option<u64>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            top_p: 1.0,
            seed: Some(42),
        }
    }
}

/// Trait for text-completion operations.
///
/// Implemented by the infrastructure layer (cld-llm). Calls are strictly
/// sequential within a pipeline run; each prompt depends on the prior
/// parsed output.
pub trait Reasoner {
    /// Error type for completion operations.
    type Error;

    /// Complete a chat conversation and return the raw response text.
    fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, Self::Error>;
}

/// Trait for embedding operations.
///
/// Implemented by the infrastructure layer (cld-llm). Vectors must have the
/// same length for every input within a run; they need not be pre-normalized.
pub trait Embedder {
    /// Error type for embedding operations.
    type Error;

    /// Map text to a fixed-length real vector.
    fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>, Self::Error>;
}
