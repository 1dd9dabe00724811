//! Configuration for the extraction pipeline

use cld_domain::CompletionOptions;
use serde::{Deserialize, Serialize};

/// Configuration for one extraction run
///
/// Constructed once per run and passed explicitly to every component; it is
/// read-only after initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Cosine similarity threshold above which variable names merge, in (0, 1]
    pub threshold: f64,

    /// Chat model identifier, provider default when `None`
    pub llm_model: Option<String>,

    /// Embedding model identifier, provider default when `None`
    pub embedding_model: Option<String>,

    /// Sampling temperature for all Reasoner calls
    pub temperature: f64,

    /// Nucleus sampling cutoff for all Reasoner calls
    pub top_p: f64,

    /// Random seed for deterministic runs
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    /// Deterministic defaults: temperature 0, top_p 1, seed 42, threshold 0.85
    fn default() -> Self {
        Self {
            threshold: 0.85,
            llm_model: None,
            embedding_model: None,
            temperature: 0.0,
            top_p: 1.0,
            seed: Some(42),
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(format!("threshold {} must be in (0, 1]", self.threshold));
        }
        if self.temperature < 0.0 {
            return Err(format!("temperature {} must be non-negative", self.temperature));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(format!("top_p {} must be in (0, 1]", self.top_p));
        }
        Ok(())
    }

    /// Sampling options attached to every Reasoner call in this run
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.llm_model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            seed: self.seed,
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
