//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during an extraction run
///
/// `ParseFailure`, `SchemaInvalid`, and `MergeFailure` are terminal: the
/// pipeline surfaces them with the failing stage named and performs no
/// retries of its own. An input that legitimately contains no causal
/// relationships is a normal empty outcome, not an error.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reasoner output could not be repaired into any JSON-like structure
    #[error("Parse failure in {stage}: {detail}")]
    ParseFailure {
        /// Pipeline stage that produced the unrepairable output
        stage: &'static str,
        /// What the repair attempt saw
        detail: String,
    },

    /// Structure parsed but violates the relationship schema even after one
    /// reformat attempt
    #[error("Invalid relationship schema in {stage}: {detail}")]
    SchemaInvalid {
        /// Pipeline stage whose structure failed validation
        stage: &'static str,
        /// Which part of the schema was violated
        detail: String,
    },

    /// Variable-merge round-trip returned unparsable or schema-invalid output
    #[error("Variable merge failed: {0}")]
    MergeFailure(String),

    /// Snippet lookup against an empty sentence cache
    #[error("Source text contains no sentences to locate snippets in")]
    EmptySource,

    /// Reasoner provider error
    #[error("Reasoner error: {0}")]
    Reasoner(String),

    /// Embedder provider error
    #[error("Embedder error: {0}")]
    Embedder(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
