//! CLD Extraction Pipeline
//!
//! Turns unreliable free-text model output into a de-duplicated,
//! internally-consistent set of typed causal edges: semantic merging of
//! near-duplicate variable names, independent polarity verification, and
//! source-snippet traceability.
//!
//! # Architecture
//!
//! ```text
//! Text → Extract → Schema Repair → Normalize → Loop-Closure (merged)
//!      → Snippets → Canonicalize Variables → Verify Polarity → Lines
//! ```
//!
//! # Key Features
//!
//! - **Schema Repair**: recovers JSON from fenced, prose-wrapped, or
//!   truncated model output
//! - **Shape Normalization**: ordered rules mapping heterogeneous response
//!   shapes onto one canonical record
//! - **Variable Canonicalization**: embedding-similarity clustering with a
//!   Reasoner merge round-trip
//! - **Polarity Verification**: multiple-choice query with a deterministic
//!   fallback chain that always yields a binary polarity
//!
//! # Example Usage
//!
//! ```no_run
//! use cld_pipeline::{Pipeline, PipelineConfig};
//! use cld_llm::{MockEmbedder, MockReasoner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reasoner = MockReasoner::new(r#"{"causalRelationships": []}"#);
//! let embedder = MockEmbedder::new(8);
//! let pipeline = Pipeline::new(reasoner, embedder, PipelineConfig::default())?;
//!
//! let outcome = pipeline.run("When death rate goes up, population decreases.").await?;
//! for line in &outcome.lines {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod canonicalize;
mod config;
mod error;
mod normalize;
mod pipeline;
mod polarity;
mod prompt;
mod repair;
mod similarity;
mod snippet;
mod types;


pub use canonicalize::VariableCanonicalizer;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use normalize::{is_malformed, normalize, Entry, RelationshipSet};
pub use pipeline::Pipeline;
pub use polarity::PolarityVerifier;
pub use repair::repair_json;
pub use similarity::{cosine_similarity, l2_normalize, similarity_groups};
pub use snippet::{split_sentences, SnippetLocator};
pub use types::ExtractionOutcome;
