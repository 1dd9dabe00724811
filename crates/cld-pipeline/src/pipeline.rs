//! Pipeline orchestrator
//!
//! Linear state machine with one conditional branch and one fixed extra
//! round-trip:
//!
//! ```text
//! EXTRACT → REPAIR → (REFORMAT if malformed) → NORMALIZE → LOOP-CLOSURE
//!   → MERGE → ATTACH-SNIPPETS → CANONICALIZE → VERIFY-POLARITY → FORMAT
//! ```
//!
//! All Reasoner calls are strictly sequential; each prompt depends on the
//! prior call's parsed output. The only concurrency is the embedding
//! fan-out inside the canonicalizer and snippet locator. No stage retries;
//! a failed external call propagates as a terminal error.

use crate::canonicalize::VariableCanonicalizer;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::normalize::{is_malformed, normalize};
use crate::polarity::PolarityVerifier;
use crate::prompt::{extraction_messages, loop_closure_messages, reformat_messages};
use crate::repair::repair_json;
use crate::snippet::SnippetLocator;
use crate::types::ExtractionOutcome;
use cld_domain::{Embedder, Message, Polarity, Reasoner, Relationship};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs the full extraction and consolidation pipeline over one text.
pub struct Pipeline<R, E> {
    reasoner: Arc<R>,
    embedder: Arc<E>,
    config: PipelineConfig,
}

impl<R, E> Pipeline<R, E>
where
    R: Reasoner + Send + Sync + 'static,
    R::Error: Display,
    E: Embedder + Send + Sync + 'static,
    E::Error: Display,
{
    /// Create a pipeline, validating the configuration.
    pub fn new(reasoner: R, embedder: E, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            reasoner: Arc::new(reasoner),
            embedder: Arc::new(embedder),
            config,
        })
    }

    /// Extract, consolidate, verify, and format causal relationships from
    /// free text.
    ///
    /// An input with no causal relationships yields an empty outcome, not an
    /// error; parse, schema, and merge failures are terminal.
    pub async fn run(&self, source: &str) -> Result<ExtractionOutcome, PipelineError> {
        info!("Starting extraction, text length {}", source.len());

        // EXTRACT → REPAIR
        let raw_extraction = self.call_reasoner(extraction_messages(source)).await?;
        debug!(response = %raw_extraction, "extraction response");
        let mut parsed = repair_json(&raw_extraction).ok_or_else(|| PipelineError::ParseFailure {
            stage: "extraction",
            detail: "response could not be repaired into JSON".to_string(),
        })?;

        // REFORMAT: one repair request, then fail hard. No silent fallback
        // to a partial result.
        if is_malformed(&parsed) {
            warn!("Extraction structure is malformed, requesting reformat");
            let raw_reformat = self.call_reasoner(reformat_messages(&raw_extraction)).await?;
            let reformatted =
                repair_json(&raw_reformat).ok_or_else(|| PipelineError::SchemaInvalid {
                    stage: "reformat",
                    detail: "reformatted output could not be repaired into JSON".to_string(),
                })?;
            if is_malformed(&reformatted) {
                return Err(PipelineError::SchemaInvalid {
                    stage: "reformat",
                    detail: "output still violates the relationship schema".to_string(),
                });
            }
            parsed = reformatted;
        }

        // NORMALIZE
        let mut entries = normalize(&parsed);
        info!("Normalized {} relationships from extraction", entries.len());

        // LOOP-CLOSURE: second call seeded with the conversation so far;
        // keyed entries merge into the first pass, later keys winning.
        let raw_loop = self
            .call_reasoner(loop_closure_messages(source, &raw_extraction))
            .await?;
        debug!(response = %raw_loop, "loop-closure response");
        let loop_value = repair_json(&raw_loop).ok_or_else(|| PipelineError::ParseFailure {
            stage: "loop-closure",
            detail: "response could not be repaired into JSON".to_string(),
        })?;
        if is_malformed(&loop_value) {
            return Err(PipelineError::SchemaInvalid {
                stage: "loop-closure",
                detail: "output violates the relationship schema".to_string(),
            });
        }
        let closures = normalize(&loop_value);
        if !closures.is_empty() {
            info!("Loop-closure pass supplied {} additional entries", closures.len());
            entries.extend(closures);
        }

        if entries.is_empty() {
            info!("No causal relationships found");
            return Ok(ExtractionOutcome::empty());
        }

        // Entries whose line cannot be normalized into a record are dropped.
        let mut relationships = Vec::with_capacity(entries.len());
        for entry in entries.values() {
            match Relationship::from_line(&entry.line.to_lowercase()) {
                Some(mut relationship) => {
                    relationship.reasoning = entry.reasoning.clone();
                    relationship.snippet = entry.snippet.clone();
                    relationships.push(relationship);
                }
                None => warn!("Dropping invalid relationship line: {}", entry.line),
            }
        }
        if relationships.is_empty() {
            return Ok(ExtractionOutcome::empty());
        }

        // ATTACH-SNIPPETS
        let mut locator = SnippetLocator::new(
            source,
            Arc::clone(&self.embedder),
            self.config.embedding_model.clone(),
        );
        for relationship in &mut relationships {
            if relationship.snippet.is_none() {
                let query = relationship
                    .reasoning
                    .clone()
                    .unwrap_or_else(|| relationship.line());
                relationship.snippet = Some(locator.locate(&query).await?);
            }
        }

        // CANONICALIZE-VARIABLES
        let canonicalizer = VariableCanonicalizer::new(
            Arc::clone(&self.reasoner),
            Arc::clone(&self.embedder),
            self.config.threshold,
            self.config.completion_options(),
            self.config.embedding_model.clone(),
        );
        let relationships = canonicalizer
            .canonicalize(relationships, source, &mut locator)
            .await?;

        // VERIFY-POLARITY, one relationship at a time
        let verifier = PolarityVerifier::new(
            Arc::clone(&self.reasoner),
            self.config.completion_options(),
        );
        let mut verified = Vec::with_capacity(relationships.len());
        for relationship in &relationships {
            verified.push(verifier.verify(relationship).await?);
        }

        let outcome = format_outcome(verified);
        info!("Extraction complete: {} relationships", outcome.lines.len());
        Ok(outcome)
    }

    /// Invoke the Reasoner on a blocking task with this run's options.
    async fn call_reasoner(&self, messages: Vec<Message>) -> Result<String, PipelineError> {
        let reasoner = Arc::clone(&self.reasoner);
        let options = self.config.completion_options();
        tokio::task::spawn_blocking(move || {
            reasoner
                .complete(&messages, &options)
                .map_err(|e| PipelineError::Reasoner(e.to_string()))
        })
        .await
        .map_err(|e| PipelineError::Reasoner(format!("Task join error: {}", e)))?
    }
}

/// Number and deduplicate the verified relationships.
///
/// Self-edges and empty names are skipped; an unresolved polarity defaults
/// to positive here and nowhere earlier.
fn format_outcome(relationships: Vec<Relationship>) -> ExtractionOutcome {
    let mut lines: Vec<String> = Vec::new();
    let mut kept = Vec::new();
    for relationship in relationships {
        if relationship.validate().is_err() {
            continue;
        }
        let polarity = relationship.polarity.unwrap_or(Polarity::Positive);
        let line = format!(
            "{} -->{} {}",
            relationship.subject,
            polarity.symbol(),
            relationship.object
        );
        if !lines.contains(&line) {
            lines.push(line);
            kept.push(relationship);
        }
    }
    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n");
    ExtractionOutcome {
        relationships: kept,
        lines,
        numbered,
    }
}
