//! Merge variable names that denote the same real-world concept
//!
//! Variables whose embedding similarity reaches the configured threshold are
//! clustered, and the Reasoner is asked to rewrite the relationship set with
//! each cluster merged into one variable. When no cluster exists the input
//! list is returned untouched with no Reasoner round-trip — both an
//! optimization and a guard against spurious merges.

use crate::error::PipelineError;
use crate::normalize::normalize;
use crate::prompt::merge_messages;
use crate::repair::repair_json;
use crate::similarity::{embed_all, similarity_groups};
use crate::snippet::SnippetLocator;
use cld_domain::{CompletionOptions, Embedder, Reasoner, Relationship};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Consolidates near-duplicate variable names across a relationship list.
pub struct VariableCanonicalizer<R, E> {
    reasoner: Arc<R>,
    embedder: Arc<E>,
    threshold: f64,
    options: CompletionOptions,
    embedding_model: Option<String>,
}

impl<R, E> VariableCanonicalizer<R, E>
where
    R: Reasoner + Send + Sync + 'static,
    R::Error: Display,
    E: Embedder + Send + Sync + 'static,
    E::Error: Display,
{
    /// Create a canonicalizer for one run.
    pub fn new(
        reasoner: Arc<R>,
        embedder: Arc<E>,
        threshold: f64,
        options: CompletionOptions,
        embedding_model: Option<String>,
    ) -> Self {
        Self {
            reasoner,
            embedder,
            threshold,
            options,
            embedding_model,
        }
    }

    /// Merge similar variable names across the relationship list.
    ///
    /// Returns the input unchanged when no pair of variables reaches the
    /// threshold. A merge round-trip whose response cannot be parsed or
    /// yields no relationships fails with `MergeFailure` rather than
    /// silently keeping unmerged variables.
    pub async fn canonicalize(
        &self,
        relationships: Vec<Relationship>,
        source: &str,
        locator: &mut SnippetLocator<E>,
    ) -> Result<Vec<Relationship>, PipelineError> {
        let variables = distinct_variables(&relationships);
        if variables.len() < 2 {
            return Ok(relationships);
        }

        let vectors = embed_all(&self.embedder, &variables, self.embedding_model.as_deref()).await?;
        let groups = similarity_groups(&variables, &vectors, self.threshold);
        if groups.is_empty() {
            debug!("No similar variable groups at threshold {}", self.threshold);
            return Ok(relationships);
        }
        info!(groups = ?groups, "Similar variable groups detected");

        let lines: Vec<String> = relationships.iter().map(|r| r.line()).collect();
        let messages = merge_messages(source, &lines, &groups);

        let reasoner = Arc::clone(&self.reasoner);
        let options = self.options.clone();
        let raw = tokio::task::spawn_blocking(move || {
            reasoner
                .complete(&messages, &options)
                .map_err(|e| PipelineError::Reasoner(e.to_string()))
        })
        .await
        .map_err(|e| PipelineError::Reasoner(format!("Task join error: {}", e)))??;

        let value = repair_json(&raw).ok_or_else(|| {
            PipelineError::MergeFailure("merge response was not parseable JSON".to_string())
        })?;

        let merged_set = normalize(&value);
        let mut merged = Vec::with_capacity(merged_set.len());
        for entry in merged_set.values() {
            let line = entry.line.to_lowercase();
            let Some(mut relationship) = Relationship::from_line(&line) else {
                warn!("Dropping merged entry with invalid relationship: {}", line);
                continue;
            };
            relationship.reasoning = entry.reasoning.clone();
            relationship.snippet = match &entry.snippet {
                Some(snippet) => Some(snippet.clone()),
                None => {
                    let query = entry.reasoning.as_deref().unwrap_or(&line);
                    Some(locator.locate(query).await?)
                }
            };
            merged.push(relationship);
        }

        if merged.is_empty() {
            return Err(PipelineError::MergeFailure(
                "merge response contained no valid relationships".to_string(),
            ));
        }
        Ok(merged)
    }
}

/// Distinct normalized variable names, in first-appearance order.
fn distinct_variables(relationships: &[Relationship]) -> Vec<String> {
    let mut variables = Vec::new();
    for relationship in relationships {
        for name in [&relationship.subject, &relationship.object] {
            if !name.is_empty() && !variables.contains(name) {
                variables.push(name.clone());
            }
        }
    }
    variables
}
