//! Trace relationships back to their most similar source sentence
//!
//! The locator embeds every sentence of the source exactly once per run and
//! caches the vectors; each lookup embeds only the query.

use crate::error::PipelineError;
use crate::similarity::{cosine_similarity, embed_all};
use cld_domain::Embedder;
use std::fmt::Display;
use std::sync::Arc;

/// Split text into sentences: break after `.`, `!`, or `?` followed by
/// whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().map(|n| n.is_whitespace()).unwrap_or(true) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Maps query strings to the most similar sentence of one source text.
pub struct SnippetLocator<E> {
    embedder: Arc<E>,
    model: Option<String>,
    sentences: Vec<String>,
    embeddings: Option<Vec<Vec<f32>>>,
}

impl<E> SnippetLocator<E>
where
    E: Embedder + Send + Sync + 'static,
    E::Error: Display,
{
    /// Create a locator over the given source text.
    pub fn new(source: &str, embedder: Arc<E>, model: Option<String>) -> Self {
        Self {
            embedder,
            model,
            sentences: split_sentences(source),
            embeddings: None,
        }
    }

    /// Number of sentences in the source.
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Return the source sentence most similar to `query`.
    ///
    /// Ties break to the first sentence with the maximum score (strict `>`
    /// comparison). An empty source fails with `EmptySource` rather than
    /// indexing out of range.
    pub async fn locate(&mut self, query: &str) -> Result<String, PipelineError> {
        if self.sentences.is_empty() {
            return Err(PipelineError::EmptySource);
        }

        if self.embeddings.is_none() {
            let vectors = embed_all(&self.embedder, &self.sentences, self.model.as_deref()).await?;
            self.embeddings = Some(vectors);
        }
        let embeddings = self.embeddings.as_ref().ok_or(PipelineError::EmptySource)?;

        let query_vec = embed_all(&self.embedder, &[query.to_string()], self.model.as_deref())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Embedder("no vector for query".to_string()))?;

        let mut best = 0.0f32;
        let mut best_idx = 0usize;
        for (i, sentence_vec) in embeddings.iter().enumerate() {
            if let Some(sim) = cosine_similarity(&query_vec, sentence_vec) {
                if sim > best {
                    best = sim;
                    best_idx = i;
                }
            }
        }
        Ok(self.sentences[best_idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cld_llm::MockEmbedder;

    #[test]
    fn test_split_sentences_basic() {
        let text = "Death rate rises. Population falls! Does it recover? Maybe.";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "Death rate rises.",
                "Population falls!",
                "Does it recover?",
                "Maybe."
            ]
        );
    }

    #[test]
    fn test_split_sentences_no_terminal_punctuation() {
        assert_eq!(split_sentences("no punctuation here"), vec!["no punctuation here"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_split_keeps_decimal_points_together() {
        // A period not followed by whitespace does not end a sentence.
        let sentences = split_sentences("The rate is 3.5 per year. It grows.");
        assert_eq!(sentences, vec!["The rate is 3.5 per year.", "It grows."]);
    }

    #[tokio::test]
    async fn test_locate_best_sentence() {
        let embedder = Arc::new(MockEmbedder::new(3));
        embedder.add_vector("First sentence about rates.", vec![1.0, 0.0, 0.0]);
        embedder.add_vector("Second sentence about population.", vec![0.0, 1.0, 0.0]);
        embedder.add_vector("population query", vec![0.0, 1.0, 0.1]);

        let mut locator = SnippetLocator::new(
            "First sentence about rates. Second sentence about population.",
            embedder,
            None,
        );
        let found = locator.locate("population query").await.unwrap();
        assert_eq!(found, "Second sentence about population.");
    }

    #[tokio::test]
    async fn test_locate_ties_break_to_first() {
        let embedder = Arc::new(MockEmbedder::new(2));
        embedder.add_vector("One.", vec![1.0, 0.0]);
        embedder.add_vector("Two.", vec![1.0, 0.0]);
        embedder.add_vector("q", vec![1.0, 0.0]);

        let mut locator = SnippetLocator::new("One. Two.", embedder, None);
        assert_eq!(locator.locate("q").await.unwrap(), "One.");
    }

    #[tokio::test]
    async fn test_locate_empty_source_fails_explicitly() {
        let embedder = Arc::new(MockEmbedder::new(2));
        let mut locator = SnippetLocator::new("", embedder, None);
        let result = locator.locate("anything").await;
        assert!(matches!(result, Err(PipelineError::EmptySource)));
    }

    #[tokio::test]
    async fn test_sentence_embeddings_cached_across_lookups() {
        let embedder = Arc::new(MockEmbedder::new(2));
        let mut locator = SnippetLocator::new("One. Two.", Arc::clone(&embedder), None);

        locator.locate("a").await.unwrap();
        let after_first = embedder.call_count();
        locator.locate("b").await.unwrap();
        // Second lookup embeds only the query.
        assert_eq!(embedder.call_count(), after_first + 1);
    }
}
