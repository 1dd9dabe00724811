//! Independent polarity verification for each relationship
//!
//! Each relationship gets a 4-option multiple-choice query; the answer is
//! resolved through a three-tier fallback chain that always terminates with
//! a definite binary polarity.

use crate::error::PipelineError;
use crate::prompt::verification_messages;
use crate::repair::repair_json;
use cld_domain::{CompletionOptions, Polarity, Reasoner, Relationship};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

const POSITIVE_WORDS: &[&str] = &[
    "increase", "increases", "increasing", "increased", "rise", "rises", "higher", "more",
    "boost", "improve", "improves",
];

const NEGATIVE_WORDS: &[&str] = &[
    "decrease", "decreases", "decreasing", "decreased", "drop", "drops", "fall", "falls",
    "lower", "lowered", "reduce", "reduces", "reduced", "decline", "declines",
];

/// Verifies the polarity of relationships through the Reasoner.
pub struct PolarityVerifier<R> {
    reasoner: Arc<R>,
    options: CompletionOptions,
}

impl<R> PolarityVerifier<R>
where
    R: Reasoner + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a verifier using the run's sampling options.
    pub fn new(reasoner: Arc<R>, options: CompletionOptions) -> Self {
        Self { reasoner, options }
    }

    /// Return the relationship with its polarity forced to exactly positive
    /// or negative.
    ///
    /// Fallback chain: parsed `answers` options, then a digit scan of the
    /// raw response, then a lexical scan over reasoning + snippet +
    /// relationship text, then the documented default of positive. Options
    /// 1-2 imply positive and are checked before 3-4, so a response
    /// selecting both resolves positive.
    pub async fn verify(&self, relationship: &Relationship) -> Result<Relationship, PipelineError> {
        let line = relationship.line();
        let messages = verification_messages(&line);

        let reasoner = Arc::clone(&self.reasoner);
        let options = self.options.clone();
        let raw = tokio::task::spawn_blocking(move || {
            reasoner
                .complete(&messages, &options)
                .map_err(|e| PipelineError::Reasoner(e.to_string()))
        })
        .await
        .map_err(|e| PipelineError::Reasoner(format!("Task join error: {}", e)))??;

        debug!(relationship = %line, response = %raw, "verification response");

        let selections = selected_options(&raw);
        let polarity = polarity_from_options(&selections).unwrap_or_else(|| {
            let mut combined = String::new();
            if let Some(reasoning) = &relationship.reasoning {
                combined.push_str(reasoning);
                combined.push(' ');
            }
            if let Some(snippet) = &relationship.snippet {
                combined.push_str(snippet);
                combined.push(' ');
            }
            combined.push_str(&line);
            // Last resort is the documented default.
            lexical_polarity(&combined).unwrap_or(Polarity::Positive)
        });

        let mut verified = relationship.clone();
        verified.polarity = Some(polarity);
        Ok(verified)
    }
}

/// Option numbers selected by the response: the parsed `answers` field when
/// the response repairs to JSON, otherwise every digit 1-4 in the raw text.
fn selected_options(raw: &str) -> Vec<u8> {
    if let Some(value) = repair_json(raw) {
        if let Some(answers) = value.get("answers") {
            return digits_1_to_4(&answers.to_string());
        }
    }
    digits_1_to_4(raw)
}

fn digits_1_to_4(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| match c {
            '1' => Some(1),
            '2' => Some(2),
            '3' => Some(3),
            '4' => Some(4),
            _ => None,
        })
        .collect()
}

/// Resolve selected options to a polarity. Positive-implying options win
/// when both classes are present.
fn polarity_from_options(options: &[u8]) -> Option<Polarity> {
    if options.contains(&1) || options.contains(&2) {
        Some(Polarity::Positive)
    } else if options.contains(&3) || options.contains(&4) {
        Some(Polarity::Negative)
    } else {
        None
    }
}

/// Lexical heuristic: one word class present and the other absent decides;
/// both or neither is inconclusive.
fn lexical_polarity(text: &str) -> Option<Polarity> {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().any(|w| lower.contains(w));
    let negative = NEGATIVE_WORDS.iter().any(|w| lower.contains(w));
    match (positive, negative) {
        (true, false) => Some(Polarity::Positive),
        (false, true) => Some(Polarity::Negative),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cld_llm::MockReasoner;

    fn verifier(response: &str) -> PolarityVerifier<MockReasoner> {
        PolarityVerifier::new(
            Arc::new(MockReasoner::new(response)),
            CompletionOptions::default(),
        )
    }

    fn relationship() -> Relationship {
        Relationship::new("death rate", "population", None)
    }

    #[tokio::test]
    async fn test_json_answers_positive() {
        let verified = verifier(r#"{"answers": [1]}"#).verify(&relationship()).await.unwrap();
        assert_eq!(verified.polarity, Some(Polarity::Positive));
    }

    #[tokio::test]
    async fn test_json_answers_negative() {
        let verified = verifier(r#"{"answers": [3, 4]}"#).verify(&relationship()).await.unwrap();
        assert_eq!(verified.polarity, Some(Polarity::Negative));
    }

    #[tokio::test]
    async fn test_mixed_answers_positive_wins() {
        let verified = verifier(r#"{"answers": [2, 3]}"#).verify(&relationship()).await.unwrap();
        assert_eq!(verified.polarity, Some(Polarity::Positive));
    }

    #[tokio::test]
    async fn test_digit_scan_of_raw_text() {
        let verified = verifier("The correct options are 3 and 4.")
            .verify(&relationship())
            .await
            .unwrap();
        assert_eq!(verified.polarity, Some(Polarity::Negative));
    }

    #[tokio::test]
    async fn test_lexical_fallback_negative() {
        let mut rel = relationship();
        rel.snippet = Some("When death rate goes up, population decreases.".to_string());
        let verified = verifier("I cannot answer that.").verify(&rel).await.unwrap();
        assert_eq!(verified.polarity, Some(Polarity::Negative));
    }

    #[tokio::test]
    async fn test_no_signal_defaults_to_positive() {
        let rel = Relationship::new("alpha", "beta", None);
        let verified = verifier("no useful content").verify(&rel).await.unwrap();
        assert_eq!(verified.polarity, Some(Polarity::Positive));
    }

    #[tokio::test]
    async fn test_always_binary_for_garbage_response() {
        let rel = Relationship::new("alpha", "beta", None);
        let verified = verifier("}{ not json, no digits").verify(&rel).await.unwrap();
        assert!(verified.polarity.is_some());
    }

    #[test]
    fn test_polarity_from_options() {
        assert_eq!(polarity_from_options(&[1]), Some(Polarity::Positive));
        assert_eq!(polarity_from_options(&[4]), Some(Polarity::Negative));
        assert_eq!(polarity_from_options(&[1, 3]), Some(Polarity::Positive));
        assert_eq!(polarity_from_options(&[]), None);
    }

    #[test]
    fn test_lexical_polarity() {
        assert_eq!(lexical_polarity("the rate rises"), Some(Polarity::Positive));
        assert_eq!(lexical_polarity("output declines"), Some(Polarity::Negative));
        // Both classes present is inconclusive.
        assert_eq!(lexical_polarity("rises then falls"), None);
        assert_eq!(lexical_polarity("nothing relevant"), None);
    }

    #[test]
    fn test_digits_1_to_4_ignores_other_digits() {
        assert_eq!(digits_1_to_4("options 1 and 9 and 3"), vec![1, 3]);
    }
}
