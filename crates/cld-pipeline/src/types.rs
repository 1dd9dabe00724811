//! Result types for an extraction run

use cld_domain::Relationship;

/// Final product of one extraction run.
///
/// `numbered` is the artifact consumed downstream by diagram renderers: one
/// `"<n>. <subject> -->(+|-) <object>"` line per relationship, 1-indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// Verified relationships, in output order.
    pub relationships: Vec<Relationship>,
    /// Deduplicated relationship strings without numbering.
    pub lines: Vec<String>,
    /// Numbered relationship list, one per line.
    pub numbered: String,
}

impl ExtractionOutcome {
    /// The empty-but-successful outcome: the input contained no causal
    /// relationships.
    pub fn empty() -> Self {
        Self {
            relationships: Vec::new(),
            lines: Vec::new(),
            numbered: String::new(),
        }
    }

    /// Whether the run found any relationships.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outcome() {
        let outcome = ExtractionOutcome::empty();
        assert!(outcome.is_empty());
        assert!(outcome.numbered.is_empty());
    }
}
