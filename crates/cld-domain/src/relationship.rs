//! Relationship module - the fundamental unit of a causal-loop diagram
//!
//! A relationship is a directed, typed edge between two normalized variable
//! names. The canonical text form, consumed by diagram renderers, is
//! `"<subject> -->(+|-) <object>"`.

use crate::variable::normalize_name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary causal polarity of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Subject and object move in the same direction.
    Positive,
    /// Subject and object move in opposite directions.
    Negative,
}

impl Polarity {
    /// The symbol used in relationship strings: `(+)` or `(-)`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Polarity::Positive => "(+)",
            Polarity::Negative => "(-)",
        }
    }

    /// Parse a `(+)` / `(-)` symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "(+)" => Some(Polarity::Positive),
            "(-)" => Some(Polarity::Negative),
            _ => None,
        }
    }

    /// Map loose predicate text onto a polarity.
    ///
    /// Model output is not always one of the four exact predicate values;
    /// anything mentioning increase/positive resolves positive, anything
    /// mentioning decrease/negative resolves negative.
    pub fn from_text_hint(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("increase") || lower.contains("positive") {
            Some(Polarity::Positive)
        } else if lower.contains("decrease") || lower.contains("negative") {
            Some(Polarity::Negative)
        } else {
            None
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Negative => write!(f, "negative"),
        }
    }
}

/// Predicate values accepted from the raw extraction stage.
///
/// `increase`/`decrease` are directional aliases; they resolve to the same
/// binary polarity as `positive`/`negative` for diagram purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawPredicate {
    /// Subject causes object to increase.
    Increase,
    /// Subject causes object to decrease.
    Decrease,
    /// Same-direction coupling.
    Positive,
    /// Opposite-direction coupling.
    Negative,
}

impl RawPredicate {
    /// Parse one of the four exact predicate values (case-insensitive).
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "increase" => Some(RawPredicate::Increase),
            "decrease" => Some(RawPredicate::Decrease),
            "positive" => Some(RawPredicate::Positive),
            "negative" => Some(RawPredicate::Negative),
            _ => None,
        }
    }

    /// Resolve the directional aliases to a binary polarity.
    pub fn polarity(&self) -> Polarity {
        match self {
            RawPredicate::Increase | RawPredicate::Positive => Polarity::Positive,
            RawPredicate::Decrease | RawPredicate::Negative => Polarity::Negative,
        }
    }
}

/// A directed causal edge between two variables.
///
/// Subject and object are stored normalized (lowercased, trimmed, sentence
/// punctuation stripped). Polarity is `None` while unresolved; the verifier
/// forces it to `Some` before a relationship enters the final list.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Cause variable.
    pub subject: String,
    /// Effect variable.
    pub object: String,
    /// Causal polarity, once resolved.
    pub polarity: Option<Polarity>,
    /// Free-text justification supplied by the model, if any.
    pub reasoning: Option<String>,
    /// Source sentence this relationship traces back to, if located.
    pub snippet: Option<String>,
}

impl Relationship {
    /// Build a relationship from raw names, normalizing both sides.
    pub fn new(subject: &str, object: &str, polarity: Option<Polarity>) -> Self {
        Self {
            subject: normalize_name(subject),
            object: normalize_name(object),
            polarity,
            reasoning: None,
            snippet: None,
        }
    }

    /// Check the structural invariants: both names non-empty and distinct.
    pub fn validate(&self) -> Result<(), String> {
        if self.subject.is_empty() {
            return Err("subject is empty".to_string());
        }
        if self.object.is_empty() {
            return Err("object is empty".to_string());
        }
        if self.subject == self.object {
            return Err(format!("self-referential relationship: {}", self.subject));
        }
        Ok(())
    }

    /// Render the canonical text form, e.g. `"death rate -->(-) population"`.
    ///
    /// An unresolved polarity renders with no symbol (`"a --> b"`); final
    /// formatting in the pipeline defaults unresolved edges to positive.
    pub fn line(&self) -> String {
        let symbol = self.polarity.map(|p| p.symbol()).unwrap_or("");
        format!("{} -->{} {}", self.subject, symbol, self.object)
    }

    /// Parse a relationship string back into a record.
    ///
    /// Returns `None` when either side of the `-->` delimiter is empty after
    /// normalization, or both sides normalize to the same variable.
    pub fn from_line(line: &str) -> Option<Self> {
        let (subject, object, symbol) = extract_variables(line);
        if subject.is_empty() || object.is_empty() || subject == object {
            return None;
        }
        Some(Self {
            subject,
            object,
            polarity: Polarity::from_symbol(&symbol),
            reasoning: None,
            snippet: None,
        })
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line())
    }
}

/// Split a relationship string into `(subject, object, symbol)`.
///
/// Both variable names come back normalized; `symbol` is `"(+)"`, `"(-)"`,
/// or empty when no polarity marker is present. Malformed lines (no `-->`)
/// return three empty strings so callers can skip them.
///
/// # Examples
///
/// ```
/// use cld_domain::extract_variables;
///
/// let (s, o, sym) = extract_variables("Death Rate -->(-) Population.");
/// assert_eq!(s, "death rate");
/// assert_eq!(o, "population");
/// assert_eq!(sym, "(-)");
/// ```
pub fn extract_variables(line: &str) -> (String, String, String) {
    let Some((left, right)) = line.split_once("-->") else {
        return (String::new(), String::new(), String::new());
    };
    let mut symbol = String::new();
    let mut cleaned = right.to_string();
    for marker in ["(+)", "(-)"] {
        if cleaned.contains(marker) {
            if symbol.is_empty() {
                symbol = marker.to_string();
            }
            cleaned = cleaned.replace(marker, "");
        }
    }
    (normalize_name(left), normalize_name(&cleaned), symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_variables_positive() {
        let (s, o, sym) = extract_variables("birth rate -->(+) population");
        assert_eq!(s, "birth rate");
        assert_eq!(o, "population");
        assert_eq!(sym, "(+)");
    }

    #[test]
    fn test_extract_variables_negative() {
        let (s, o, sym) = extract_variables("death rate -->(-) population");
        assert_eq!(s, "death rate");
        assert_eq!(o, "population");
        assert_eq!(sym, "(-)");
    }

    #[test]
    fn test_extract_variables_no_symbol() {
        let (s, o, sym) = extract_variables("fatigue --> productivity");
        assert_eq!(s, "fatigue");
        assert_eq!(o, "productivity");
        assert_eq!(sym, "");
    }

    #[test]
    fn test_extract_variables_malformed() {
        let (s, o, sym) = extract_variables("no delimiter here");
        assert!(s.is_empty());
        assert!(o.is_empty());
        assert!(sym.is_empty());
    }

    #[test]
    fn test_extract_variables_strips_punctuation() {
        let (s, o, _) = extract_variables("Overtime! -->(+) Fatigue.");
        assert_eq!(s, "overtime");
        assert_eq!(o, "fatigue");
    }

    #[test]
    fn test_line_round_trip() {
        let rel = Relationship::new("death rate", "population", Some(Polarity::Negative));
        let parsed = Relationship::from_line(&rel.line()).unwrap();
        assert_eq!(parsed.subject, rel.subject);
        assert_eq!(parsed.object, rel.object);
        assert_eq!(parsed.polarity, rel.polarity);
    }

    #[test]
    fn test_from_line_rejects_self_edge() {
        assert!(Relationship::from_line("population -->(+) population").is_none());
    }

    #[test]
    fn test_from_line_rejects_empty_side() {
        assert!(Relationship::from_line(" -->(+) population").is_none());
        assert!(Relationship::from_line("death rate -->(+) ").is_none());
    }

    #[test]
    fn test_validate() {
        let ok = Relationship::new("a", "b", None);
        assert!(ok.validate().is_ok());

        let empty = Relationship::new("", "b", None);
        assert!(empty.validate().is_err());

        let self_edge = Relationship::new("a", "a", None);
        assert!(self_edge.validate().is_err());
    }

    #[test]
    fn test_raw_predicate_parse() {
        assert_eq!(RawPredicate::parse("increase"), Some(RawPredicate::Increase));
        assert_eq!(RawPredicate::parse("Negative"), Some(RawPredicate::Negative));
        assert_eq!(RawPredicate::parse("correlates"), None);
    }

    #[test]
    fn test_raw_predicate_polarity() {
        assert_eq!(RawPredicate::Increase.polarity(), Polarity::Positive);
        assert_eq!(RawPredicate::Positive.polarity(), Polarity::Positive);
        assert_eq!(RawPredicate::Decrease.polarity(), Polarity::Negative);
        assert_eq!(RawPredicate::Negative.polarity(), Polarity::Negative);
    }

    #[test]
    fn test_polarity_text_hint() {
        assert_eq!(Polarity::from_text_hint("increases"), Some(Polarity::Positive));
        assert_eq!(Polarity::from_text_hint("NEGATIVE"), Some(Polarity::Negative));
        assert_eq!(Polarity::from_text_hint("unrelated"), None);
    }
}
