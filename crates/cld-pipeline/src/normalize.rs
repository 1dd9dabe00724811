//! Normalize heterogeneous Reasoner output shapes into canonical records
//!
//! Repaired model output arrives in several shapes: a structured
//! `causalRelationships` array, a numbered object keyed by `"1"`, `"2"`, ...
//! holding relationship strings, or a bare array of cause/effect objects.
//! An ordered list of shape rules is tried until one matches, so type-shape
//! assumptions stay inside this module.

use cld_domain::{humanize, Polarity, RawPredicate};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// One normalized relationship entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Canonical relationship string, `"<subject> -->(+|-) <object>"`.
    pub line: String,
    /// Model-supplied justification, if any.
    pub reasoning: Option<String>,
    /// Model-supplied source snippet, if any.
    pub snippet: Option<String>,
}

/// Ordered set of normalized entries keyed by their numeric position.
///
/// The loop-closure pass merges its entries into the first pass's set
/// key-wise; later keys overwrite earlier on collision.
pub type RelationshipSet = BTreeMap<u64, Entry>;

/// A relationship string is valid when both sides of `-->` are non-empty.
pub fn is_line_valid(line: &str) -> bool {
    match line.split_once("-->") {
        Some((left, right)) => {
            let right = right.replace("(+)", "").replace("(-)", "");
            !left.trim().is_empty() && !right.trim().is_empty()
        }
        None => false,
    }
}

/// Check whether a repaired structure violates the relationship schema.
///
/// A structured `causalRelationships` shape is malformed when any entry has
/// an empty subject/object or a predicate outside the four allowed values; a
/// keyed shape is malformed when any entry's relationship string lacks a
/// side around `-->`. A valid empty object is not malformed — it means no
/// relationships. On malformed output the orchestrator issues exactly one
/// reformat request before failing.
pub fn is_malformed(value: &Value) -> bool {
    if let Some(rels) = value.get("causalRelationships") {
        let Some(array) = rels.as_array() else {
            return true;
        };
        return array.iter().any(|entry| {
            let subject = field_str(entry, &["subject", "cause", "variable1"]);
            let object = field_str(entry, &["object", "effect", "variable2"]);
            let predicate = field_str(entry, &["predicate", "direction", "sign", "relationship"]);
            subject.trim().is_empty()
                || object.trim().is_empty()
                || RawPredicate::parse(&predicate).is_none()
        });
    }

    if value.is_array() {
        return false;
    }

    let Some(obj) = value.as_object() else {
        return true;
    };

    // Object wrapping an array of cause/effect records is an accepted shape.
    if find_relationship_array(value).is_some() {
        return false;
    }
    if final_relationships(value).is_some() {
        return false;
    }

    for entry in obj.values() {
        match relationship_string(entry) {
            Some(line) if is_line_valid(&line) => {}
            _ => return true,
        }
    }
    false
}

/// Normalize a repaired structure into an ordered relationship set.
///
/// Shape rules are tried in order; the first match wins. A value matching no
/// rule yields an empty set.
pub fn normalize(value: &Value) -> RelationshipSet {
    structured_rule(value)
        .or_else(|| array_rule(value))
        .or_else(|| step_rule(value))
        .or_else(|| keyed_rule(value))
        .unwrap_or_default()
}

/// Shape (a): `{"causalRelationships": [{subject, predicate, object}]}`.
fn structured_rule(value: &Value) -> Option<RelationshipSet> {
    let array = value.get("causalRelationships")?.as_array()?;
    Some(entries_from_records(array))
}

/// Shape (c): a top-level array of cause/effect records, or an object with
/// one field holding such an array.
fn array_rule(value: &Value) -> Option<RelationshipSet> {
    if let Some(array) = value.as_array() {
        if array.iter().any(looks_like_record) {
            return Some(entries_from_records(array));
        }
        return None;
    }
    let array = find_relationship_array(value)?;
    Some(entries_from_records(array))
}

/// Merge-response shape: `{"Step 2": {"Final Relationships": [...]}}`.
fn step_rule(value: &Value) -> Option<RelationshipSet> {
    let array = final_relationships(value)?;
    let mut set = RelationshipSet::new();
    for (idx, entry) in array.iter().enumerate() {
        let line = relationship_string(entry)?;
        set.insert(
            idx as u64 + 1,
            Entry {
                line: line.to_lowercase().trim().to_string(),
                reasoning: optional_field(entry, &["reasoning"]),
                snippet: optional_field(entry, &["relevant text", "snippet"]),
            },
        );
    }
    Some(set)
}

/// Shape (b): numbered object of `{"causal relationship": "<s> -->(+) <o>"}`.
fn keyed_rule(value: &Value) -> Option<RelationshipSet> {
    let obj = value.as_object()?;
    let mut set = RelationshipSet::new();
    for (position, (key, entry)) in obj.iter().enumerate() {
        let Some(line) = relationship_string(entry) else {
            warn!("Skipping keyed entry '{}' with no relationship string", key);
            continue;
        };
        let line = line.trim().to_string();
        if !is_line_valid(&line) {
            warn!("Skipping invalid relationship string: {}", line);
            continue;
        }
        let key_number = numeric_key(key).unwrap_or(position as u64 + 1);
        set.insert(
            key_number,
            Entry {
                line,
                reasoning: optional_field(entry, &["reasoning"]),
                snippet: optional_field(entry, &["relevant text", "snippet"]),
            },
        );
    }
    Some(set)
}

/// Build entries from subject/predicate/object records, humanizing names and
/// resolving predicates to polarity symbols.
fn entries_from_records(array: &[Value]) -> RelationshipSet {
    let mut set = RelationshipSet::new();
    let mut next_key = 1u64;
    for entry in array {
        let subject = humanize(&field_str(entry, &["subject", "cause", "variable1"]));
        let object = humanize(&field_str(entry, &["object", "effect", "variable2"]));
        if subject.is_empty() || object.is_empty() {
            warn!("Skipping record with empty subject or object");
            continue;
        }
        let predicate = field_str(entry, &["predicate", "direction", "sign", "relationship"]);
        let symbol = Polarity::from_text_hint(&predicate)
            .map(|p| p.symbol())
            .unwrap_or("");
        set.insert(
            next_key,
            Entry {
                line: format!("{} -->{} {}", subject, symbol, object),
                reasoning: optional_field(entry, &["reasoning"]),
                snippet: optional_field(entry, &["relevant text", "snippet"]),
            },
        );
        next_key += 1;
    }
    set
}

fn looks_like_record(value: &Value) -> bool {
    ["cause", "effect", "sign", "direction", "subject", "object"]
        .iter()
        .any(|field| value.get(field).is_some())
}

/// First object field holding a non-empty array of cause/effect records.
fn find_relationship_array(value: &Value) -> Option<&Vec<Value>> {
    let obj = value.as_object()?;
    obj.values().find_map(|v| {
        let array = v.as_array()?;
        let first = array.first()?;
        if ["cause", "effect", "sign", "direction"]
            .iter()
            .any(|field| first.get(field).is_some())
        {
            Some(array)
        } else {
            None
        }
    })
}

fn final_relationships(value: &Value) -> Option<&Vec<Value>> {
    value.get("Step 2")?.get("Final Relationships")?.as_array()
}

/// Relationship string under any of its field spellings.
fn relationship_string(entry: &Value) -> Option<String> {
    for field in ["causal relationship", "relationship", "causal_relationship"] {
        if let Some(s) = entry.get(field).and_then(Value::as_str) {
            return Some(s.to_string());
        }
    }
    None
}

fn field_str(entry: &Value, fields: &[&str]) -> String {
    for field in fields {
        if let Some(s) = entry.get(field).and_then(Value::as_str) {
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    String::new()
}

fn optional_field(entry: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(s) = entry.get(field).and_then(Value::as_str) {
            if !s.trim().is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// Digits embedded in a map key, e.g. `"relationship 2"` -> 2.
fn numeric_key(key: &str) -> Option<u64> {
    let digits: String = key.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
