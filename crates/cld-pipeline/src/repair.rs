//! Recover a JSON structure from arbitrary Reasoner output
//!
//! Models wrap JSON in markdown fences, prepend commentary, or trail off
//! into prose. Repair tries a sequence of strategies and reports failure as
//! `None`; callers treat `None` as "nothing extracted" or trigger a reformat
//! request, never a crash.

use serde_json::Value;

/// Attempt to recover a JSON value from arbitrary text.
///
/// Strategies, in priority order, stopping at the first success:
///
/// 1. parse the contents of a fenced block labeled `json`
/// 2. parse the entire string
/// 3. parse the substring between the first `{` and the last `}`
///
/// # Examples
///
/// ```
/// use cld_pipeline::repair_json;
///
/// let fenced = "Here you go:\n```json\n{\"a\": 1}\n```\nHope that helps!";
/// assert!(repair_json(fenced).is_some());
///
/// let prose = "Sure! {\"a\": 1} as requested.";
/// assert!(repair_json(prose).is_some());
///
/// assert!(repair_json("no json here").is_none());
/// ```
pub fn repair_json(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }

    if let Some(inner) = fenced_json_block(text) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Some(value);
        }
    }

    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Some(value);
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last <= first {
        return None;
    }
    serde_json::from_str(&text[first..=last]).ok()
}

/// Find the contents of a ```json fenced block, if any.
fn fenced_json_block(text: &str) -> Option<&str> {
    let lower = text.to_lowercase();
    let start = lower.find("```json")?;
    let body_start = start + "```json".len();
    let rest = &text[body_start..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_object() {
        let value = repair_json(r#"{"causalRelationships": []}"#).unwrap();
        assert!(value.get("causalRelationships").is_some());
    }

    #[test]
    fn test_fenced_block() {
        let text = "```json\n{\"1\": {\"causal relationship\": \"a -->(+) b\"}}\n```";
        let value = repair_json(text).unwrap();
        assert!(value.get("1").is_some());
    }

    #[test]
    fn test_fenced_block_case_insensitive() {
        let text = "```JSON\n{\"x\": 1}\n```";
        assert!(repair_json(text).is_some());
    }

    #[test]
    fn test_fenced_block_with_surrounding_prose() {
        let text = "Sure, here is the result:\n```json\n{\"x\": 1}\n```\nLet me know!";
        let value = repair_json(text).unwrap();
        assert_eq!(value["x"], 1);
    }

    #[test]
    fn test_leading_and_trailing_commentary() {
        let text = "The relationships are: {\"1\": {\"causal relationship\": \"a -->(-) b\"}} as shown.";
        let value = repair_json(text).unwrap();
        assert!(value.get("1").is_some());
    }

    #[test]
    fn test_broken_fence_falls_through_to_brace_scan() {
        // Fence content is truncated mid-object, but the braces still pair
        // up inside the full text.
        let text = "```json\n{\"a\": {\"b\": 1}}";
        assert!(repair_json(text).is_some());
    }

    #[test]
    fn test_unrepairable_text() {
        assert!(repair_json("This is not JSON at all").is_none());
        assert!(repair_json("").is_none());
        assert!(repair_json("   ").is_none());
    }

    #[test]
    fn test_truncated_json_is_none() {
        assert!(repair_json(r#"{"causalRelationships": [{"subject": "a""#).is_none());
    }

    #[test]
    fn test_array_parses_whole_string() {
        let value = repair_json(r#"[{"cause": "a", "effect": "b"}]"#).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_empty_object_is_valid() {
        let value = repair_json("{}").unwrap();
        assert!(value.as_object().map(|o| o.is_empty()).unwrap_or(false));
    }
}
