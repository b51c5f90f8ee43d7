// 🌐 Label Diff - Which languages did an item edit add?
//
// Item content is serialized JSON with a "labels" map:
//   {"labels": {"en": {"language": "en", "value": "A"}}}
// The flat form {"labels": {"en": "A"}} is accepted as well, and an empty
// label set may be serialized as [].

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub type LabelMap = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum LabelParseError {
    #[error("content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("content is not a JSON object")]
    NotAnObject,

    #[error("labels field has unexpected shape")]
    BadLabels,

    #[error("label for {0} has no text value")]
    BadLabel(String),
}

/// Extract the language → text label map from serialized item content.
/// Empty content (no prior version) yields an empty map.
pub fn parse_labels(content: &str) -> Result<LabelMap, LabelParseError> {
    if content.trim().is_empty() {
        return Ok(LabelMap::new());
    }

    let document: Value = serde_json::from_str(content)?;
    let object = document.as_object().ok_or(LabelParseError::NotAnObject)?;

    let labels = match object.get("labels") {
        None | Some(Value::Null) => return Ok(LabelMap::new()),
        Some(Value::Array(items)) if items.is_empty() => return Ok(LabelMap::new()),
        Some(Value::Object(labels)) => labels,
        Some(_) => return Err(LabelParseError::BadLabels),
    };

    let mut map = LabelMap::new();
    for (language, label) in labels {
        let text = match label {
            Value::String(text) => text.clone(),
            Value::Object(inner) => inner
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| LabelParseError::BadLabel(language.clone()))?
                .to_string(),
            _ => return Err(LabelParseError::BadLabel(language.clone())),
        };
        map.insert(language.clone(), text);
    }

    Ok(map)
}

/// Language codes present in `new` but not in `old`, sorted
pub fn added_languages(old: &LabelMap, new: &LabelMap) -> BTreeSet<String> {
    new.keys()
        .filter(|language| !old.contains_key(*language))
        .cloned()
        .collect()
}

/// Parse both revisions and diff their label keys
pub fn diff_labels(old_content: &str, new_content: &str) -> Result<BTreeSet<String>, LabelParseError> {
    let old = parse_labels(old_content)?;
    let new = parse_labels(new_content)?;
    Ok(added_languages(&old, &new))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flat_label_diff() {
        let old = r#"{"labels": {"en": "A"}}"#;
        let new = r#"{"labels": {"en": "A", "fr": "B", "de": "C"}}"#;

        assert_eq!(diff_labels(old, new).unwrap(), set(&["de", "fr"]));
    }

    #[test]
    fn test_nested_label_form() {
        let content = r#"{"type": "item", "id": "Q1", "labels": {
            "en": {"language": "en", "value": "Archive"},
            "es": {"language": "es", "value": "Archivo"}
        }}"#;

        let labels = parse_labels(content).unwrap();
        assert_eq!(labels.get("es").map(String::as_str), Some("Archivo"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_changed_text_is_not_an_addition() {
        let old = r#"{"labels": {"en": "A"}}"#;
        let new = r#"{"labels": {"en": "B"}}"#;
        assert!(diff_labels(old, new).unwrap().is_empty());
    }

    #[test]
    fn test_removed_language_is_ignored() {
        let old = r#"{"labels": {"en": "A", "fr": "B"}}"#;
        let new = r#"{"labels": {"en": "A", "it": "C"}}"#;
        assert_eq!(diff_labels(old, new).unwrap(), set(&["it"]));
    }

    #[test]
    fn test_empty_and_missing_labels() {
        assert!(parse_labels("").unwrap().is_empty());
        assert!(parse_labels(r#"{"labels": []}"#).unwrap().is_empty());
        assert!(parse_labels(r#"{"claims": {}}"#).unwrap().is_empty());
        assert_eq!(diff_labels("", r#"{"labels": {"en": "A"}}"#).unwrap(), set(&["en"]));
    }

    #[test]
    fn test_malformed_content() {
        assert!(matches!(parse_labels("{not json"), Err(LabelParseError::Json(_))));
        assert!(matches!(parse_labels("[1, 2]"), Err(LabelParseError::NotAnObject)));
        assert!(matches!(
            parse_labels(r#"{"labels": "en"}"#),
            Err(LabelParseError::BadLabels)
        ));
        assert!(matches!(
            parse_labels(r#"{"labels": {"en": 5}}"#),
            Err(LabelParseError::BadLabel(_))
        ));
    }
}
