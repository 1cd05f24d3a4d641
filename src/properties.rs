use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

/// Property key holding the feature's stable id.
pub const ID_KEY: &str = "_id";
/// Property key recording the draw mode a feature was created with.
pub const DRAW_MODE_KEY: &str = "drawMode";

/// Internal bookkeeping keys, never exposed through the user-facing
/// property API. Membership is checked explicitly, never by prefix.
pub const RESERVED_PROPERTY_KEYS: [&str; 2] = [ID_KEY, DRAW_MODE_KEY];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_PROPERTY_KEYS.contains(&key)
}

/// Errors produced when validating a new user property key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyKeyError {
    #[error("property key is empty")]
    EmptyKey,
    #[error("property key `{0}` is reserved")]
    ReservedKey(String),
    #[error("property key `{0}` already exists")]
    DuplicateKey(String),
}

/// The user-editable view of a property bag: every non-reserved entry,
/// with values stringified (null becomes the empty string).
pub fn user_properties(properties: &Map<String, Value>) -> BTreeMap<String, String> {
    properties
        .iter()
        .filter(|(key, _)| !is_reserved_key(key))
        .map(|(key, value)| (key.clone(), stringify_value(value)))
        .collect()
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rebuild a property bag from a user-edited map: reserved keys keep their
/// current values, then `user` is overlaid.
///
/// A reserved key supplied inside `user` wins over the copied value. That
/// matches the behavior callers already rely on; sanitize input through
/// [`user_properties`] first if that matters.
pub fn merge_user_properties(
    existing: &Map<String, Value>,
    user: &BTreeMap<String, String>,
) -> Map<String, Value> {
    let mut merged = Map::new();
    for key in RESERVED_PROPERTY_KEYS {
        if let Some(value) = existing.get(key) {
            merged.insert(key.to_owned(), value.clone());
        }
    }
    for (key, value) in user {
        merged.insert(key.clone(), Value::String(value.clone()));
    }
    merged
}

/// Validate a new user property key against the reserved set and the keys
/// already present on the feature.
pub fn validate_property_key(key: &str, existing_keys: &[String]) -> Result<(), PropertyKeyError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(PropertyKeyError::EmptyKey);
    }
    if is_reserved_key(trimmed) {
        return Err(PropertyKeyError::ReservedKey(trimmed.to_owned()));
    }
    if existing_keys.iter().any(|k| k == trimmed) {
        return Err(PropertyKeyError::DuplicateKey(trimmed.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn user_properties_hides_reserved_keys_and_stringifies() {
        let props = bag(json!({
            "_id": "f1",
            "drawMode": "point",
            "name": "Tokyo Station",
            "floors": 3,
            "note": null
        }));
        let user = user_properties(&props);
        assert_eq!(user.len(), 3);
        assert_eq!(user["name"], "Tokyo Station");
        assert_eq!(user["floors"], "3");
        assert_eq!(user["note"], "");
    }

    #[test]
    fn merge_keeps_internal_keys() {
        let existing = bag(json!({"_id": "f1", "drawMode": "line", "old": "x"}));
        let mut user = BTreeMap::new();
        user.insert("name".to_owned(), "river".to_owned());

        let merged = merge_user_properties(&existing, &user);
        assert_eq!(merged.get("_id"), Some(&json!("f1")));
        assert_eq!(merged.get("drawMode"), Some(&json!("line")));
        assert_eq!(merged.get("name"), Some(&json!("river")));
        // dropped: not reserved, not in the user map
        assert!(!merged.contains_key("old"));
    }

    #[test]
    fn merge_lets_user_map_overwrite_reserved_keys() {
        // Documented sharp edge: a hostile user map wins.
        let existing = bag(json!({"_id": "f1"}));
        let mut user = BTreeMap::new();
        user.insert("_id".to_owned(), "evil".to_owned());
        let merged = merge_user_properties(&existing, &user);
        assert_eq!(merged.get("_id"), Some(&json!("evil")));
    }

    #[test]
    fn validate_rejects_empty_reserved_and_duplicate_keys() {
        let existing = vec!["name".to_owned()];
        assert_eq!(
            validate_property_key("   ", &existing),
            Err(PropertyKeyError::EmptyKey)
        );
        assert_eq!(
            validate_property_key("drawMode", &existing),
            Err(PropertyKeyError::ReservedKey("drawMode".to_owned()))
        );
        assert_eq!(
            validate_property_key("name", &existing),
            Err(PropertyKeyError::DuplicateKey("name".to_owned()))
        );
        assert_eq!(validate_property_key("color", &existing), Ok(()));
    }
}
