//! JSON extraction helpers for autosuggest responses and embedded metadata.
//!
//! Paths use dot notation. Array elements are addressed by index, so
//! `"author.0.name"` walks into the first element of an `author` array.
//!
//! # Examples
//!
//! ```rust
//! use hondana::net::json;
//! use serde_json::json;
//!
//! let data = json!({
//!     "suggestions": [
//!         {"value": "One Piece", "data": "one-piece"},
//!         {"value": "One Punch Man", "data": "one-punch-man"}
//!     ]
//! });
//!
//! let suggestions = json::extract_array(&data, "suggestions");
//! assert_eq!(suggestions.len(), 2);
//! assert_eq!(json::extract_str(&data, "suggestions.1.data"), Some("one-punch-man".to_string()));
//! ```

use serde_json::Value;

/// Extracts a value from nested JSON using dot notation.
///
/// Returns `None` if any part of the path doesn't exist.
pub fn extract_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;

    for key in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => current.get(key)?,
        };
    }

    Some(current)
}

/// Extracts a string from a nested JSON path.
///
/// Numbers are rendered to strings; other value kinds yield `None`.
pub fn extract_str(json: &Value, path: &str) -> Option<String> {
    match extract_path(json, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts an array from a nested JSON path.
///
/// Returns an empty vector if the path doesn't exist or isn't an array.
pub fn extract_array(json: &Value, path: &str) -> Vec<Value> {
    extract_path(json, path)
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}
