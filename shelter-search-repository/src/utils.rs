//! Utility functions for the search index repository.

use serde_json::{Map, Value};

const HIGHLIGHT_RESULT_KEY: &str = "_highlightResult";

/// Build the highlighted projection of a raw hit.
///
/// For each field, takes the highlighted fragment the provider returned under
/// `_highlightResult.<field>.value`, or the raw value of the field when there
/// is no fragment. Fields missing from the hit are `null`.
///
/// # Arguments
///
/// * `hit` - A raw hit as returned by the provider
/// * `fields` - The searchable fields of the index
///
/// # Returns
///
/// A JSON object with exactly one key per field.
pub fn highlight_projection(hit: &Value, fields: &[&str]) -> Value {
    let fragments = hit.get(HIGHLIGHT_RESULT_KEY);

    let projection: Map<String, Value> = fields
        .iter()
        .map(|field| {
            let value = fragments
                .and_then(|fragments| fragments.get(*field))
                .and_then(|fragment| fragment.get("value"))
                .or_else(|| hit.get(*field))
                .cloned()
                .unwrap_or(Value::Null);
            (field.to_string(), value)
        })
        .collect();

    Value::Object(projection)
}
