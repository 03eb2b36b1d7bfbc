use serde::Serialize;
use serde_json::Value;

/// Case-insensitive containment search over a record's serialized form.
///
/// The source system's search box matches a keyword against any field of the
/// document, however deeply nested, so the check recurses through arrays and
/// objects; numbers and booleans participate via their display form. An empty
/// keyword matches everything.
pub fn record_matches<T: Serialize>(record: &T, keyword: &str) -> bool {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    match serde_json::to_value(record) {
        Ok(value) => value_contains(&value, &needle),
        Err(_) => false,
    }
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => flag.to_string().contains(needle),
        Value::Number(number) => number.to_string().contains(needle),
        Value::String(text) => text.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|item| value_contains(item, needle)),
        Value::Object(map) => map.values().any(|item| value_contains(item, needle)),
    }
}
