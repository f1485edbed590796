//! JSON helpers for stored-procedure results

use serde_json::{Map, Value};

/// Expand dotted keys (`HUB_CUSTOMER.PK_CUSTOMER_ID`) into nested objects.
///
/// Arrays are walked so every object element is expanded too. Keys are
/// processed in sorted order; a later scalar overwrites an earlier object
/// under the same segment.
pub fn to_nested_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(nest_object(map)),
        Value::Array(items) => Value::Array(nest_array(items)),
        other => other,
    }
}

fn nest_array(items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Value::Object(nest_object(map)),
            other => other,
        })
        .collect()
}

fn nest_object(input: Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<(String, Value)> = input.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = Map::new();
    for (key, value) in entries {
        let value = match value {
            Value::Array(items) => Value::Array(nest_array(items)),
            other => other,
        };

        let segments: Vec<&str> = key.split('.').collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut current = &mut result;
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made an object"),
            };
        }
        current.insert(last.to_string(), value);
    }

    result
}

/// True when the raw result parses to a non-empty object or array
pub fn has_json_value(raw: &str) -> bool {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => !map.is_empty(),
        Ok(Value::Array(items)) => !items.is_empty(),
        _ => false,
    }
}

/// True when the string is a JSON object or array (bracketed and parsable)
pub fn valid_json(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }

    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));

    bracketed && serde_json::from_str::<Value>(trimmed).is_ok()
}

/// Error message carried in a failed result: the `message` field of a JSON
/// object, otherwise the raw text.
pub fn parse_message(raw: &str) -> String {
    if !valid_json(raw) {
        return raw.to_string();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => raw.to_string(),
            Some(other) => other.to_string(),
        },
        _ => raw.to_string(),
    }
}
