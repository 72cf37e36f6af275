//! camelCase / snake_case conversion for JSON object keys.
//!
//! Only keys are rewritten; string values pass through untouched.

use serde_json::{Map, Value};

/// `userId` -> `user_id`. A run of capitals stays together: `userID` -> `user_id`.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c.is_uppercase() {
            if matches!(prev, Some(p) if p.is_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// `user_id` -> `userId`. Leading and trailing underscores are kept.
pub fn snake_to_camel(key: &str) -> String {
    let rest = key.trim_start_matches('_');
    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..key.len() - rest.len()]);
    let mut upper_next = false;
    for c in rest.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    if upper_next {
        out.push('_');
    }
    out
}

pub fn keys_to_snake(value: Value) -> Value {
    map_keys(value, &camel_to_snake)
}

pub fn keys_to_camel(value: Value) -> Value {
    map_keys(value, &snake_to_camel)
}

fn map_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (rename(&key), map_keys(value, rename)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_keys(item, rename)).collect())
        }
        other => other,
    }
}
