use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

/// Truthiness the backend's consumers have always relied on: `null`, `false`, `0`, `""` are empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn truthy<'a>(group: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    group.get(key).filter(|value| is_truthy(value))
}

pub fn object_at<'a>(group: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    group.get(key).and_then(Value::as_object)
}

pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

pub fn number_at(group: &Map<String, Value>, key: &str) -> f64 {
    group.get(key).map(number).unwrap_or(0.0)
}

pub fn count(value: &Value) -> u64 {
    let v = number(value);
    if v <= 0.0 {
        0
    } else {
        v.round() as u64
    }
}

pub fn count_at(group: &Map<String, Value>, key: &str) -> u64 {
    group.get(key).map(count).unwrap_or(0)
}

pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => {
            let items = string_list(value);
            (!items.is_empty()).then(|| items.join("، "))
        }
        _ => None,
    }
}

pub fn text_at(group: &Map<String, Value>, key: &str) -> Option<String> {
    group.get(key).and_then(text)
}

pub fn text_or(group: &Map<String, Value>, key: &str, fallback: &str) -> String {
    text_at(group, key).unwrap_or_else(|| fallback.to_string())
}

pub fn bool_at(group: &Map<String, Value>, key: &str) -> bool {
    group.get(key).map(is_truthy).unwrap_or(false)
}

/// Collapses array, object, delimited string, or scalar into a list of non-empty strings.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(item_text).collect(),
        Value::Object(map) => map.values().filter_map(item_text).collect(),
        Value::String(text) => split_names(text),
        Value::Number(_) | Value::Bool(true) => item_text(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

pub fn string_list_at(group: &Map<String, Value>, key: &str) -> Vec<String> {
    group.get(key).map(string_list).unwrap_or_default()
}

fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(item_text).collect();
            (!parts.is_empty()).then(|| parts.join("، "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(key, value)| item_text(value).map(|v| format!("{key}: {v}")))
                .collect();
            (!parts.is_empty()).then(|| parts.join("، "))
        }
        Value::Null => None,
    }
}

/// Splits on both the Latin and the Arabic comma.
pub fn split_names(text: &str) -> Vec<String> {
    text.split([',', '،'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// An object passes through; an array of objects is merged left to right.
pub fn merged_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::Array(items) => {
            let mut merged = Map::new();
            for item in items {
                if let Value::Object(map) = item {
                    for (key, value) in map {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            merged
        }
        _ => Map::new(),
    }
}

/// `{name: count}` objects, or arrays of `{نام|name, تعداد|count}` records.
pub fn count_map(value: &Value) -> Vec<(String, u64)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), count(value)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let record = item.as_object()?;
                let name = first_text(record, &[crate::fields::NAME, "name"])?;
                let value = first_count(
                    record,
                    &[crate::fields::COUNT, crate::fields::CALL_COUNT, "count"],
                );
                Some((name, value))
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text_at(record, key))
}

pub fn first_count(record: &Map<String, Value>, keys: &[&str]) -> u64 {
    keys.iter()
        .map(|key| count_at(record, key))
        .find(|value| *value > 0)
        .unwrap_or(0)
}

/// Accepts ISO-8601 (naive or offset) and RFC 2822 / HTTP-date timestamps.
pub fn timestamp(value: &Value) -> Option<NaiveDateTime> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|parsed| parsed.naive_utc())
}

pub fn timestamp_at(group: &Map<String, Value>, key: &str) -> Option<NaiveDateTime> {
    group.get(key).and_then(timestamp)
}
