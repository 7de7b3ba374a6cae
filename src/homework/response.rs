//! Response shape validation for the homework status endpoint.

use serde_json::Value;

use crate::error::ValidationError;
use crate::homework::types::ReviewItem;

const HOMEWORKS_KEY: &str = "homeworks";
const CURRENT_DATE_KEY: &str = "current_date";

/// JSON type name for error messages
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check the response shape and return its homeworks, newest first.
///
/// An empty list is a valid answer meaning nothing changed yet.
pub fn validate(raw: &Value) -> Result<Vec<ReviewItem>, ValidationError> {
    let object = raw.as_object().ok_or_else(|| {
        let err = ValidationError::Shape(type_name(raw));
        log::error!("{}", err);
        err
    })?;

    let homeworks = object.get(HOMEWORKS_KEY).ok_or_else(|| {
        let err = ValidationError::MissingKey(HOMEWORKS_KEY);
        log::error!("{}", err);
        err
    })?;

    let entries = homeworks.as_array().ok_or_else(|| {
        let err = ValidationError::Type {
            key: HOMEWORKS_KEY,
            expected: "array",
            found: type_name(homeworks),
        };
        log::error!("{}", err);
        err
    })?;

    let items = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(map) => Ok(ReviewItem {
                homework_name: map.get("homework_name").and_then(Value::as_str).map(str::to_string),
                status: map.get("status").and_then(Value::as_str).map(str::to_string),
            }),
            other => Err(ValidationError::Item {
                index,
                found: type_name(other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| log::error!("{}", e))?;

    log::info!("Received {} homework record(s)", items.len());
    Ok(items)
}

/// Server timestamp to use as the next `from_date`, if present and integral.
pub fn resume_marker(raw: &Value) -> Option<i64> {
    let marker = raw.get(CURRENT_DATE_KEY).and_then(Value::as_i64);
    if marker.is_none() {
        log::warn!("Response has no integer '{}', keeping previous marker", CURRENT_DATE_KEY);
    }
    marker
}
