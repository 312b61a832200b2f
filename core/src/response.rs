//! Response validation and lenient field access.
//!
//! Balikobot reports failures twice: through the HTTP status and through a
//! `status` field in the JSON body (top level, and once more per package for
//! batch endpoints). These helpers turn both into `BalikobotError::BadRequest`
//! and read optional fields without failing on absent or oddly typed values.

use serde_json::{Map, Value};

use crate::error::{BalikobotError, Result};
use crate::http::HttpResponse;

/// Decode a response body after checking the HTTP status and, when
/// `should_have_status` is set, the body `status` field.
pub(crate) fn decode(response: &HttpResponse, should_have_status: bool) -> Result<Value> {
    if response.status != 200 {
        tracing::warn!(status = response.status, "balikobot rejected request");
        return Err(BalikobotError::bad_request(response.status));
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|e| BalikobotError::Deserialization(e.to_string()))?;

    if !body.is_object() {
        return Err(BalikobotError::bad_request(500));
    }

    match status_of(&body) {
        Some(200) => {}
        Some(status) => {
            tracing::warn!(status, "balikobot response status is not OK");
            return Err(BalikobotError::bad_request(status));
        }
        None if should_have_status => {
            tracing::warn!("balikobot response has no valid status");
            return Err(BalikobotError::bad_request(500));
        }
        None => {}
    }

    Ok(body)
}

/// Numeric `status` of a response object, accepting `200` as well as `"200"`.
pub(crate) fn status_of(value: &Value) -> Option<u16> {
    match value.get("status")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Fail when a per-package entry carries a non-200 status. Entries without a
/// status are accepted.
pub(crate) fn check_item_status(item: &Value) -> Result<()> {
    match status_of(item) {
        Some(200) | None => Ok(()),
        Some(status) => {
            tracing::warn!(status, "balikobot rejected package");
            Err(BalikobotError::bad_request(status))
        }
    }
}

/// Entries of the `packages` field re-associated by position.
///
/// Balikobot returns either a JSON array or an object keyed `"0"`, `"1"`, ...
/// Every position in `0..expected` must be present and nothing beyond it.
pub(crate) fn packages_by_position(body: &Value, expected: usize) -> Result<Vec<&Value>> {
    let packages = body.get("packages");
    let received = match packages {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(items)) => items.len(),
        _ => 0,
    };
    if received > expected {
        tracing::warn!(expected, received, "balikobot response has surplus packages");
        return Err(BalikobotError::bad_request(500));
    }
    (0..expected)
        .map(|index| {
            let item = match packages {
                Some(Value::Array(items)) => items.get(index),
                Some(Value::Object(items)) => items.get(&index.to_string()),
                _ => None,
            };
            item.ok_or_else(|| {
                tracing::warn!(index, "balikobot response misses package");
                BalikobotError::bad_request(500)
            })
        })
        .collect()
}

/// String field that may be encoded as a JSON string or number.
pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    value_to_string(value.get(key)?)
}

/// Like `string_field`, but missing values become an empty string.
pub(crate) fn string_or_empty(value: &Value, key: &str) -> String {
    string_field(value, key).unwrap_or_default()
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Float field that may be encoded as a JSON number or numeric string.
pub(crate) fn f64_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// List of strings; scalars are wrapped, missing values give an empty list.
pub(crate) fn string_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
        Some(other) => value_to_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Object field, or `None` when absent or not an object.
pub(crate) fn object_field<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key)?.as_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> HttpResponse {
        HttpResponse::json(status, &body)
    }

    #[test]
    fn decode_rejects_http_error() {
        let err = decode(&response(400, json!({"status": 200})), true).unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 400, .. }));
    }

    #[test]
    fn decode_requires_status_when_asked() {
        let err = decode(&response(200, json!({})), true).unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 500, .. }));
        assert!(decode(&response(200, json!({})), false).is_ok());
    }

    #[test]
    fn decode_rejects_bad_body_status() {
        let err = decode(&response(200, json!({"status": 400})), true).unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 400, .. }));
    }

    #[test]
    fn decode_accepts_string_status() {
        assert!(decode(&response(200, json!({"status": "200"})), true).is_ok());
    }

    #[test]
    fn decode_rejects_non_json_body() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "<html>".to_string(),
        };
        let err = decode(&response, true).unwrap_err();
        assert!(matches!(err, BalikobotError::Deserialization(_)));
    }

    #[test]
    fn packages_by_position_reads_keyed_objects() {
        let body = json!({"packages": {"1": {"carrier_id": "b"}, "0": {"carrier_id": "a"}}});
        let packages = packages_by_position(&body, 2).unwrap();
        assert_eq!(packages[0]["carrier_id"], "a");
        assert_eq!(packages[1]["carrier_id"], "b");
    }

    #[test]
    fn packages_by_position_fails_on_missing_entry() {
        let body = json!({"packages": [{"carrier_id": "a"}]});
        let err = packages_by_position(&body, 2).unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 500, .. }));
    }

    #[test]
    fn packages_by_position_rejects_surplus_entries() {
        let body = json!({"packages": [{"carrier_id": "a"}, {"carrier_id": "b"}]});
        let err = packages_by_position(&body, 1).unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 500, .. }));

        let body = json!({"packages": {"0": {"carrier_id": "a"}, "1": {"carrier_id": "b"}}});
        assert!(packages_by_position(&body, 1).is_err());
    }

    #[test]
    fn string_field_accepts_numbers() {
        let data = json!({"package_id": 1234, "carrier_id": "02IID"});
        assert_eq!(string_field(&data, "package_id").as_deref(), Some("1234"));
        assert_eq!(string_field(&data, "carrier_id").as_deref(), Some("02IID"));
        assert_eq!(string_field(&data, "missing"), None);
    }

    #[test]
    fn string_list_wraps_scalars() {
        let data = json!({"pieces": [1, "2"], "single": "x"});
        assert_eq!(string_list(&data, "pieces"), vec!["1", "2"]);
        assert_eq!(string_list(&data, "single"), vec!["x"]);
        assert!(string_list(&data, "none").is_empty());
    }
}
