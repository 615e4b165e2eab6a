//! Canonicalization of values the backend may send in more than one shape.
//!
//! Older records arrive with ids as `{"$oid": "..."}` and dates as
//! `{"$date": "..."}` (or `{"$date": {"$numberLong": "..."}}`). Everything
//! past the deserialization boundary sees plain strings only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Plain string id for either encoding. Anything unrecognized becomes `""`.
pub fn normalize_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        },
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Plain date string for either encoding, `None` when absent or empty.
pub fn normalize_date(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("$date") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(inner)) => inner
                .get("$numberLong")
                .and_then(|v| match v {
                    Value::String(s) => s.parse::<i64>().ok(),
                    Value::Number(n) => n.as_i64(),
                    _ => None,
                })
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            _ => None,
        },
        _ => None,
    };
    raw.filter(|s| !s.is_empty())
}

/// Calendar day (UTC) of an ISO-8601 date or timestamp. Time of day is dropped.
pub fn calendar_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// `YYYY-MM-DD` form used by date inputs; unparseable input yields `""`.
pub fn to_input_date(raw: &str) -> String {
    calendar_day(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_id(&value))
}

pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| normalize_id(&v)).filter(|s| !s.is_empty()))
}

pub fn de_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .iter()
        .map(normalize_id)
        .filter(|s| !s.is_empty())
        .collect())
}

pub fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(normalize_date))
}
