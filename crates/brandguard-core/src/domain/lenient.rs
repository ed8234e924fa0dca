//! Tolerant field decoders for agent-reported JSON.
//!
//! Only the fields that schema validation inspects decide whether a bundle is
//! usable. Informational fields that arrive with the wrong shape decode to
//! their default instead of rejecting the whole bundle.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::claim::ClaimVerification;

/// Decode `T`, or fall back to `T::default()` when the value has the wrong shape.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// A 0-255 score from any JSON number; fractional scores round to nearest.
pub(crate) fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value.as_f64() {
        Some(n) if n.is_finite() => n.round().clamp(0.0, f64::from(u8::MAX)) as u8,
        _ => 0,
    })
}

/// A non-negative count from any JSON number.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as usize,
        _ => 0,
    })
}

/// Hashtags as a list, or a single whitespace-separated string.
pub(crate) fn hashtags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Image slots keyed by channel. Non-string entries become empty slots.
pub(crate) fn images<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(channel, slot)| match slot {
                Value::String(path) => (channel, Some(path)),
                _ => (channel, None),
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}

/// Free text. Non-string values keep their JSON rendering.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(render(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(render(Value::deserialize(deserializer)?))
}

fn render(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// A keyed section. Entries with the wrong shape decode to `T::default()`;
/// a section that is not an object decodes to `None`.
pub(crate) fn sections<'de, D, T>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => Some(
            map.into_iter()
                .map(|(key, entry)| (key, T::deserialize(entry).unwrap_or_default()))
                .collect(),
        ),
        _ => None,
    })
}

/// A list where entries with the wrong shape are dropped.
pub(crate) fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Claims table. A bare string entry is an unverified claim.
pub(crate) fn claims_table<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<ClaimVerification>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(claim) => Some(ClaimVerification::unsupported(claim)),
                    other => ClaimVerification::deserialize(other).ok(),
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Parse RFC 3339, or an offset-less ISO 8601 timestamp taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Timestamp field. Missing or unparseable values record the time of decoding.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now))
}

pub(crate) fn optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_iso_timestamps_are_utc() {
        let parsed = parse_timestamp("2026-01-01T00:00:01.123456").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-01-01T00:00:01.123456+00:00");
    }

    #[test]
    fn offset_timestamps_are_normalised() {
        let parsed = parse_timestamp("2026-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
