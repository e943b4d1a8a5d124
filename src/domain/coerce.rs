//! Lenient numeric decoding for values the model may emit as strings.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("number out of range: {number}"))),
        Value::String(text) => parse_float(&text).map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "expected a numeric value, got {other}"
        ))),
    }
}

/// Fractional values are truncated toward zero.
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => match number.as_i64() {
            Some(value) => Ok(value),
            None => number
                .as_f64()
                .ok_or_else(|| format!("number out of range: {number}"))
                .and_then(truncate)
                .map_err(de::Error::custom),
        },
        Value::String(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<i64>() {
                Ok(value) => Ok(value),
                Err(_) => parse_float(trimmed)
                    .and_then(truncate)
                    .map_err(de::Error::custom),
            }
        }
        other => Err(de::Error::custom(format!(
            "expected an integer value, got {other}"
        ))),
    }
}

/// A missing or `null` list decodes as empty.
pub fn users<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn parse_float(text: &str) -> Result<f64, String> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("expected a numeric value, got {trimmed:?}"))
}

fn truncate(value: f64) -> Result<i64, String> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
        Ok(truncated as i64)
    } else {
        Err(format!("integer out of range: {value}"))
    }
}
