//! Lenient deserializers for form-style JSON.
//!
//! Browser forms post every input as a string, so `"5000"`, `5000` and `""`
//! all arrive for the same numeric field. These helpers accept all three and
//! map blank strings to `None`. Use them with
//! `#[serde(default, deserialize_with = "...")]`.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<NumberOrString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => None,
        other => other,
    })
}

/// Accepts a number, a numeric string, a blank string or `null`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_blank(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("'{s}' is not a number"))),
    }
}

/// Like [`lenient_f64`] but requires a non-negative whole number.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_f64(deserializer)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(Some(n as u32)),
        Some(n) => Err(D::Error::custom(format!(
            "{n} is not a non-negative whole number"
        ))),
    }
}

/// Parses an optional enum from its string form; blank strings become `None`.
pub fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<T>().map(Some).map_err(D::Error::custom),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM` (first of the month), blank or `null`.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_month_or_date(s.trim())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("'{s}' is not a date (YYYY-MM-DD)"))),
    }
}

/// Parses `YYYY-MM-DD` or `YYYY-MM`.
pub fn parse_month_or_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok())
}

/// Serializes `None` as an empty JSON object instead of `null`.
pub fn none_as_empty_object<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Reads back what [`none_as_empty_object`] wrote: `{}` and `null` are `None`.
pub fn empty_object_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        _ => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
    }
}
