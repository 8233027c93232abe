//! Lenient field decoders for API payloads.
//!
//! The API is loose about scalar types: flags arrive as `true`, `1` or `"1"`,
//! version numbers sometimes as strings, and unset fields as `null` or `""`.
//! Each helper here is wired to specific fields with `deserialize_with`, so
//! the accepted wire shapes are declared next to the field they apply to.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_bool(self) -> Result<bool, String> {
        match self {
            Scalar::Bool(b) => Ok(b),
            Scalar::Int(n) => Ok(n != 0),
            Scalar::UInt(n) => Ok(n != 0),
            Scalar::Float(f) => Ok(f != 0.0),
            Scalar::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "f" | "false" => Ok(false),
                "1" | "t" | "true" => Ok(true),
                other => Err(format!("invalid boolean {other:?}")),
            },
        }
    }

    fn into_i64(self) -> Result<i64, String> {
        match self {
            Scalar::Bool(b) => Ok(i64::from(b)),
            Scalar::Int(n) => Ok(n),
            Scalar::UInt(n) => i64::try_from(n).map_err(|_| format!("{n} out of range for i64")),
            Scalar::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
            Scalar::Float(f) => Err(format!("invalid integer {f}")),
            Scalar::Str(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(0);
                }
                s.parse().map_err(|_| format!("invalid integer {s:?}"))
            }
        }
    }

    fn into_u64(self) -> Result<u64, String> {
        match self {
            Scalar::Bool(b) => Ok(u64::from(b)),
            Scalar::Int(n) => u64::try_from(n).map_err(|_| format!("{n} out of range for u64")),
            Scalar::UInt(n) => Ok(n),
            Scalar::Float(f) if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 => Ok(f as u64),
            Scalar::Float(f) => Err(format!("invalid unsigned integer {f}")),
            Scalar::Str(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(0);
                }
                s.parse().map_err(|_| format!("invalid unsigned integer {s:?}"))
            }
        }
    }
}

/// `null` decodes as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(false),
        Some(v) => v.into_bool().map_err(D::Error::custom),
    }
}

pub fn flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(0),
        Some(v) => v.into_i64().map_err(D::Error::custom),
    }
}

pub fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(0),
        Some(v) => v.into_u64().map_err(D::Error::custom),
    }
}

/// RFC 3339 timestamp; `null`, `""` and a missing field all mean "never".
pub fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(D::Error::custom),
    }
}
