use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::SqlGateError;

/// Scalar carried by a [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    TimestampMillis(i64),
}

impl Payload {
    /// Encodes the scalar into its wire form.
    ///
    /// Booleans go out as `1`/`0` and timestamps as epoch milliseconds.
    pub(crate) fn encode(&self) -> Result<JsonValue, SqlGateError> {
        match self {
            Self::Null => Ok(JsonValue::Null),
            Self::Int(value) | Self::TimestampMillis(value) => Ok(JsonValue::from(*value)),
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map(JsonValue::Number)
                .ok_or_else(|| {
                    SqlGateError::InvalidParameter(format!(
                        "non-finite float value '{value}' is unsupported"
                    ))
                }),
            Self::String(value) => Ok(JsonValue::String(value.clone())),
            Self::Bool(value) => Ok(JsonValue::from(i64::from(*value))),
        }
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Payload {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<DateTime<Utc>> for Payload {
    fn from(value: DateTime<Utc>) -> Self {
        Self::TimestampMillis(value.timestamp_millis())
    }
}

/// Named SQL parameter bound to a `:name` placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    pub key: String,
    pub payload: Payload,
}

impl Value {
    pub fn new(key: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Payload::Int(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Payload::Float(value))
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Payload::String(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Payload::Bool(value))
    }

    pub fn null(key: impl Into<String>) -> Self {
        Self::new(key, Payload::Null)
    }

    pub fn timestamp(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, Payload::from(value))
    }

    pub fn timestamp_millis(key: impl Into<String>, millis: i64) -> Self {
        Self::new(key, Payload::TimestampMillis(millis))
    }

    /// Binds `Some(v)` as `v` and `None` as an explicit SQL `NULL`.
    pub fn nullable<P: Into<Payload>>(key: impl Into<String>, value: Option<P>) -> Self {
        match value {
            Some(value) => Self::new(key, value),
            None => Self::null(key),
        }
    }

    /// Placeholder name with one leading `:` removed.
    pub(crate) fn placeholder(&self) -> Result<&str, SqlGateError> {
        let name = self.key.strip_prefix(':').unwrap_or(&self.key);
        if name.is_empty() {
            return Err(SqlGateError::InvalidParameter(
                "parameter name cannot be empty".to_owned(),
            ));
        }
        Ok(name)
    }
}
