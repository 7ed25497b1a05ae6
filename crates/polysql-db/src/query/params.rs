//! Parameter carriers handed to the driver alongside the SQL text.
//!
//! Native drivers take a flat, ordered list of [`Value`]s. Data API drivers
//! take named [`SqlParameter`]s whose values are wrapped in a type tag
//! ([`TypedValue`]) chosen from the field's declared type.

use polysql_core::{SqlError, SqlResult};

use crate::fields::ValueKind;
use crate::value::Value;

/// A type-tagged Data API value.
///
/// Serializes to the wire shape the Data API expects, e.g.
/// `{"longValue": 42}` or `{"isNull": true}`. Blobs travel base64-encoded.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedValue {
    /// `{"isNull": true}`
    IsNull(bool),
    /// `{"booleanValue": ..}`
    BooleanValue(bool),
    /// `{"longValue": ..}`
    LongValue(i64),
    /// `{"doubleValue": ..}`
    DoubleValue(f64),
    /// `{"stringValue": ..}`
    StringValue(String),
    /// `{"blobValue": "<base64>"}`
    BlobValue(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl TypedValue {
    /// Wraps a value under the given kind.
    ///
    /// NULL always becomes `isNull`. Values of a different shape are
    /// converted when the conversion is lossless (`"42"` on a long field,
    /// `true` on a long field as `1`); anything else is an
    /// [`SqlError::InvalidValue`].
    pub fn wrap(kind: ValueKind, value: Value) -> SqlResult<Self> {
        if value.is_null() {
            return Ok(Self::IsNull(true));
        }
        match kind {
            ValueKind::Boolean => match value {
                Value::Bool(b) => Ok(Self::BooleanValue(b)),
                Value::Int(i) => Ok(Self::BooleanValue(i != 0)),
                Value::String(ref s) => match s.to_lowercase().as_str() {
                    "true" | "1" => Ok(Self::BooleanValue(true)),
                    "false" | "0" => Ok(Self::BooleanValue(false)),
                    _ => Err(mismatch("booleanValue", &value)),
                },
                other => Err(mismatch("booleanValue", &other)),
            },
            ValueKind::Long => match value {
                Value::Int(i) => Ok(Self::LongValue(i)),
                Value::Bool(b) => Ok(Self::LongValue(i64::from(b))),
                Value::String(ref s) => s
                    .trim()
                    .parse()
                    .map(Self::LongValue)
                    .map_err(|_| mismatch("longValue", &value)),
                other => Err(mismatch("longValue", &other)),
            },
            ValueKind::Double => match value {
                Value::Float(f) => Ok(Self::DoubleValue(f)),
                Value::Int(i) => Ok(Self::DoubleValue(i as f64)),
                Value::String(ref s) => s
                    .trim()
                    .parse()
                    .map(Self::DoubleValue)
                    .map_err(|_| mismatch("doubleValue", &value)),
                other => Err(mismatch("doubleValue", &other)),
            },
            ValueKind::Blob => match value {
                Value::Bytes(b) => Ok(Self::BlobValue(b)),
                Value::String(s) => Ok(Self::BlobValue(s.into_bytes())),
                other => Err(mismatch("blobValue", &other)),
            },
            ValueKind::String => match value {
                Value::Bytes(_) => Err(mismatch("stringValue", &value)),
                Value::String(s) => Ok(Self::StringValue(s)),
                other => Ok(Self::StringValue(other.to_string())),
            },
        }
    }

    /// Picks a kind from the shape of the value itself.
    ///
    /// Used when no field type is available to choose one.
    pub const fn infer_kind(value: &Value) -> ValueKind {
        match value {
            Value::Bool(_) => ValueKind::Boolean,
            Value::Int(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Double,
            Value::Bytes(_) => ValueKind::Blob,
            _ => ValueKind::String,
        }
    }

    /// Unwraps the tag back into a [`Value`].
    pub fn into_value(self) -> Value {
        match self {
            Self::IsNull(_) => Value::Null,
            Self::BooleanValue(b) => Value::Bool(b),
            Self::LongValue(i) => Value::Int(i),
            Self::DoubleValue(f) => Value::Float(f),
            Self::StringValue(s) => Value::String(s),
            Self::BlobValue(b) => Value::Bytes(b),
        }
    }
}

fn mismatch(wrapper: &str, value: &Value) -> SqlError {
    SqlError::InvalidValue(format!("cannot represent {value:?} as {wrapper}"))
}

/// A named Data API parameter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SqlParameter {
    /// The placeholder name, without the leading `:`.
    pub name: String,
    /// The type-tagged value.
    pub value: TypedValue,
}

/// The parameters of a compiled statement.
///
/// Exactly one carrier exists per statement, picked by the dialect.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryParams {
    /// Positional values for native drivers.
    Values(Vec<Value>),
    /// Named, type-tagged parameters for Data API drivers.
    Parameters(Vec<SqlParameter>),
}

impl QueryParams {
    /// Returns the number of bound parameters.
    pub fn len(&self) -> usize {
        match self {
            Self::Values(v) => v.len(),
            Self::Parameters(p) => p.len(),
        }
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
