/// Scalar field values carried by normalized records
///
/// Every record field holds one of these. A field the API did not send at all
/// is `NotAvailable`, which keeps exported rows rectangular.
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Sentinel written for fields missing from the source payload
pub const NOT_AVAILABLE: &str = "N/A";

/// A single normalized field value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    /// The API sent the field with an explicit null
    Null,
    /// The API did not send the field
    #[default]
    NotAvailable,
}

impl FieldValue {
    /// Builds a text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Normalizes an optional JSON value taken from a raw payload
    ///
    /// Lists are flattened to comma-separated text and nested objects to their
    /// compact JSON form, so every value stays a scalar.
    pub fn from_source(value: Option<&Value>) -> Self {
        match value {
            None => Self::NotAvailable,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(b)) => Self::Boolean(*b),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Self::Integer)
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Array(items)) => Self::Text(
                items
                    .iter()
                    .map(scalar_text)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Some(other @ Value::Object(_)) => Self::Text(other.to_string()),
        }
    }

    /// Returns true if the source did not provide this field
    pub fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable)
    }

    /// Returns the text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(v) => serializer.serialize_str(v),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Null => serializer.serialize_none(),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Null => write!(f, "null"),
            Self::NotAvailable => write!(f, "{}", NOT_AVAILABLE),
        }
    }
}
