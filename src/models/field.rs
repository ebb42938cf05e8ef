//! Field extraction shared by every response record
//!
//! Upstream documents are loosely typed: keys come and go depending on the
//! query flags and the address being looked up. Every lookup here resolves
//! to either the decoded value or a caller-supplied default, so record
//! construction never has to deal with partially populated data.

use serde_json::{Map, Value};
use thiserror::Error;

/// Placeholder stored for any field the upstream document does not carry.
pub const FIELD_IS_NOT_SET: &str = "FIELD_IS_NOT_SET";

/// A JSON object as returned by the service.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("field '{field}' is missing from the response")]
    MissingField { field: String },
    #[error("field '{field}' has an unexpected shape (expected {expected}, found {found})")]
    UnexpectedShape {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Types that can be read out of a single JSON value.
pub trait FromField: Sized {
    /// Shape name used in error messages.
    const EXPECTED: &'static str;

    /// Returns `None` when the value has the wrong shape.
    fn from_field(value: &Value) -> Option<Self>;
}

impl FromField for String {
    const EXPECTED: &'static str = "string";

    // Numbers and booleans are kept in their textual form; the service sends
    // coordinates and counters as bare numbers depending on the endpoint node.
    fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromField for Vec<String> {
    const EXPECTED: &'static str = "array of strings";

    fn from_field(value: &Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(String::from_field)
            .collect::<Option<Vec<_>>>()
    }
}

/// Read `key` from `doc`, falling back to `default` when the document is
/// absent, the key is missing, or the value is `null`.
///
/// A value that is present but cannot be read as `T` is an error rather than
/// a silent default.
pub fn field<T: FromField>(doc: Option<&Document>, key: &str, default: T) -> ModelResult<T> {
    match lookup(doc, key) {
        None => Ok(default),
        Some(value) => T::from_field(value).ok_or_else(|| unexpected(key, T::EXPECTED, value)),
    }
}

/// [`field`] for string leaves, defaulting to [`FIELD_IS_NOT_SET`].
pub fn string_field(doc: Option<&Document>, key: &str) -> ModelResult<String> {
    field(doc, key, unset())
}

/// Nested sub-document under `key`, or `None` when it is absent.
pub fn object_field<'a>(doc: Option<&'a Document>, key: &str) -> ModelResult<Option<&'a Document>> {
    match lookup(doc, key) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(unexpected(key, "object", other)),
    }
}

/// Like [`string_field`] but a missing key is an error.
pub fn required_string_field(doc: &Document, key: &str) -> ModelResult<String> {
    match lookup(Some(doc), key) {
        None => Err(ModelError::MissingField {
            field: key.to_string(),
        }),
        Some(value) => {
            String::from_field(value).ok_or_else(|| unexpected(key, String::EXPECTED, value))
        }
    }
}

pub(crate) fn unset() -> String {
    FIELD_IS_NOT_SET.to_string()
}

/// JSON type name of `value`, for diagnostics.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lookup<'a>(doc: Option<&'a Document>, key: &str) -> Option<&'a Value> {
    doc.and_then(|d| d.get(key)).filter(|v| !v.is_null())
}

fn unexpected(key: &str, expected: &'static str, found: &Value) -> ModelError {
    ModelError::UnexpectedShape {
        field: key.to_string(),
        expected,
        found: kind(found),
    }
}
