//! The `{data, errors}` envelope of a GraphQL response and the aggregation of
//! its `errors` array into a single failure.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// One step of a response path, either an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// An entry of the `errors` array.
///
/// Only `message` is required. Absent and `null` members decode as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolError {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<Location>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<PathSegment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extensions: Map<String, Value>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<ProtocolError>,
}

impl ResponseEnvelope {
    pub(crate) fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let deserializer = &mut serde_json::Deserializer::from_slice(body);
        serde_path_to_error::deserialize(deserializer).map_err(|error| DecodeError {
            path: Vec::new(),
            message: format!("invalid response envelope at `{}`: {}", error.path(), error.inner()),
        })
    }
}

/// The non-empty `errors` array of a response, surfaced as one failure.
///
/// Displays as the first error's message. Every error stays available through
/// [`ProtocolErrors::errors`] for callers that need the full list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolErrors {
    errors: Vec<ProtocolError>,
}

impl ProtocolErrors {
    pub fn errors(&self) -> &[ProtocolError] {
        &self.errors
    }

    pub fn first(&self) -> &ProtocolError {
        // aggregate() never builds an empty list
        &self.errors[0]
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|error| error.message.as_str())
    }

    pub fn into_errors(self) -> Vec<ProtocolError> {
        self.errors
    }
}

impl fmt::Display for ProtocolErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.first().message)
    }
}

impl std::error::Error for ProtocolErrors {}

pub fn aggregate(errors: Vec<ProtocolError>) -> Option<ProtocolErrors> {
    if errors.is_empty() {
        None
    } else {
        Some(ProtocolErrors { errors })
    }
}
