use std::fmt;

use http::StatusCode;

use crate::response::{PathSegment, ProtocolErrors};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native type declaration cannot be turned into a descriptor
    #[error(transparent)]
    SchemaShape(#[from] SchemaShapeError),
    /// No valid document can be rendered for the descriptor and variables
    #[error(transparent)]
    QueryShape(#[from] QueryShapeError),
    /// A request option failed before the request was sent
    #[error(transparent)]
    RequestOption(#[from] OptionError),
    /// The server answered with something other than 200 OK
    #[error(transparent)]
    TransportStatus(#[from] TransportStatusError),
    /// The transport could not deliver the request
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    /// The response did not match the shape of the target
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The server reported errors, with or without data
    #[error(transparent)]
    Protocol(#[from] ProtocolErrors),
    #[error("request was cancelled")]
    Cancelled,
    #[error("encoding request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[source] http::uri::InvalidUri),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid shape for `{type_name}`: {message}")]
pub struct SchemaShapeError {
    pub type_name: String,
    pub message: String,
}

impl SchemaShapeError {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryShapeError {
    #[error("selection set of `{type_name}` is empty")]
    EmptySelection { type_name: String },
    #[error("argument `{argument}` of field `{field}` references undeclared variable `${variable}`")]
    UndeclaredVariable {
        field: String,
        argument: String,
        variable: String,
    },
    #[error("selection set of `{type_name}` recurses into itself")]
    RecursiveSelection { type_name: String },
    #[error("cannot declare variable `${name}`: {reason}")]
    InvalidVariable { name: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
#[error("request option error: {source}")]
pub struct OptionError {
    #[source]
    pub source: BoxError,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("non-200 OK status code: {status} body: {:?}", String::from_utf8_lossy(.body))]
pub struct TransportStatusError {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("decoding response at {}: {message}", DisplayPath(.path))]
pub struct DecodeError {
    pub path: Vec<PathSegment>,
    pub message: String,
}

struct DisplayPath<'a>(&'a [PathSegment]);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
