//! A typed GraphQL client.
//!
//! Rust types describe the selection set they expect. The client compiles
//! that description into a query or mutation document, posts it, and
//! materializes the response data back into the same value.

mod client;
mod config;
mod descriptor_cache;
mod document_writer;
mod error;
mod field_tag;
mod materializer;
mod query_compiler;
mod response;
mod schema;
mod transport;
mod variables;

#[cfg(test)]
mod test_types;

pub use client::{Client, ClientBuilder, RequestOption};
pub use config::{ClientConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use descriptor_cache::TypeDescriptorCache;
pub use document_writer::DocumentStyle;
pub use error::{
    BoxError, DecodeError, Error, OptionError, QueryShapeError, Result, SchemaShapeError, TransportStatusError,
};
pub use materializer::{materialize, Id, Materialize, Materializer, Slot};
pub use query_compiler::{OperationKind, QueryCompiler};
pub use response::{aggregate, Location, PathSegment, ProtocolError, ProtocolErrors};
pub use schema::{
    to_lower_camel_case, ArgumentValue, FieldBuilder, FieldDescriptor, FieldKind, FieldShape, FragmentDescriptor,
    GraphQLObject, ShapeBuilder, TypeDescriptor, TypeRef,
};
pub use transport::{ReqwestTransport, Transport};
pub use variables::{InputType, InputTypeRef, Variable, Variables};

pub use serde_json;
pub use tokio_util::sync::CancellationToken;
