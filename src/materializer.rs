//! Decoding of response data into the targets the query was compiled from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor_cache::TypeDescriptorCache;
use crate::error::{DecodeError, Error, SchemaShapeError};
use crate::response::PathSegment;
use crate::schema::{FieldKind, FieldShape, GraphQLObject, TYPENAME};

/// A value that can be filled in place from response JSON.
///
/// Implemented for the built-in scalars, `Option`, `Vec` and `Box`. Objects get
/// it from [`graphql_object!`](crate::graphql_object), custom scalars from
/// [`graphql_scalar!`](crate::graphql_scalar).
pub trait Materialize {
    fn shape() -> FieldShape;

    fn materialize(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error>;
}

/// Object safe view of [`Materialize`], handed out by
/// [`GraphQLObject::field_mut`].
pub trait Slot {
    fn slot_shape(&self) -> FieldShape;

    fn fill(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error>;
}

impl<T: Materialize> Slot for T {
    fn slot_shape(&self) -> FieldShape {
        T::shape()
    }

    fn fill(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error> {
        self.materialize(value, cx)
    }
}

/// Fills `target` from `data`, leaving fields absent from the descriptor alone.
pub fn materialize<T: GraphQLObject>(
    cache: &TypeDescriptorCache,
    data: &Value,
    target: &mut T,
) -> Result<(), Error> {
    cache.resolve::<T>()?;
    Materializer::new(cache).object(target, data)
}

/// Walks response JSON alongside type descriptors, tracking the field path.
pub struct Materializer<'c> {
    cache: &'c TypeDescriptorCache,
    path: Vec<PathSegment>,
}

impl<'c> Materializer<'c> {
    pub fn new(cache: &'c TypeDescriptorCache) -> Self {
        Materializer {
            cache,
            path: Vec::new(),
        }
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::Decode(DecodeError {
            path: self.path.clone(),
            message: message.into(),
        })
    }

    fn nested<F>(&mut self, segment: PathSegment, decode: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.path.push(segment);
        let result = decode(self);
        self.path.pop();
        result
    }

    /// Fills the fields of an object, then its matching fragment.
    pub fn object<T: GraphQLObject>(&mut self, target: &mut T, value: &Value) -> Result<(), Error> {
        let descriptor = self.cache.resolve::<T>()?;
        let entries = match value {
            Value::Object(entries) => entries,
            other => return Err(self.error(format!("expected an object, found {}", describe(other)))),
        };

        for field in descriptor.fields() {
            let slot = target.field_mut(field.ident()).ok_or_else(|| {
                SchemaShapeError::new(descriptor.type_name(), format!("no slot for field `{}`", field.ident()))
            })?;
            if field.kind() == FieldKind::Embedded {
                slot.fill(value, self)?;
                continue;
            }
            let key = field.response_key();
            match entries.get(key) {
                Some(value) => self.nested(PathSegment::Key(key.to_string()), |cx| slot.fill(value, cx))?,
                None if field.shape().is_nullable() => (),
                None => {
                    return self.nested(PathSegment::Key(key.to_string()), |cx| {
                        Err(cx.error("required field is missing"))
                    })
                }
            }
        }

        if descriptor.is_polymorphic() {
            let type_name = match entries.get(TYPENAME) {
                Some(Value::String(type_name)) => type_name,
                _ => return Err(self.error(format!("missing `{TYPENAME}` to select a fragment"))),
            };
            let fragment = descriptor
                .fragment(type_name)
                .ok_or_else(|| self.error(format!("no fragment matches `{TYPENAME}` \"{type_name}\"")))?;
            let slot = target.fragment_mut(fragment.type_condition()).ok_or_else(|| {
                SchemaShapeError::new(
                    descriptor.type_name(),
                    format!("no slot for fragment on `{}`", fragment.type_condition()),
                )
            })?;
            slot.fill(value, self)?;
        }
        Ok(())
    }

    /// Decodes a leaf value through serde, rejecting null.
    pub fn scalar<T: DeserializeOwned>(&self, value: &Value, expected: &str) -> Result<T, Error> {
        if value.is_null() {
            return Err(self.error(format!("unexpected null for non-nullable {expected}")));
        }
        T::deserialize(value)
            .map_err(|error| self.error(format!("expected {expected}, found {}: {error}", describe(value))))
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Implements [`Materialize`] for types that implement
/// [`GraphQLObject`](crate::GraphQLObject).
#[macro_export]
macro_rules! graphql_object {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Materialize for $ty {
            fn shape() -> $crate::FieldShape {
                $crate::FieldShape::Object($crate::TypeRef::of::<$ty>())
            }

            fn materialize(
                &mut self,
                value: &$crate::serde_json::Value,
                cx: &mut $crate::Materializer<'_>,
            ) -> ::std::result::Result<(), $crate::Error> {
                cx.object(self, value)
            }
        }
    )+};
}

/// Implements [`Materialize`] for a leaf type decoded through `serde`, such as
/// a GraphQL enum or custom scalar.
#[macro_export]
macro_rules! graphql_scalar {
    ($($ty:ty => $name:literal),+ $(,)?) => {$(
        impl $crate::Materialize for $ty {
            fn shape() -> $crate::FieldShape {
                $crate::FieldShape::Scalar($name)
            }

            fn materialize(
                &mut self,
                value: &$crate::serde_json::Value,
                cx: &mut $crate::Materializer<'_>,
            ) -> ::std::result::Result<(), $crate::Error> {
                *self = cx.scalar(value, $name)?;
                Ok(())
            }
        }
    )+};
}

graphql_scalar! {
    String => "String",
    bool => "Boolean",
    i8 => "Int",
    i16 => "Int",
    i32 => "Int",
    i64 => "Int",
    u8 => "Int",
    u16 => "Int",
    u32 => "Int",
    u64 => "Int",
    f32 => "Float",
    f64 => "Float",
    Value => "JSON",
}

/// The GraphQL `ID` scalar. Servers may send it as a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Id(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Id(id)
    }
}

impl Materialize for Id {
    fn shape() -> FieldShape {
        FieldShape::Scalar("ID")
    }

    fn materialize(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error> {
        match value {
            Value::String(id) => self.0.clone_from(id),
            Value::Number(id) => self.0 = id.to_string(),
            other => return Err(cx.error(format!("expected ID, found {}", describe(other)))),
        }
        Ok(())
    }
}

impl<T: Materialize + Default> Materialize for Option<T> {
    fn shape() -> FieldShape {
        FieldShape::Nullable(Box::new(T::shape()))
    }

    fn materialize(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(inner) => inner.materialize(value, cx),
            None => {
                let mut inner = T::default();
                inner.materialize(value, cx)?;
                *self = Some(inner);
                Ok(())
            }
        }
    }
}

impl<T: Materialize + Default> Materialize for Vec<T> {
    fn shape() -> FieldShape {
        FieldShape::List(Box::new(T::shape()))
    }

    fn materialize(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(cx.error(format!("expected an array, found {}", describe(other)))),
        };
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut element = T::default();
            cx.nested(PathSegment::Index(index), |cx| element.materialize(item, cx))?;
            decoded.push(element);
        }
        *self = decoded;
        Ok(())
    }
}

impl<T: Materialize> Materialize for Box<T> {
    fn shape() -> FieldShape {
        T::shape()
    }

    fn materialize(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error> {
        T::materialize(self, value, cx)
    }
}
