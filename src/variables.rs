use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::QueryShapeError;
use crate::materializer::Id;

/// A GraphQL input type reference, such as `[String!]` or `Int!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTypeRef {
    Named(Cow<'static, str>),
    List(Box<InputTypeRef>),
    NonNull(Box<InputTypeRef>),
}

impl InputTypeRef {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        InputTypeRef::Named(name.into())
    }

    pub fn list_of(inner: InputTypeRef) -> Self {
        InputTypeRef::List(Box::new(inner))
    }

    pub fn non_null(self) -> Self {
        match self {
            InputTypeRef::NonNull(_) => self,
            other => InputTypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn nullable(self) -> Self {
        match self {
            InputTypeRef::NonNull(inner) => *inner,
            other => other,
        }
    }
}

impl fmt::Display for InputTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputTypeRef::Named(name) => f.write_str(name),
            InputTypeRef::List(inner) => write!(f, "[{inner}]"),
            InputTypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// A Rust value that can be bound to a variable, with its declared type.
pub trait InputType: Serialize {
    fn input_type() -> InputTypeRef;
}

macro_rules! impl_input_type {
    ($($ty:ty => $name:literal),+ $(,)?) => {$(
        impl InputType for $ty {
            fn input_type() -> InputTypeRef {
                InputTypeRef::named($name).non_null()
            }
        }
    )+};
}

impl_input_type! {
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
    bool => "Boolean",
    String => "String",
    Id => "ID",
}

impl InputType for &str {
    fn input_type() -> InputTypeRef {
        InputTypeRef::named("String").non_null()
    }
}

impl<T: InputType> InputType for Option<T> {
    fn input_type() -> InputTypeRef {
        T::input_type().nullable()
    }
}

impl<T: InputType> InputType for Vec<T> {
    fn input_type() -> InputTypeRef {
        InputTypeRef::list_of(T::input_type()).non_null()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub input_type: InputTypeRef,
    pub value: Value,
}

/// Variable bindings of one operation, kept sorted by name.
///
/// Serializes as the `variables` object of the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    entries: BTreeMap<String, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value`, declaring the type implied by its Rust type.
    pub fn insert<V: InputType>(&mut self, name: impl Into<String>, value: V) -> Result<(), QueryShapeError> {
        let name = name.into();
        let value = serde_json::to_value(&value).map_err(|error| QueryShapeError::InvalidVariable {
            name: name.clone(),
            reason: error.to_string(),
        })?;
        self.insert_typed(name, V::input_type(), value);
        Ok(())
    }

    /// Binds a JSON value, declaring the type implied by its runtime shape.
    pub fn insert_json(&mut self, name: impl Into<String>, value: Value) -> Result<(), QueryShapeError> {
        let name = name.into();
        let input_type = infer_input_type(&value).map_err(|reason| QueryShapeError::InvalidVariable {
            name: name.clone(),
            reason,
        })?;
        self.insert_typed(name, input_type, value);
        Ok(())
    }

    /// Binds a value under an explicitly declared type, e.g. an input object.
    pub fn insert_typed(&mut self, name: impl Into<String>, input_type: InputTypeRef, value: Value) {
        self.entries.insert(name.into(), Variable { input_type, value });
    }

    pub fn with<V: InputType>(mut self, name: impl Into<String>, value: V) -> Result<Self, QueryShapeError> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Builds bindings from a JSON object, inferring every declared type.
    pub fn from_json(object: serde_json::Map<String, Value>) -> Result<Self, QueryShapeError> {
        let mut variables = Variables::new();
        for (name, value) in object {
            variables.insert_json(name, value)?;
        }
        Ok(variables)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.entries.iter().map(|(name, variable)| (name.as_str(), variable))
    }

    /// `($first: Int!, $query: String)`, or nothing without bindings.
    pub fn declarations(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let declarations: Vec<String> = self
            .iter()
            .map(|(name, variable)| format!("${name}: {}", variable.input_type))
            .collect();
        format!("({})", declarations.join(", "))
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, variable) in &self.entries {
            map.serialize_entry(name, &variable.value)?;
        }
        map.end()
    }
}

fn infer_input_type(value: &Value) -> Result<InputTypeRef, String> {
    let named = match value {
        Value::Bool(_) => "Boolean",
        Value::Number(number) if number.is_i64() || number.is_u64() => "Int",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(items) => {
            let mut inferred = items.iter().map(infer_input_type);
            let first = match inferred.next() {
                Some(first) => first?,
                None => return Err("the item type of an empty list cannot be inferred".to_string()),
            };
            for item in inferred {
                if item? != first {
                    return Err("list items have different types".to_string());
                }
            }
            return Ok(InputTypeRef::list_of(first).non_null());
        }
        Value::Null => return Err("the type of null cannot be inferred".to_string()),
        Value::Object(_) => {
            return Err("input objects need an explicit type, use `insert_typed`".to_string())
        }
    };
    Ok(InputTypeRef::named(named).non_null())
}
