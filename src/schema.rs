use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::SchemaShapeError;
use crate::field_tag;
use crate::materializer::{Materialize, Slot};

/// A Rust type that can be selected from a GraphQL server.
///
/// `describe` declares the selection set once, in order. The cache checks it
/// against a default instance, so every declared field must be reachable
/// through `field_mut` and every fragment through `fragment_mut`.
///
/// ```ignore
/// #[derive(Default)]
/// struct Repository {
///     name_with_owner: String,
///     stargazer_count: i64,
/// }
///
/// impl GraphQLObject for Repository {
///     fn describe(shape: &mut ShapeBuilder) {
///         shape.field::<String>("name_with_owner");
///         shape.field::<i64>("stargazer_count");
///     }
///
///     fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
///         match ident {
///             "name_with_owner" => Some(&mut self.name_with_owner),
///             "stargazer_count" => Some(&mut self.stargazer_count),
///             _ => None,
///         }
///     }
/// }
///
/// graphql_object!(Repository);
/// ```
pub trait GraphQLObject: Materialize + Default + 'static {
    fn describe(shape: &mut ShapeBuilder);

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot>;

    /// Switches to the variant matching `type_condition`, keeping it when it is
    /// already active, and returns it.
    fn fragment_mut(&mut self, type_condition: &str) -> Option<&mut dyn Slot> {
        let _ = type_condition;
        None
    }
}

/// Identity of a [`GraphQLObject`] type, used as the cache key.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    build: fn() -> Result<TypeDescriptor, SchemaShapeError>,
}

impl TypeRef {
    pub fn of<T: GraphQLObject>() -> Self {
        TypeRef {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            build: build_descriptor::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build(&self) -> Result<TypeDescriptor, SchemaShapeError> {
        (self.build)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Optionality and cardinality of a field, down to its leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    Scalar(&'static str),
    Object(TypeRef),
    Nullable(Box<FieldShape>),
    List(Box<FieldShape>),
}

impl FieldShape {
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldShape::Nullable(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            FieldShape::List(_) => true,
            FieldShape::Nullable(inner) => inner.is_list(),
            _ => false,
        }
    }

    /// The object type at the leaf, if the field is structured.
    pub fn object(&self) -> Option<TypeRef> {
        self.object_edge().map(|(object, _)| object)
    }

    /// The leaf object and whether an `Option` or `Vec` sits in between.
    pub(crate) fn object_edge(&self) -> Option<(TypeRef, bool)> {
        match self {
            FieldShape::Scalar(_) => None,
            FieldShape::Object(object) => Some((*object, false)),
            FieldShape::Nullable(inner) | FieldShape::List(inner) => {
                inner.object_edge().map(|(object, _)| (object, true))
            }
        }
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldShape::Scalar(name) => write!(f, "{name}!"),
            FieldShape::Object(object) => write!(f, "{}!", object.name),
            FieldShape::List(inner) => write!(f, "[{inner}]!"),
            FieldShape::Nullable(inner) => {
                let rendered = inner.to_string();
                f.write_str(rendered.strip_suffix('!').unwrap_or(&rendered))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Selection,
    /// The nested selection set is spliced into the parent
    Embedded,
}

/// An argument value as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<ArgumentValue>),
    Object(Vec<(String, ArgumentValue)>),
}

impl ArgumentValue {
    pub fn variable(name: impl Into<String>) -> Self {
        ArgumentValue::Variable(name.into())
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        ArgumentValue::Enum(name.into())
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ArgumentValue::Null,
            Value::Bool(value) => ArgumentValue::Boolean(*value),
            Value::Number(number) => match number.as_i64() {
                Some(int) => ArgumentValue::Int(int),
                None => ArgumentValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(value) => ArgumentValue::String(value.clone()),
            Value::Array(items) => ArgumentValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(entries) => ArgumentValue::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Every variable referenced by this value, nested ones included.
    pub fn variables(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    /// Whether every float in this value is finite, nested ones included.
    pub fn is_finite(&self) -> bool {
        match self {
            ArgumentValue::Float(value) => value.is_finite(),
            ArgumentValue::List(items) => items.iter().all(Self::is_finite),
            ArgumentValue::Object(entries) => entries.iter().all(|(_, value)| value.is_finite()),
            _ => true,
        }
    }

    fn collect_variables<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            ArgumentValue::Variable(name) => found.push(name),
            ArgumentValue::List(items) => items.iter().for_each(|item| item.collect_variables(found)),
            ArgumentValue::Object(entries) => entries
                .iter()
                .for_each(|(_, value)| value.collect_variables(found)),
            _ => (),
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::Variable(name) => write!(f, "${name}"),
            ArgumentValue::Int(value) => write!(f, "{value}"),
            ArgumentValue::Float(value) if value.is_finite() => write!(f, "{value:?}"),
            ArgumentValue::Float(_) => f.write_str("null"),
            ArgumentValue::String(value) => write_string(f, value),
            ArgumentValue::Boolean(value) => write!(f, "{value}"),
            ArgumentValue::Null => f.write_str("null"),
            ArgumentValue::Enum(name) => f.write_str(name),
            ArgumentValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ArgumentValue::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl From<i32> for ArgumentValue {
    fn from(value: i32) -> Self {
        ArgumentValue::Int(value.into())
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        ArgumentValue::Int(value)
    }
}

impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        ArgumentValue::Float(value)
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Boolean(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    ident: String,
    name: String,
    alias: Option<String>,
    arguments: Vec<(String, ArgumentValue)>,
    shape: FieldShape,
    kind: FieldKind,
}

impl FieldDescriptor {
    /// The native field identifier, as passed to `field_mut`.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The key this field has in the response object.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &[(String, ArgumentValue)] {
        &self.arguments
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDescriptor {
    type_condition: String,
    target: TypeRef,
}

impl FragmentDescriptor {
    pub fn type_condition(&self) -> &str {
        &self.type_condition
    }

    pub fn target(&self) -> TypeRef {
        self.target
    }
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    type_ref: TypeRef,
    fields: Vec<FieldDescriptor>,
    fragments: Vec<FragmentDescriptor>,
}

impl TypeDescriptor {
    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    pub fn type_name(&self) -> &'static str {
        self.type_ref.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn fragments(&self) -> &[FragmentDescriptor] {
        &self.fragments
    }

    /// Whether the type stands for an interface or union.
    pub fn is_polymorphic(&self) -> bool {
        !self.fragments.is_empty()
    }

    pub fn fragment(&self, type_condition: &str) -> Option<&FragmentDescriptor> {
        self.fragments
            .iter()
            .find(|fragment| fragment.type_condition == type_condition)
    }

    /// Nested object types and whether each is reached through an indirection.
    pub(crate) fn nested_types(&self) -> impl Iterator<Item = (TypeRef, bool)> + '_ {
        let fields = self.fields.iter().filter_map(|field| field.shape.object_edge());
        let fragments = self.fragments.iter().map(|fragment| (fragment.target, false));
        fields.chain(fragments)
    }
}

pub(crate) const TYPENAME: &str = "__typename";

/// Collects the fields and fragments of a type inside
/// [`GraphQLObject::describe`].
pub struct ShapeBuilder {
    fields: Vec<FieldDescriptor>,
    fragments: Vec<FragmentDescriptor>,
    errors: Vec<String>,
}

impl ShapeBuilder {
    fn new() -> Self {
        ShapeBuilder {
            fields: Vec::new(),
            fragments: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declares a selected field. The wire name defaults to the lowerCamelCase
    /// form of `ident`.
    pub fn field<F: Materialize>(&mut self, ident: &str) -> FieldBuilder<'_> {
        self.push(ident, F::shape(), FieldKind::Selection)
    }

    /// Declares a field holding another object whose selections are flattened
    /// into this one. The object is always present, so it cannot be an `Option`.
    pub fn embed<F: GraphQLObject>(&mut self, ident: &str) {
        self.push(ident, FieldShape::Object(TypeRef::of::<F>()), FieldKind::Embedded);
    }

    /// Declares the concrete type selected with `... on {type_condition}`.
    pub fn fragment<F: GraphQLObject>(&mut self, type_condition: &str) {
        if self.fragments.iter().any(|fragment| fragment.type_condition == type_condition) {
            self.errors
                .push(format!("fragment on `{type_condition}` is declared twice"));
        }
        self.fragments.push(FragmentDescriptor {
            type_condition: type_condition.to_string(),
            target: TypeRef::of::<F>(),
        });
    }

    fn push(&mut self, ident: &str, shape: FieldShape, kind: FieldKind) -> FieldBuilder<'_> {
        if self.fields.iter().any(|field| field.ident == ident) {
            self.errors.push(format!("field `{ident}` is declared twice"));
        }
        self.fields.push(FieldDescriptor {
            ident: ident.to_string(),
            name: to_lower_camel_case(ident),
            alias: None,
            arguments: Vec::new(),
            shape,
            kind,
        });
        let index = self.fields.len() - 1;
        FieldBuilder {
            field: &mut self.fields[index],
            errors: &mut self.errors,
        }
    }

    fn finish(self, type_ref: TypeRef) -> Result<TypeDescriptor, SchemaShapeError> {
        if let Some(message) = self.errors.into_iter().next() {
            return Err(SchemaShapeError::new(type_ref.name, message));
        }
        Ok(TypeDescriptor {
            type_ref,
            fields: self.fields,
            fragments: self.fragments,
        })
    }
}

pub struct FieldBuilder<'a> {
    field: &'a mut FieldDescriptor,
    errors: &'a mut Vec<String>,
}

impl FieldBuilder<'_> {
    /// Overrides the wire name.
    pub fn name(self, name: &str) -> Self {
        self.field.name = name.to_string();
        self
    }

    pub fn alias(self, alias: &str) -> Self {
        self.field.alias = Some(alias.to_string());
        self
    }

    pub fn argument(self, name: &str, value: impl Into<ArgumentValue>) -> Self {
        let value = value.into();
        if !value.is_finite() {
            self.errors.push(format!(
                "argument `{name}` of field `{}` is not a finite number",
                self.field.ident
            ));
        }
        self.field.arguments.push((name.to_string(), value));
        self
    }

    /// Sets alias, name and arguments from a GraphQL field, e.g.
    /// `owner: repositoryOwner(login: $login)`.
    pub fn tag(self, tag: &str) -> Self {
        match field_tag::parse(tag) {
            Ok(parsed) => {
                self.field.name = parsed.name;
                self.field.alias = parsed.alias;
                self.field.arguments = parsed.arguments;
            }
            Err(message) => self
                .errors
                .push(format!("invalid tag on field `{}`: {message}", self.field.ident)),
        }
        self
    }
}

fn build_descriptor<T: GraphQLObject>() -> Result<TypeDescriptor, SchemaShapeError> {
    let type_ref = TypeRef::of::<T>();
    let mut shape = ShapeBuilder::new();
    T::describe(&mut shape);
    let descriptor = shape.finish(type_ref)?;

    let mut instance = T::default();
    for field in &descriptor.fields {
        let slot = instance.field_mut(&field.ident).ok_or_else(|| {
            SchemaShapeError::new(type_ref.name, format!("no slot for field `{}`", field.ident))
        })?;
        check_slot(type_ref, &field.ident, &field.shape, slot)?;
    }
    for fragment in &descriptor.fragments {
        let slot = instance.fragment_mut(&fragment.type_condition).ok_or_else(|| {
            SchemaShapeError::new(
                type_ref.name,
                format!("no slot for fragment on `{}`", fragment.type_condition),
            )
        })?;
        check_slot(
            type_ref,
            &fragment.type_condition,
            &FieldShape::Object(fragment.target),
            slot,
        )?;
    }
    Ok(descriptor)
}

fn check_slot(
    type_ref: TypeRef,
    ident: &str,
    declared: &FieldShape,
    slot: &mut dyn Slot,
) -> Result<(), SchemaShapeError> {
    let actual = slot.slot_shape();
    if &actual == declared {
        Ok(())
    } else {
        Err(SchemaShapeError::new(
            type_ref.name,
            format!("`{ident}` is declared as {declared} but its slot holds {actual}"),
        ))
    }
}

/// `name_with_owner` becomes `nameWithOwner`; leading underscores are kept.
pub fn to_lower_camel_case(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let trimmed = ident.trim_start_matches('_');
    let mut name = ident[..ident.len() - trimmed.len()].to_string();
    let mut upper = false;
    for c in trimmed.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}
