use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::descriptor_cache::TypeDescriptorCache;
use crate::document_writer::{DocumentStyle, DocumentWriter};
use crate::error::{Error, QueryShapeError};
use crate::schema::{FieldDescriptor, FieldKind, TypeDescriptor, TypeRef, TYPENAME};
use crate::variables::Variables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// Renders operation documents from type descriptors.
pub struct QueryCompiler<'a> {
    cache: &'a TypeDescriptorCache,
    style: &'a DocumentStyle,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(cache: &'a TypeDescriptorCache, style: &'a DocumentStyle) -> Self {
        QueryCompiler { cache, style }
    }

    pub fn compile(
        &self,
        kind: OperationKind,
        root: &TypeDescriptor,
        variables: &Variables,
    ) -> Result<String, Error> {
        let mut file = DocumentWriter::new(self.style);
        let declarations = variables.declarations();
        if declarations.is_empty() {
            file.begin_indent(&format!("{kind} {{"));
        } else {
            file.begin_indent(&format!("{kind} {declarations} {{"));
        }
        let mut stack = vec![root.type_ref().id()];
        self.selection_set(&mut file, root, variables, &mut stack)?;
        file.end_indent("}");
        Ok(file.build_string())
    }

    fn selection_set(
        &self,
        file: &mut DocumentWriter,
        descriptor: &TypeDescriptor,
        variables: &Variables,
        stack: &mut Vec<TypeId>,
    ) -> Result<(), Error> {
        if self.selections(file, descriptor, variables, stack, &mut false)? == 0 {
            return Err(QueryShapeError::EmptySelection {
                type_name: descriptor.type_name().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Writes the selections of `descriptor`, returning how many were written.
    ///
    /// `typename` tracks whether the enclosing selection set already has
    /// `__typename`, so embedded polymorphic types do not repeat it.
    fn selections(
        &self,
        file: &mut DocumentWriter,
        descriptor: &TypeDescriptor,
        variables: &Variables,
        stack: &mut Vec<TypeId>,
        typename: &mut bool,
    ) -> Result<usize, Error> {
        let mut written = 0;
        if descriptor.is_polymorphic() && !*typename && !self.selects_typename(descriptor)? {
            file.line(TYPENAME);
            written += 1;
            *typename = true;
        }

        for field in descriptor.fields() {
            match (field.kind(), field.shape().object()) {
                (FieldKind::Embedded, Some(object)) => {
                    let nested = self.enter(object, stack)?;
                    written += self.selections(file, &nested, variables, stack, typename)?;
                    stack.pop();
                }
                (_, None) => {
                    file.line(&field_head(field, variables)?);
                    written += 1;
                }
                (FieldKind::Selection, Some(object)) => {
                    let nested = self.enter(object, stack)?;
                    file.begin_indent(&format!("{} {{", field_head(field, variables)?));
                    self.selection_set(file, &nested, variables, stack)?;
                    file.end_indent("}");
                    stack.pop();
                    written += 1;
                }
            }
        }

        for fragment in descriptor.fragments() {
            let nested = self.enter(fragment.target(), stack)?;
            file.begin_indent(&format!("... on {} {{", fragment.type_condition()));
            self.selection_set(file, &nested, variables, stack)?;
            file.end_indent("}");
            stack.pop();
            written += 1;
        }
        Ok(written)
    }

    /// Whether `descriptor` or a type it embeds declares `__typename` itself.
    fn selects_typename(&self, descriptor: &TypeDescriptor) -> Result<bool, Error> {
        for field in descriptor.fields() {
            match (field.kind(), field.shape().object()) {
                (FieldKind::Embedded, Some(embedded)) => {
                    if self.selects_typename(&*self.cache.resolve_ref(embedded)?)? {
                        return Ok(true);
                    }
                }
                (FieldKind::Selection, _) if field.response_key() == TYPENAME => return Ok(true),
                _ => (),
            }
        }
        Ok(false)
    }

    fn enter(&self, type_ref: TypeRef, stack: &mut Vec<TypeId>) -> Result<Arc<TypeDescriptor>, Error> {
        if stack.contains(&type_ref.id()) {
            return Err(QueryShapeError::RecursiveSelection {
                type_name: type_ref.name().to_string(),
            }
            .into());
        }
        let descriptor = self.cache.resolve_ref(type_ref)?;
        stack.push(type_ref.id());
        Ok(descriptor)
    }
}

/// `alias: name(argument: value, ...)`
fn field_head(field: &FieldDescriptor, variables: &Variables) -> Result<String, QueryShapeError> {
    let mut head = String::new();
    if let Some(alias) = field.alias() {
        head.push_str(alias);
        head.push_str(": ");
    }
    head.push_str(field.name());
    if field.arguments().is_empty() {
        return Ok(head);
    }

    let mut arguments = Vec::with_capacity(field.arguments().len());
    for (name, value) in field.arguments() {
        if let Some(variable) = value.variables().into_iter().find(|variable| !variables.contains(variable)) {
            return Err(QueryShapeError::UndeclaredVariable {
                field: field.response_key().to_string(),
                argument: name.clone(),
                variable: variable.to_string(),
            });
        }
        arguments.push(format!("{name}: {value}"));
    }
    head.push('(');
    head.push_str(&arguments.join(", "));
    head.push(')');
    Ok(head)
}
