use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::SchemaShapeError;
use crate::schema::{FieldKind, GraphQLObject, TypeDescriptor, TypeRef};

/// Memoized type descriptors, keyed by Rust type.
///
/// Entries are written once per type and never invalidated.
#[derive(Default)]
pub struct TypeDescriptorCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

struct Visit {
    id: TypeId,
    /// Whether the edge into this type went through an `Option` or `Vec`
    indirect: bool,
}

impl TypeDescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<T: GraphQLObject>(&self) -> Result<Arc<TypeDescriptor>, SchemaShapeError> {
        self.resolve_ref(TypeRef::of::<T>())
    }

    /// Returns the descriptor of `type_ref`, building it and every type it
    /// reaches on first use.
    pub fn resolve_ref(&self, type_ref: TypeRef) -> Result<Arc<TypeDescriptor>, SchemaShapeError> {
        if let Some(descriptor) = self.get(type_ref.id()) {
            return Ok(descriptor);
        }
        self.visit(type_ref, false, &mut Vec::new())?;
        self.get(type_ref.id()).ok_or_else(|| {
            SchemaShapeError::new(type_ref.name(), "descriptor vanished from the cache")
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn get(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.entries.read().get(&id).cloned()
    }

    /// Rejects selection sets where two fields, embedded ones included, share
    /// a response key.
    fn check_response_keys(&self, descriptor: &TypeDescriptor) -> Result<(), SchemaShapeError> {
        let mut keys = HashSet::new();
        self.collect_response_keys(descriptor, descriptor.type_name(), &mut keys)
    }

    fn collect_response_keys(
        &self,
        descriptor: &TypeDescriptor,
        owner: &'static str,
        keys: &mut HashSet<String>,
    ) -> Result<(), SchemaShapeError> {
        for field in descriptor.fields() {
            match (field.kind(), field.shape().object()) {
                (FieldKind::Embedded, Some(embedded)) => {
                    // Absent only while it is still being built further up the path.
                    if let Some(embedded) = self.get(embedded.id()) {
                        self.collect_response_keys(&embedded, owner, keys)?;
                    }
                }
                _ => {
                    if !keys.insert(field.response_key().to_string()) {
                        return Err(SchemaShapeError::new(
                            owner,
                            format!("response key `{}` is ambiguous", field.response_key()),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn visit(&self, type_ref: TypeRef, indirect: bool, path: &mut Vec<Visit>) -> Result<(), SchemaShapeError> {
        if let Some(position) = path.iter().position(|visit| visit.id == type_ref.id()) {
            let mediated = indirect || path[position + 1..].iter().any(|visit| visit.indirect);
            return if mediated {
                Ok(())
            } else {
                Err(SchemaShapeError::new(
                    type_ref.name(),
                    "type contains itself without an Option or Vec in between",
                ))
            };
        }
        if self.entries.read().contains_key(&type_ref.id()) {
            return Ok(());
        }

        tracing::trace!(type_name = type_ref.name(), "building type descriptor");
        let descriptor = type_ref.build()?;

        path.push(Visit {
            id: type_ref.id(),
            indirect,
        });
        for (nested, indirect) in descriptor.nested_types() {
            self.visit(nested, indirect, path)?;
        }
        path.pop();
        self.check_response_keys(&descriptor)?;

        self.entries
            .write()
            .entry(type_ref.id())
            .or_insert_with(|| Arc::new(descriptor));
        Ok(())
    }
}
