// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Service object model.
//!
//! **DDD Context:** Object Model Builder
//!
//! Every declaration becomes a [`ServiceObject`] in an arena owned by
//! [`ServiceModel`]. Objects refer to each other by [`ObjectId`]: the
//! containment parent, the generic definition a closed instantiation was
//! constructed from, and the inverse lists (children, constructed
//! instantiations). Containment and generic construction are independent
//! axes, so the graph is not a tree.
//!
//! The passes in [`passes`](self::passes) fill in the computed properties:
//! marker configuration, relations, the broker class name and the
//! dispatchable methods.

mod classify;
mod passes;

pub use classify::{Classification, DispatchKind, RADIO_RESULT, TASK, classify};
pub use passes::Prepared;

use crate::declaration::{Generics, InstantiateError, TypeDeclaration, TypeRef};
use crate::span::Location;
use bitflags::bitflags;
use ecow::{EcoString, eco_format};
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Default `MaxLinks` when the marker does not set one.
pub const UNBOUNDED_LINKS: i32 = i32::MAX;

/// Errors raised when declarations violate the host contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("type '{name}' is declared more than once")]
    DuplicateType { name: EcoString },

    #[error("type '{name}' is nested in '{parent}', which is not declared")]
    UnknownContainingType { name: EcoString, parent: EcoString },

    #[error("type '{name}' is constructed from '{definition}', which is not declared")]
    UnknownDefinition {
        name: EcoString,
        definition: EcoString,
    },

    #[error(transparent)]
    Instantiate(#[from] InstantiateError),
}

/// Index of an object in its [`ServiceModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Per-object pass status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u16 {
        const CONFIGURED = 1 << 0;
        const RELATION_CONFIGURED = 1 << 1;
        const CHECKED = 1 << 2;
        /// Carries the radio-service marker (directly or through its
        /// generic definition).
        const RADIO_SERVICE = 1 << 10;
    }
}

/// A dispatchable method of a marked interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMethod {
    pub name: EcoString,
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
    /// Never [`DispatchKind::Other`].
    pub kind: DispatchKind,
    /// Wrapped result type for the result-bearing kinds.
    pub result: Option<TypeRef>,
    /// Interface the broker implements this method against, as written in
    /// the explicit implementation (`ICalc`, `Demo.IBase`).
    pub interface: EcoString,
    pub location: Location,
}

/// One declared type and everything the passes computed for it.
#[derive(Debug, Clone)]
pub struct ServiceObject {
    id: ObjectId,
    pub declaration: TypeDeclaration,
    pub flags: ObjectFlags,
    pub parent: Option<ObjectId>,
    /// Generic definition for closed instantiations; the object itself
    /// otherwise.
    pub original: ObjectId,
    /// Inverse of containment, in relation order.
    pub children: Vec<ObjectId>,
    /// Instantiations sharing this definition (including itself when it is
    /// marked and not a template).
    pub constructed: Vec<ObjectId>,
    pub max_links: i32,
    pub class_name: EcoString,
    pub methods: Vec<ServiceMethod>,
}

impl ServiceObject {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn full_name(&self) -> &EcoString {
        &self.declaration.full_name
    }

    #[must_use]
    pub fn is_radio_service(&self) -> bool {
        self.flags.contains(ObjectFlags::RADIO_SERVICE)
    }

    #[must_use]
    pub fn is_open_generic(&self) -> bool {
        matches!(self.declaration.generics, Generics::Open { .. })
    }

    #[must_use]
    pub fn is_closed_generic(&self) -> bool {
        matches!(self.declaration.generics, Generics::Closed { .. })
    }
}

/// Arena of service objects for one generation pass.
#[derive(Debug, Default)]
pub struct ServiceModel {
    objects: Vec<ServiceObject>,
    by_name: HashMap<EcoString, ObjectId>,
    namespaces: IndexMap<EcoString, Vec<ObjectId>>,
}

impl ServiceModel {
    /// Builds the arena and resolves containment and generic definitions.
    ///
    /// Closed generic interfaces that an extension list names but the host
    /// did not declare are instantiated from their open definition.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] for duplicate names and for containing types
    /// or generic definitions that are not among `declarations`.
    pub fn build(declarations: Vec<TypeDeclaration>) -> Result<Self, ModelError> {
        let mut model = Self::default();
        for declaration in declarations {
            model.insert(declaration)?;
        }
        model.close_referenced_generics()?;

        for index in 0..model.objects.len() {
            let decl = &model.objects[index].declaration;
            let parent = match &decl.containing_type {
                Some(parent) => Some(model.lookup(parent).ok_or_else(|| {
                    ModelError::UnknownContainingType {
                        name: decl.full_name.clone(),
                        parent: parent.clone(),
                    }
                })?),
                None => None,
            };
            let original = match &decl.generics {
                Generics::Closed { definition, .. } => {
                    Some(model.lookup(definition).ok_or_else(|| {
                        ModelError::UnknownDefinition {
                            name: decl.full_name.clone(),
                            definition: definition.clone(),
                        }
                    })?)
                }
                _ => None,
            };
            let object = &mut model.objects[index];
            object.parent = parent;
            if let Some(original) = original {
                object.original = original;
            }
        }
        Ok(model)
    }

    fn insert(&mut self, declaration: TypeDeclaration) -> Result<ObjectId, ModelError> {
        let id = ObjectId(u32::try_from(self.objects.len()).unwrap_or(u32::MAX));
        if self.by_name.contains_key(&declaration.full_name) {
            return Err(ModelError::DuplicateType {
                name: declaration.full_name,
            });
        }
        self.by_name.insert(declaration.full_name.clone(), id);
        self.objects.push(ServiceObject {
            id,
            declaration,
            flags: ObjectFlags::empty(),
            parent: None,
            original: id,
            children: Vec::new(),
            constructed: Vec::new(),
            max_links: UNBOUNDED_LINKS,
            class_name: EcoString::new(),
            methods: Vec::new(),
        });
        Ok(id)
    }

    /// Declares every closed generic interface named by a non-template
    /// extension list whose name belongs to a declared generic family.
    /// Synthesized instantiations are scanned in turn.
    fn close_referenced_generics(&mut self) -> Result<(), ModelError> {
        let mut families: HashMap<EcoString, Vec<ObjectId>> = HashMap::new();
        for object in &self.objects {
            let name = object.full_name();
            let base = name.split_once('<').map_or(name.as_str(), |(base, _)| base);
            families.entry(base.into()).or_default().push(object.id);
        }

        let mut next = 0;
        while next < self.objects.len() {
            let object = &self.objects[next];
            next += 1;
            if object.is_open_generic() {
                continue;
            }
            let referenced: Vec<TypeRef> = object
                .declaration
                .interfaces
                .iter()
                .filter(|i| i.arity() > 0)
                .cloned()
                .collect();
            for interface in referenced {
                let name: EcoString = interface.to_string().into();
                if self.by_name.contains_key(&name) {
                    continue;
                }
                let Some(family) = families.get(interface.name()) else {
                    continue;
                };
                let definition = family.iter().copied().find(|&id| {
                    matches!(
                        &self.get(id).declaration.generics,
                        Generics::Open { parameters } if parameters.len() == interface.arity()
                    )
                });
                let Some(definition) = definition else {
                    return Err(ModelError::UnknownDefinition {
                        name,
                        definition: eco_format!(
                            "{}<{}>",
                            interface.name(),
                            ",".repeat(interface.arity() - 1)
                        ),
                    });
                };
                let closed = self.get(definition).declaration.close(interface.arguments())?;
                debug!(
                    %name,
                    definition = %self.get(definition).full_name(),
                    "Instantiated referenced generic"
                );
                self.insert(closed)?;
            }
        }
        Ok(())
    }

    /// Looks an object up by qualified name.
    #[must_use]
    pub fn lookup(&self, full_name: &str) -> Option<ObjectId> {
        self.by_name.get(full_name).copied()
    }

    /// Returns the object with `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from another model.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> &ServiceObject {
        &self.objects[id.index()]
    }

    fn get_mut(&mut self, id: ObjectId) -> &mut ServiceObject {
        &mut self.objects[id.index()]
    }

    /// Every object, in declaration order.
    pub fn objects(&self) -> impl Iterator<Item = &ServiceObject> {
        self.objects.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + use<> {
        (0..self.objects.len()).map(|i| ObjectId(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Root definitions grouped by namespace, in relation order.
    #[must_use]
    pub fn namespaces(&self) -> &IndexMap<EcoString, Vec<ObjectId>> {
        &self.namespaces
    }

    /// Containment ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: ObjectId) -> impl Iterator<Item = &ServiceObject> {
        std::iter::successors(self.get(id).parent.map(|p| self.get(p)), |o| {
            o.parent.map(|p| self.get(p))
        })
    }

    /// Transitive closure of the interfaces `id` extends: depth-first over
    /// declared extension lists, without duplicates. Names that are not
    /// declared take part by name only.
    #[must_use]
    pub fn all_interfaces(&self, id: ObjectId) -> Vec<TypeRef> {
        let mut seen = Vec::new();
        let mut stack: Vec<TypeRef> = self.get(id).declaration.interfaces.iter().rev().cloned().collect();
        while let Some(ty) = stack.pop() {
            if seen.contains(&ty) {
                continue;
            }
            if let Some(base) = self.lookup(&ty.to_string()) {
                stack.extend(self.get(base).declaration.interfaces.iter().rev().cloned());
            }
            seen.push(ty);
        }
        seen
    }
}
