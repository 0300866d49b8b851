// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Initializer routines.
//!
//! One routine per containment level registers the closed interfaces
//! directly owned at that level, then calls the routines of child levels
//! that received one. Open generic definitions never register eagerly; their
//! brokers carry a lazy self-registration helper instead.

use super::CodeGenError;
use super::ir::{InitializerRoutine, Registration};
use crate::declaration::Generics;
use crate::model::{ObjectId, ServiceModel, ServiceObject};
use ecow::{EcoString, eco_format};
use std::collections::HashSet;

pub(crate) struct RegistrationEmitter<'m> {
    model: &'m ServiceModel,
    /// Levels that received a routine.
    generated: HashSet<ObjectId>,
}

impl<'m> RegistrationEmitter<'m> {
    pub(crate) fn new(model: &'m ServiceModel) -> Self {
        Self {
            model,
            generated: HashSet::new(),
        }
    }

    /// Builds the routine for the level below `parent` (the root level when
    /// `None`). Nested levels with nothing to do, and levels inside an open
    /// generic type, get no routine.
    pub(crate) fn routine(
        &mut self,
        parent: Option<ObjectId>,
        level: &[ObjectId],
    ) -> Result<Option<InitializerRoutine>, CodeGenError> {
        if parent.is_some_and(|p| self.model.get(p).is_open_generic()) {
            return Ok(None);
        }

        let mut routine = InitializerRoutine::default();
        for &definition in level {
            for &constructed in &self.model.get(definition).constructed {
                let object = self.model.get(constructed);
                if object.is_radio_service() && !object.is_open_generic() {
                    routine.registrations.push(self.registration(object)?);
                }
            }
        }
        routine.child_calls = level
            .iter()
            .filter(|&&id| self.generated.contains(&id))
            .map(|&id| self.model.get(id).full_name().clone())
            .collect();

        match parent {
            None => Ok(Some(routine)),
            Some(_) if routine.is_empty() => Ok(None),
            Some(parent) => {
                self.generated.insert(parent);
                Ok(Some(routine))
            }
        }
    }

    /// Registration of a marked, non-template object.
    pub(crate) fn registration(&self, object: &ServiceObject) -> Result<Registration, CodeGenError> {
        let definition = self.model.get(object.original);
        let arguments = match &object.declaration.generics {
            Generics::Closed { arguments, .. } => {
                let rendered: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                eco_format!("<{}>", rendered.join(", "))
            }
            _ => EcoString::new(),
        };
        Ok(Registration {
            interface: object.full_name().clone(),
            broker: eco_format!("{}{arguments}", self.broker_path(definition)?),
            max_links: object.max_links,
        })
    }

    /// Lazy registration of an open generic definition over its own type
    /// parameters.
    pub(crate) fn self_registration(
        &self,
        definition: &ServiceObject,
    ) -> Result<Option<Registration>, CodeGenError> {
        let Generics::Open { parameters } = &definition.declaration.generics else {
            return Ok(None);
        };
        Ok(Some(Registration {
            interface: definition.full_name().clone(),
            broker: eco_format!(
                "{}<{}>",
                self.broker_path(definition)?,
                parameters.join(", ")
            ),
            max_links: definition.max_links,
        }))
    }

    /// Qualified broker class name without type arguments.
    fn broker_path(&self, definition: &ServiceObject) -> Result<EcoString, CodeGenError> {
        if definition.class_name.is_empty() {
            return Err(CodeGenError::Unchecked {
                name: definition.full_name().clone(),
            });
        }
        let scope = match definition.parent {
            Some(parent) => self.model.get(parent).full_name().clone(),
            None => definition.declaration.namespace.clone(),
        };
        Ok(if scope.is_empty() {
            definition.class_name.clone()
        } else {
            eco_format!("{scope}.{}", definition.class_name)
        })
    }
}
