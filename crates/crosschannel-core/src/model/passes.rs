// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Configure, relation and check passes.
//!
//! Each pass is flag-gated per object, so reaching an object again through a
//! second graph edge is a no-op.

use super::{ObjectFlags, ObjectId, ServiceMethod, ServiceModel, UNBOUNDED_LINKS, classify};
use crate::declaration::{
    AttributeValue, Generics, MethodDeclaration, RADIO_SERVICE_INTERFACE,
    RADIO_SERVICE_INTERFACE_ATTRIBUTE,
};
use crate::diagnostics::{DiagnosticBag, DiagnosticKind, DiagnosticSink};
use crate::model::DispatchKind;
use crate::naming::broker_class_name;
use ecow::{EcoString, eco_format};
use tracing::{debug, instrument};

/// Outcome of [`ServiceModel::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    /// The model is ready for synthesis.
    Ready,
    /// A fatal diagnostic was reported; nothing may be emitted.
    Aborted,
}

impl ServiceModel {
    /// Runs all passes over every object, flushing diagnostics to `sink`
    /// after configure + relation and again after check.
    #[instrument(skip_all, fields(objects = self.len()))]
    pub fn prepare(&mut self, bag: &mut DiagnosticBag, sink: &mut dyn DiagnosticSink) -> Prepared {
        let ids: Vec<ObjectId> = self.ids().collect();
        for &id in &ids {
            self.configure(id, bag);
        }
        for &id in &ids {
            if self.get(id).is_radio_service() {
                self.configure_relation(id);
            }
        }
        bag.flush(sink);
        if bag.is_aborted() {
            return Prepared::Aborted;
        }

        for &id in &ids {
            self.check(id, bag);
        }
        bag.flush(sink);
        if bag.is_aborted() {
            debug!("Fatal diagnostic reported, skipping output");
            return Prepared::Aborted;
        }
        Prepared::Ready
    }

    /// Reads the marker attribute and records the link bound.
    ///
    /// A closed instantiation without a marker of its own takes its
    /// definition's.
    pub fn configure(&mut self, id: ObjectId, bag: &mut DiagnosticBag) {
        if self.get(id).flags.contains(ObjectFlags::CONFIGURED) {
            return;
        }
        self.get_mut(id).flags |= ObjectFlags::CONFIGURED;

        let object = self.get(id);
        let marker = object
            .declaration
            .attribute(RADIO_SERVICE_INTERFACE_ATTRIBUTE)
            .or_else(|| match &object.declaration.generics {
                Generics::Closed { .. } => self
                    .get(object.original)
                    .declaration
                    .attribute(RADIO_SERVICE_INTERFACE_ATTRIBUTE),
                _ => None,
            });
        let Some(marker) = marker else {
            return;
        };

        let max_links = match marker.named("MaxLinks") {
            None => UNBOUNDED_LINKS,
            Some(AttributeValue::Int(n)) if *n > 0 => i32::try_from(*n).unwrap_or_else(|_| {
                bag.add(
                    DiagnosticKind::InvalidMaxLinks {
                        found: eco_format!("{n}"),
                    },
                    &marker.location,
                );
                UNBOUNDED_LINKS
            }),
            Some(other) => {
                let found = match other {
                    AttributeValue::Bool(b) => eco_format!("{b}"),
                    AttributeValue::Int(n) => eco_format!("{n}"),
                    AttributeValue::String(s) => s.clone(),
                };
                bag.add(DiagnosticKind::InvalidMaxLinks { found }, &marker.location);
                UNBOUNDED_LINKS
            }
        };

        debug!(object = %object.full_name(), max_links, "Configured radio service");
        let object = self.get_mut(id);
        object.flags |= ObjectFlags::RADIO_SERVICE;
        object.max_links = max_links;
    }

    /// Links the object into the containment tree and its definition's
    /// instantiation list.
    pub fn configure_relation(&mut self, id: ObjectId) {
        if self.get(id).flags.contains(ObjectFlags::RELATION_CONFIGURED) {
            return;
        }
        self.get_mut(id).flags |= ObjectFlags::RELATION_CONFIGURED;

        let original = self.get(id).original;
        if original != id {
            self.configure_relation(original);
        }

        match self.get(original).parent {
            None => {
                let namespace = self.get(original).declaration.namespace.clone();
                let roots = self.namespaces.entry(namespace).or_default();
                if !roots.contains(&original) {
                    roots.push(original);
                }
            }
            Some(parent) => {
                self.configure_relation(parent);
                let children = &mut self.get_mut(parent).children;
                if !children.contains(&original) {
                    children.push(original);
                }
            }
        }

        let constructed = &mut self.get_mut(original).constructed;
        if !constructed.contains(&id) {
            constructed.push(id);
        }
    }

    /// Validates a marked object and collects its dispatchable methods.
    pub fn check(&mut self, id: ObjectId, bag: &mut DiagnosticBag) {
        if self.get(id).flags.contains(ObjectFlags::CHECKED) {
            return;
        }
        self.get_mut(id).flags |= ObjectFlags::CHECKED;

        let object = self.get(id);
        if !object.is_radio_service() {
            return;
        }

        let interfaces = self.all_interfaces(id);
        if !interfaces.iter().any(|i| i.is_definition(RADIO_SERVICE_INTERFACE, 0)) {
            bag.add(DiagnosticKind::MissingRadioService, &object.declaration.location);
            return;
        }

        for ancestor in self.ancestors(id) {
            if !ancestor.declaration.is_partial {
                bag.add(
                    DiagnosticKind::NotPartialParent {
                        parent: ancestor.full_name().clone(),
                    },
                    &ancestor.declaration.location,
                );
            }
        }

        let class_name = broker_class_name(&object.declaration.name, object.full_name());

        let mut collector = MethodCollector::default();
        let own_name = object.declaration.local_name();
        let definition = self.get(object.original).full_name();
        for (slot, method) in object.declaration.methods.iter().enumerate() {
            let declared_in = method.declared_in.as_ref().unwrap_or(object.full_name());
            if declared_in == object.full_name() {
                let origin = Origin {
                    interface: &own_name,
                    declaring: object.full_name(),
                    definition,
                    slot,
                };
                collector.add(method, &origin, bag);
            }
        }
        for interface in &interfaces {
            let name = interface.to_string();
            let Some(base) = self.lookup(&name) else {
                continue;
            };
            let base = self.get(base);
            let definition = self.get(base.original).full_name();
            for (slot, method) in base.declaration.methods.iter().enumerate() {
                let declared_in = method.declared_in.as_ref().unwrap_or(base.full_name());
                if declared_in == base.full_name() {
                    let origin = Origin {
                        interface: &name,
                        declaring: base.full_name(),
                        definition,
                        slot,
                    };
                    collector.add(method, &origin, bag);
                }
            }
        }

        debug!(
            object = %object.full_name(),
            %class_name,
            methods = collector.methods.len(),
            "Checked radio service"
        );
        let methods = collector.methods;
        let object = self.get_mut(id);
        object.class_name = class_name;
        object.methods = methods;
    }
}

/// Where a collected method comes from.
struct Origin<'a> {
    /// Interface qualifier of the explicit implementation.
    interface: &'a str,
    declaring: &'a EcoString,
    /// Generic definition of `declaring`, or `declaring` itself.
    definition: &'a EcoString,
    /// Position of the method in the declaring type.
    slot: usize,
}

#[derive(Default)]
struct MethodCollector {
    methods: Vec<ServiceMethod>,
    /// (name, parameters) -> declaring interface of the first occurrence.
    signatures: Vec<(EcoString, Vec<String>, EcoString)>,
}

impl MethodCollector {
    fn add(
        &mut self,
        method: &MethodDeclaration,
        origin: &Origin<'_>,
        bag: &mut DiagnosticBag,
    ) {
        let declaring = origin.declaring;
        let parameters: Vec<String> = method.parameters.iter().map(ToString::to_string).collect();
        if let Some((_, _, first)) = self
            .signatures
            .iter()
            .find(|(name, params, _)| *name == method.name && *params == parameters)
        {
            bag.add(
                DiagnosticKind::DuplicateInheritedMethod {
                    method: method.name.clone(),
                    first: first.clone(),
                    second: declaring.clone(),
                },
                &method.location,
            );
            return;
        }
        self.signatures
            .push((method.name.clone(), parameters, declaring.clone()));

        let classification = classify(&method.return_type);
        if classification.kind == DispatchKind::Other {
            bag.add(
                DiagnosticKind::UnsupportedReturnType {
                    method: method.name.clone(),
                    definition: origin.definition.clone(),
                    slot: origin.slot,
                },
                &method.location,
            );
            return;
        }
        if bag.is_aborted() {
            return;
        }
        self.methods.push(ServiceMethod {
            name: method.name.clone(),
            parameters: method.parameters.clone(),
            return_type: method.return_type.clone(),
            kind: classification.kind,
            result: classification.result,
            interface: origin.interface.into(),
            location: method.location.clone(),
        });
    }
}
