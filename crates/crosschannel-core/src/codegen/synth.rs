// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Model to IR.
//!
//! Walks each namespace's root definitions depth-first over the containment
//! tree. A definition yields its broker (when marked) followed by a partial
//! scope holding its children and their initializer routine (when it is
//! partial and that scope has content).

use super::CodeGenError;
use super::ir::{
    BrokerClass, BrokerMethod, InitializerRoutine, Item, ModuleHook, NamespaceUnit, PartialScope,
    Program,
};
use super::plan::dispatch_body;
use super::registration::RegistrationEmitter;
use crate::cancel::CancellationToken;
use crate::declaration::Generics;
use crate::model::{ObjectId, ServiceModel};
use crate::options::GeneratorOptions;
use ecow::EcoString;
use tracing::{debug, instrument};

/// Incremental synthesizer: one namespace at a time, then the root routine.
pub struct Synthesizer<'m> {
    model: &'m ServiceModel,
    registrations: RegistrationEmitter<'m>,
    roots: Vec<ObjectId>,
}

impl<'m> Synthesizer<'m> {
    #[must_use]
    pub fn new(model: &'m ServiceModel) -> Self {
        Self {
            model,
            registrations: RegistrationEmitter::new(model),
            roots: Vec::new(),
        }
    }

    /// Synthesizes the unit for `namespace`. Returns `None` when nothing in
    /// it produces output.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenError`] on cancellation or when a marked object was
    /// never checked.
    #[instrument(skip(self, roots, cancel), fields(roots = roots.len()))]
    pub fn namespace_unit(
        &mut self,
        namespace: &EcoString,
        roots: &[ObjectId],
        cancel: &CancellationToken,
    ) -> Result<Option<NamespaceUnit>, CodeGenError> {
        let mut items = Vec::new();
        for &root in roots {
            cancel.check()?;
            items.extend(self.object_items(root)?);
        }
        self.roots.extend_from_slice(roots);
        if items.is_empty() {
            debug!("Namespace has no content");
            return Ok(None);
        }
        Ok(Some(NamespaceUnit {
            namespace: namespace.clone(),
            items,
        }))
    }

    /// The root routine over every root seen so far.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenError::Unchecked`] when a marked object was never
    /// checked.
    pub fn root_routine(&mut self) -> Result<InitializerRoutine, CodeGenError> {
        let roots = std::mem::take(&mut self.roots);
        Ok(self
            .registrations
            .routine(None, &roots)?
            .unwrap_or_default())
    }

    fn object_items(&mut self, id: ObjectId) -> Result<Vec<Item>, CodeGenError> {
        let model = self.model;
        let object = model.get(id);
        if object.constructed.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        if object.is_radio_service() {
            items.push(Item::Broker(self.broker_class(id)?));
        }
        if !object.declaration.is_partial {
            return Ok(items);
        }

        let mut nested = Vec::new();
        for &child in &object.children {
            nested.extend(self.object_items(child)?);
        }
        let initializer = if object.children.is_empty() {
            None
        } else {
            self.registrations.routine(Some(id), &object.children)?
        };
        if !nested.is_empty() || initializer.is_some() {
            items.push(Item::Scope(PartialScope {
                accessibility: object.declaration.accessibility,
                kind: object.declaration.kind,
                name: object.declaration.local_name(),
                items: nested,
                initializer,
            }));
        }
        Ok(items)
    }

    fn broker_class(&self, id: ObjectId) -> Result<BrokerClass, CodeGenError> {
        let object = self.model.get(id);
        if object.class_name.is_empty() {
            return Err(CodeGenError::Unchecked {
                name: object.full_name().clone(),
            });
        }
        let type_parameters = match &object.declaration.generics {
            Generics::Open { parameters } => parameters.clone(),
            _ => Vec::new(),
        };
        let methods = object
            .methods
            .iter()
            .filter_map(|method| {
                Some(BrokerMethod {
                    name: method.name.clone(),
                    interface: method.interface.clone(),
                    return_type: method.return_type.clone(),
                    parameters: method.parameters.clone(),
                    kind: method.kind,
                    body: dispatch_body(method)?,
                })
            })
            .collect();
        debug!(interface = %object.full_name(), class = %object.class_name, "Synthesized broker");
        Ok(BrokerClass {
            name: object.class_name.clone(),
            type_parameters,
            nested: object.parent.is_some(),
            interface: object.declaration.local_name(),
            methods,
            self_registration: self.registrations.self_registration(object)?,
        })
    }
}

/// The startup hook described by `options`.
#[must_use]
pub fn module_hook(options: &GeneratorOptions) -> ModuleHook {
    ModuleHook {
        namespace: options.module_namespace().into(),
        class_name: options.module_class_name(),
        use_module_initializer: options.use_module_initializer,
    }
}

/// Synthesizes the whole program in one go.
///
/// # Errors
///
/// Returns [`CodeGenError`] on cancellation or when a marked object was
/// never checked.
pub fn synthesize(
    model: &ServiceModel,
    options: &GeneratorOptions,
    cancel: &CancellationToken,
) -> Result<Program, CodeGenError> {
    let mut synthesizer = Synthesizer::new(model);
    let mut units = Vec::new();
    for (namespace, roots) in model.namespaces() {
        cancel.check()?;
        if let Some(unit) = synthesizer.namespace_unit(namespace, roots, cancel)? {
            units.push(unit);
        }
    }
    Ok(Program {
        units,
        root: synthesizer.root_routine()?,
        module: module_hook(options),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ir::Registration;
    use crate::declaration::TypeDeclaration;
    use crate::diagnostics::{Diagnostic, DiagnosticBag};
    use crate::model::Prepared;

    fn program(decls: Vec<TypeDeclaration>) -> Program {
        let mut model = ServiceModel::build(decls).unwrap();
        let mut sink: Vec<Diagnostic> = Vec::new();
        assert_eq!(
            model.prepare(&mut DiagnosticBag::new(), &mut sink),
            Prepared::Ready
        );
        synthesize(&model, &GeneratorOptions::default(), &CancellationToken::new()).unwrap()
    }

    fn marked(ns: &str, path: &str) -> TypeDeclaration {
        TypeDeclaration::interface(ns, path)
            .marked()
            .extends("CrossChannel.IRadioService")
    }

    #[test]
    fn root_broker_registered_from_root_routine() {
        let program = program(vec![marked("Demo", "IPing").method("Ping", "void", &["int"])]);
        assert_eq!(program.units.len(), 1);
        let Item::Broker(broker) = &program.units[0].items[0] else {
            panic!("expected broker");
        };
        assert!(!broker.nested);
        assert_eq!(broker.interface, "IPing");
        assert_eq!(broker.methods.len(), 1);
        assert_eq!(
            program.root.registrations,
            vec![Registration {
                interface: "Demo.IPing".into(),
                broker: format!("Demo.{}", broker.name).into(),
                max_links: i32::MAX,
            }]
        );
        assert!(program.root.child_calls.is_empty());
    }

    #[test]
    fn nested_broker_lives_in_partial_scope() {
        let program = program(vec![
            TypeDeclaration::class("Demo", "Outer").partial(),
            marked("Demo", "Outer.ICalc")
                .method("Add", "CrossChannel.RadioResult<int>", &["int", "int"]),
        ]);
        let [Item::Scope(scope)] = program.units[0].items.as_slice() else {
            panic!("expected one scope");
        };
        assert_eq!(scope.name, "Outer");
        let Item::Broker(broker) = &scope.items[0] else {
            panic!("expected broker");
        };
        assert!(broker.nested);
        let routine = scope.initializer.as_ref().unwrap();
        assert_eq!(routine.registrations[0].interface, "Demo.Outer.ICalc");
        assert!(routine.registrations[0].broker.starts_with("Demo.Outer.__ICalc_Broker_"));
        assert_eq!(program.root.child_calls, vec![EcoString::from("Demo.Outer")]);
        assert!(program.root.registrations.is_empty());
    }

    #[test]
    fn non_partial_parent_emits_nothing_inside() {
        let mut model = ServiceModel::build(vec![
            TypeDeclaration::class("Demo", "Outer"),
            marked("Demo", "Outer.IA"),
        ])
        .unwrap();
        let mut sink: Vec<Diagnostic> = Vec::new();
        model.prepare(&mut DiagnosticBag::new(), &mut sink);
        assert_eq!(sink.len(), 1);
        let program =
            synthesize(&model, &GeneratorOptions::default(), &CancellationToken::new()).unwrap();
        assert!(program.units.is_empty());
        assert!(program.root.is_empty());
    }

    #[test]
    fn open_generic_registers_closed_instantiations() {
        let open = marked("Demo", "IGen")
            .open_generic(&["T"])
            .method("Get", "CrossChannel.RadioResult<T>", &[]);
        let closed = open.instantiate(&["int"]);
        let program = program(vec![open, closed]);

        let Item::Broker(broker) = &program.units[0].items[0] else {
            panic!("expected broker");
        };
        assert_eq!(broker.type_parameters, vec![EcoString::from("T")]);
        assert_eq!(broker.interface, "IGen<T>");
        let lazy = broker.self_registration.as_ref().unwrap();
        assert_eq!(lazy.interface, "Demo.IGen<T>");
        assert_eq!(lazy.broker.as_str(), format!("Demo.{}<T>", broker.name));

        assert_eq!(program.root.registrations.len(), 1);
        let eager = &program.root.registrations[0];
        assert_eq!(eager.interface, "Demo.IGen<int>");
        assert_eq!(eager.broker.as_str(), format!("Demo.{}<int>", broker.name));
    }

    #[test]
    fn nothing_below_open_generic_parent_registers() {
        let boxed = TypeDeclaration::class("Demo", "Box")
            .open_generic(&["T"])
            .partial();
        let inner = marked("Demo", "IInner")
            .nested_in(&boxed)
            .method("Go", "void", &[]);
        let program = program(vec![boxed, inner]);
        let [Item::Scope(scope)] = program.units[0].items.as_slice() else {
            panic!("expected one scope");
        };
        assert_eq!(scope.name, "Box<T>");
        assert!(scope.initializer.is_none());
        assert!(program.root.is_empty());
    }

    #[test]
    fn cancelled_synthesis_stops() {
        let mut model = ServiceModel::build(vec![marked("Demo", "IA")]).unwrap();
        model.prepare(&mut DiagnosticBag::new(), &mut Vec::<Diagnostic>::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = synthesize(&model, &GeneratorOptions::default(), &cancel).unwrap_err();
        assert!(matches!(err, CodeGenError::Cancelled(_)));
    }

    #[test]
    fn unprepared_model_is_an_error() {
        let mut model = ServiceModel::build(vec![marked("Demo", "IA")]).unwrap();
        let mut bag = DiagnosticBag::new();
        let id = model.lookup("Demo.IA").unwrap();
        model.configure(id, &mut bag);
        model.configure_relation(id);
        let err =
            synthesize(&model, &GeneratorOptions::default(), &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, CodeGenError::Unchecked { .. }));
    }
}
