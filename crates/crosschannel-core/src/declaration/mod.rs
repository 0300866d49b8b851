// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Host-facing declaration model.
//!
//! **DDD Context:** Declaration Intake
//!
//! The generator never talks to a compiler's symbol table directly. A host
//! (a compiler plugin, a build script, a test) describes every relevant type
//! as a [`TypeDeclaration`]: its names, containment, generic shape, the
//! interfaces it extends, its attributes and its methods. The object model
//! resolves relations between declarations by qualified name.
//!
//! Declarations can be built fluently:
//!
//! ```
//! use crosschannel_core::declaration::{TypeDeclaration, TypeKind};
//!
//! let outer = TypeDeclaration::class("Demo", "Outer").partial();
//! let calc = TypeDeclaration::interface("Demo", "Outer.ICalc")
//!     .marked_with_max_links(4)
//!     .extends("CrossChannel.IRadioService")
//!     .method("Add", "CrossChannel.RadioResult<int>", &["int", "int"]);
//!
//! assert_eq!(calc.full_name, "Demo.Outer.ICalc");
//! assert_eq!(calc.containing_type.as_deref(), Some("Demo.Outer"));
//! assert_eq!(outer.kind, TypeKind::Class);
//! ```
//!
//! or read from JSON through [`JsonDeclarations`] / [`DeclarationFile`].

mod json;
mod type_ref;

pub use json::{DeclarationFile, JsonDeclarations};
pub use type_ref::{TypeRef, TypeRefParseError};

use crate::span::Location;
use ecow::{EcoString, eco_format};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Qualified name of the marker attribute that requests broker generation.
pub const RADIO_SERVICE_INTERFACE_ATTRIBUTE: &str = "CrossChannel.RadioServiceInterfaceAttribute";

/// Qualified name of the attribute carrying generator options.
pub const GENERATOR_OPTION_ATTRIBUTE: &str = "CrossChannel.CrossChannelGeneratorOptionAttribute";

/// Qualified name of the base capability every marked interface must extend.
pub const RADIO_SERVICE_INTERFACE: &str = "CrossChannel.IRadioService";

/// Errors raised while reading declarations from a host.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The declaration file could not be read.
    #[error("failed to read declarations from '{path}'")]
    Io {
        path: camino::Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The declaration text is not valid JSON for the declaration schema.
    #[error("malformed declarations: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while closing an open generic definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiateError {
    #[error("'{name}' is not an open generic definition")]
    NotOpen { name: EcoString },

    #[error("'{name}' takes {expected} type argument(s), found {found}")]
    Arity {
        name: EcoString,
        expected: usize,
        found: usize,
    },

    #[error("invalid generic argument '{argument}': {source}")]
    Argument {
        argument: EcoString,
        #[source]
        source: TypeRefParseError,
    },
}

/// Supplies the declarations for one generation pass.
pub trait DeclarationSource {
    /// Returns every declared type in a stable order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the declarations cannot be produced.
    fn declarations(&self) -> Result<Vec<TypeDeclaration>, SourceError>;
}

impl DeclarationSource for [TypeDeclaration] {
    fn declarations(&self) -> Result<Vec<TypeDeclaration>, SourceError> {
        Ok(self.to_vec())
    }
}

impl DeclarationSource for Vec<TypeDeclaration> {
    fn declarations(&self) -> Result<Vec<TypeDeclaration>, SourceError> {
        Ok(self.clone())
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Interface,
    Class,
    Struct,
    Record,
}

impl TypeKind {
    /// The C# keyword used in a partial declaration.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Interface => "interface",
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Record => "record",
        }
    }
}

/// Declared accessibility of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    Private,
    PrivateProtected,
}

impl Accessibility {
    /// The C# modifier text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Private => "private",
            Accessibility::PrivateProtected => "private protected",
        }
    }
}

/// Generic shape of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Generics {
    #[default]
    NotGeneric,
    /// An unbound generic definition, e.g. `IGen<T>`.
    Open { parameters: Vec<EcoString> },
    /// A closed instantiation, e.g. `IGen<int>` constructed from `Demo.IGen<T>`.
    Closed {
        definition: EcoString,
        arguments: Vec<TypeRef>,
    },
}

/// A value passed to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(EcoString),
}

/// An attribute applied to a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDeclaration {
    /// Qualified attribute class name.
    pub name: EcoString,
    #[serde(default)]
    pub arguments: Vec<AttributeValue>,
    #[serde(default)]
    pub named_arguments: IndexMap<EcoString, AttributeValue>,
    #[serde(default)]
    pub location: Location,
}

impl AttributeDeclaration {
    /// Creates an attribute with no arguments.
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            named_arguments: IndexMap::new(),
            location: Location::default(),
        }
    }

    /// Adds a named argument.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<EcoString>, value: AttributeValue) -> Self {
        self.named_arguments.insert(name.into(), value);
        self
    }

    /// Returns true if this attribute is `qualified`, with or without the
    /// conventional `Attribute` suffix.
    #[must_use]
    pub fn is(&self, qualified: &str) -> bool {
        if self.name == qualified {
            return true;
        }
        qualified
            .strip_suffix("Attribute")
            .is_some_and(|short| self.name == short)
    }

    /// Looks up a named argument.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&AttributeValue> {
        self.named_arguments.get(name)
    }
}

/// A method declared on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: EcoString,
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    /// Qualified name of the declaring type. `None` means the type the
    /// method is listed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_in: Option<EcoString>,
    #[serde(default)]
    pub location: Location,
}

impl MethodDeclaration {
    /// Creates a method from C# type syntax.
    ///
    /// # Panics
    ///
    /// Panics if `return_type` or a parameter is not valid type syntax. Use
    /// [`MethodDeclaration::try_new`] for untrusted input.
    #[must_use]
    pub fn new(name: &str, return_type: &str, parameters: &[&str]) -> Self {
        match Self::try_new(name, return_type, parameters) {
            Ok(method) => method,
            Err(e) => panic!("invalid type syntax in method '{name}': {e}"),
        }
    }

    /// Creates a method from C# type syntax.
    ///
    /// # Errors
    ///
    /// Returns [`TypeRefParseError`] if any type fails to parse.
    pub fn try_new(
        name: &str,
        return_type: &str,
        parameters: &[&str],
    ) -> Result<Self, TypeRefParseError> {
        Ok(Self {
            name: name.into(),
            return_type: return_type.parse()?,
            parameters: parameters
                .iter()
                .map(|p| p.parse())
                .collect::<Result<_, _>>()?,
            declared_in: None,
            location: Location::default(),
        })
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// A declared type: an interface to broker, or a type that contains one,
/// or a base interface contributing inherited methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Simple name without namespace or generic parameters (`ICalc`).
    pub name: EcoString,
    /// Qualified name including generic parameters or arguments. This is the
    /// identity key (`Demo.Outer.ICalc`, `Demo.IGen<T>`, `Demo.IGen<int>`).
    pub full_name: EcoString,
    #[serde(default)]
    pub namespace: EcoString,
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_partial: bool,
    /// Qualified name of the enclosing type, if nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<EcoString>,
    #[serde(default)]
    pub generics: Generics,
    /// Directly extended interfaces.
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub attributes: Vec<AttributeDeclaration>,
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
    #[serde(default)]
    pub location: Location,
}

impl TypeDeclaration {
    /// Declares a type at `path` inside `namespace`. A dotted path nests the
    /// type inside the types named by the leading segments.
    #[must_use]
    pub fn new(kind: TypeKind, namespace: &str, path: &str) -> Self {
        let (containing_path, name) = match path.rsplit_once('.') {
            Some((outer, name)) => (Some(outer), name),
            None => (None, path),
        };
        Self {
            name: name.into(),
            full_name: qualify(namespace, path),
            namespace: namespace.into(),
            kind,
            accessibility: Accessibility::Public,
            is_partial: false,
            containing_type: containing_path.map(|outer| qualify(namespace, outer)),
            generics: Generics::NotGeneric,
            interfaces: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
            location: Location::default(),
        }
    }

    /// Declares an interface.
    #[must_use]
    pub fn interface(namespace: &str, path: &str) -> Self {
        Self::new(TypeKind::Interface, namespace, path)
    }

    /// Declares a class.
    #[must_use]
    pub fn class(namespace: &str, path: &str) -> Self {
        Self::new(TypeKind::Class, namespace, path)
    }

    /// Marks the declaration `partial`.
    #[must_use]
    pub fn partial(mut self) -> Self {
        self.is_partial = true;
        self
    }

    /// Sets the declared accessibility.
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Applies the radio-service marker with the default link bound.
    #[must_use]
    pub fn marked(self) -> Self {
        self.with_attribute(AttributeDeclaration::new(RADIO_SERVICE_INTERFACE_ATTRIBUTE))
    }

    /// Applies the radio-service marker with an explicit `MaxLinks`.
    #[must_use]
    pub fn marked_with_max_links(self, max_links: i64) -> Self {
        self.with_attribute(
            AttributeDeclaration::new(RADIO_SERVICE_INTERFACE_ATTRIBUTE)
                .with_named("MaxLinks", AttributeValue::Int(max_links)),
        )
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeDeclaration) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds a directly extended interface.
    ///
    /// # Panics
    ///
    /// Panics if `interface` is not valid type syntax. Use
    /// [`TypeDeclaration::try_extends`] for untrusted input.
    #[must_use]
    pub fn extends(self, interface: &str) -> Self {
        match self.try_extends(interface) {
            Ok(decl) => decl,
            Err(e) => panic!("invalid interface '{interface}': {e}"),
        }
    }

    /// Adds a directly extended interface.
    ///
    /// # Errors
    ///
    /// Returns [`TypeRefParseError`] if `interface` fails to parse.
    pub fn try_extends(mut self, interface: &str) -> Result<Self, TypeRefParseError> {
        self.interfaces.push(interface.parse()?);
        Ok(self)
    }

    /// Adds a method from C# type syntax. See [`MethodDeclaration::new`].
    ///
    /// # Panics
    ///
    /// Panics on invalid type syntax. Use [`TypeDeclaration::try_method`]
    /// for untrusted input.
    #[must_use]
    pub fn method(self, name: &str, return_type: &str, parameters: &[&str]) -> Self {
        self.with_method(MethodDeclaration::new(name, return_type, parameters))
    }

    /// Adds a method from C# type syntax.
    ///
    /// # Errors
    ///
    /// Returns [`TypeRefParseError`] if any type fails to parse.
    pub fn try_method(
        self,
        name: &str,
        return_type: &str,
        parameters: &[&str],
    ) -> Result<Self, TypeRefParseError> {
        Ok(self.with_method(MethodDeclaration::try_new(name, return_type, parameters)?))
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }

    /// Moves the declaration inside `parent`.
    #[must_use]
    pub fn nested_in(mut self, parent: &TypeDeclaration) -> Self {
        self.namespace = parent.namespace.clone();
        self.full_name = eco_format!("{}.{}", parent.full_name, self.local_name());
        self.containing_type = Some(parent.full_name.clone());
        self
    }

    /// Turns the declaration into an open generic definition.
    #[must_use]
    pub fn open_generic(mut self, parameters: &[&str]) -> Self {
        self.full_name = eco_format!("{}<{}>", self.full_name, parameters.join(", "));
        self.generics = Generics::Open {
            parameters: parameters.iter().map(|p| EcoString::from(*p)).collect(),
        };
        self
    }

    /// Builds the closed instantiation of this open definition over
    /// `arguments`. Methods are copied with type parameters substituted.
    ///
    /// # Panics
    ///
    /// Panics where [`TypeDeclaration::try_instantiate`] fails.
    #[must_use]
    pub fn instantiate(&self, arguments: &[&str]) -> Self {
        match self.try_instantiate(arguments) {
            Ok(closed) => closed,
            Err(e) => panic!("cannot instantiate '{}': {e}", self.full_name),
        }
    }

    /// Builds the closed instantiation of this open definition over
    /// `arguments` written in C# type syntax.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiateError`] if `self` is not an open definition, the
    /// argument count differs from the parameter count, or an argument fails
    /// to parse.
    pub fn try_instantiate(&self, arguments: &[&str]) -> Result<Self, InstantiateError> {
        let arguments = arguments
            .iter()
            .map(|a| {
                a.parse::<TypeRef>().map_err(|source| InstantiateError::Argument {
                    argument: (*a).into(),
                    source,
                })
            })
            .collect::<Result<Vec<TypeRef>, _>>()?;
        self.close(&arguments)
    }

    /// Builds the closed instantiation of this open definition over parsed
    /// `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiateError`] if `self` is not an open definition or
    /// the argument count differs from the parameter count.
    pub fn close(&self, arguments: &[TypeRef]) -> Result<Self, InstantiateError> {
        let Generics::Open { parameters } = &self.generics else {
            return Err(InstantiateError::NotOpen {
                name: self.full_name.clone(),
            });
        };
        if parameters.len() != arguments.len() {
            return Err(InstantiateError::Arity {
                name: self.full_name.clone(),
                expected: parameters.len(),
                found: arguments.len(),
            });
        }
        let substitute = |ty: &TypeRef| substitute(ty, parameters, arguments);

        let base = self
            .full_name
            .split_once('<')
            .map_or(self.full_name.as_str(), |(base, _)| base);
        let rendered: Vec<String> = arguments.iter().map(ToString::to_string).collect();

        let mut closed = self.clone();
        closed.full_name = eco_format!("{base}<{}>", rendered.join(", "));
        closed.generics = Generics::Closed {
            definition: self.full_name.clone(),
            arguments: arguments.to_vec(),
        };
        closed.attributes = Vec::new();
        closed.interfaces = self.interfaces.iter().map(substitute).collect();
        for method in &mut closed.methods {
            method.return_type = substitute(&method.return_type);
            method.parameters = method.parameters.iter().map(substitute).collect();
            if method.declared_in.is_some() {
                method.declared_in = Some(closed.full_name.clone());
            }
        }
        Ok(closed)
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Name as written inside its enclosing scope, with generic parameters
    /// or arguments (`ICalc`, `IGen<T>`, `IGen<int>`).
    #[must_use]
    pub fn local_name(&self) -> EcoString {
        match &self.generics {
            Generics::NotGeneric => self.name.clone(),
            Generics::Open { parameters } => eco_format!("{}<{}>", self.name, parameters.join(", ")),
            Generics::Closed { arguments, .. } => {
                let args: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                eco_format!("{}<{}>", self.name, args.join(", "))
            }
        }
    }

    /// Returns the first attribute matching `qualified`.
    #[must_use]
    pub fn attribute(&self, qualified: &str) -> Option<&AttributeDeclaration> {
        self.attributes.iter().find(|a| a.is(qualified))
    }
}

fn qualify(namespace: &str, path: &str) -> EcoString {
    if namespace.is_empty() {
        path.into()
    } else {
        eco_format!("{namespace}.{path}")
    }
}

fn substitute(ty: &TypeRef, parameters: &[EcoString], arguments: &[TypeRef]) -> TypeRef {
    let base = match parameters.iter().position(|p| p == ty.name()) {
        Some(i) if ty.arity() == 0 => arguments[i].clone(),
        _ => TypeRef::generic(
            ty.name(),
            ty.arguments()
                .iter()
                .map(|a| substitute(a, parameters, arguments))
                .collect(),
        ),
    };
    base.with_suffix(ty.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_path_implies_containment() {
        let decl = TypeDeclaration::interface("Demo", "Outer.Inner.IFoo");
        assert_eq!(decl.name, "IFoo");
        assert_eq!(decl.full_name, "Demo.Outer.Inner.IFoo");
        assert_eq!(decl.containing_type.as_deref(), Some("Demo.Outer.Inner"));
    }

    #[test]
    fn global_namespace_has_bare_names() {
        let decl = TypeDeclaration::interface("", "IFoo");
        assert_eq!(decl.full_name, "IFoo");
        assert!(decl.containing_type.is_none());
    }

    #[test]
    fn attribute_matches_with_or_without_suffix() {
        let long = AttributeDeclaration::new("CrossChannel.RadioServiceInterfaceAttribute");
        let short = AttributeDeclaration::new("CrossChannel.RadioServiceInterface");
        let other = AttributeDeclaration::new("Demo.RadioServiceInterface");
        assert!(long.is(RADIO_SERVICE_INTERFACE_ATTRIBUTE));
        assert!(short.is(RADIO_SERVICE_INTERFACE_ATTRIBUTE));
        assert!(!other.is(RADIO_SERVICE_INTERFACE_ATTRIBUTE));
    }

    #[test]
    fn instantiate_substitutes_type_parameters() {
        let open = TypeDeclaration::interface("Demo", "IGen")
            .open_generic(&["T"])
            .marked()
            .extends("CrossChannel.IRadioService")
            .method("Get", "CrossChannel.RadioResult<T>", &["T", "T[]"]);
        assert_eq!(open.full_name, "Demo.IGen<T>");
        assert_eq!(open.local_name(), "IGen<T>");

        let closed = open.instantiate(&["int"]);
        assert_eq!(closed.full_name, "Demo.IGen<int>");
        assert_eq!(closed.local_name(), "IGen<int>");
        assert!(closed.attributes.is_empty());
        assert_eq!(
            closed.generics,
            Generics::Closed {
                definition: "Demo.IGen<T>".into(),
                arguments: vec![TypeRef::simple("int")],
            }
        );
        let method = &closed.methods[0];
        assert_eq!(method.return_type.to_string(), "CrossChannel.RadioResult<int>");
        assert_eq!(method.parameters[0].to_string(), "int");
        assert_eq!(method.parameters[1].to_string(), "int[]");
    }

    #[test]
    fn try_new_rejects_bad_syntax() {
        assert!(MethodDeclaration::try_new("M", "Task<", &[]).is_err());
        assert!(MethodDeclaration::try_new("M", "void", &["int", ">"]).is_err());
    }

    #[test]
    fn fallible_builders_report_bad_syntax() {
        let decl = TypeDeclaration::interface("Demo", "IFoo");
        assert!(decl.clone().try_extends("IBar<").is_err());
        assert!(decl.clone().try_method("M", "void", &["(int"]).is_err());

        let built = decl
            .try_extends("CrossChannel.IRadioService")
            .and_then(|d| d.try_method("M", "void", &["int"]))
            .unwrap();
        assert_eq!(built.interfaces[0].to_string(), "CrossChannel.IRadioService");
        assert_eq!(built.methods[0].parameters[0].to_string(), "int");
    }

    #[test]
    fn try_instantiate_rejects_misuse() {
        let plain = TypeDeclaration::interface("Demo", "IFoo");
        assert_eq!(
            plain.try_instantiate(&["int"]),
            Err(InstantiateError::NotOpen {
                name: "Demo.IFoo".into()
            })
        );

        let open = TypeDeclaration::interface("Demo", "IPair").open_generic(&["K", "V"]);
        assert_eq!(
            open.try_instantiate(&["int"]),
            Err(InstantiateError::Arity {
                name: "Demo.IPair<K, V>".into(),
                expected: 2,
                found: 1,
            })
        );
        assert!(matches!(
            open.try_instantiate(&["int", "List<"]),
            Err(InstantiateError::Argument { argument, .. }) if argument == "List<"
        ));
        assert_eq!(
            open.try_instantiate(&["int", "string"]).unwrap().full_name,
            "Demo.IPair<int, string>"
        );
    }
}
