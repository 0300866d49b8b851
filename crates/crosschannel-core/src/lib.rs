// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CrossChannel broker generator core.
//!
//! This crate turns declarations of *radio service* interfaces into C#
//! broker classes that fan a call out to every subscriber registered on a
//! runtime channel and aggregate the results:
//! - Declaration intake (JSON or in-memory, see [`declaration`])
//! - Object model construction and validation (see [`model`])
//! - Dispatch planning into a structured IR (see [`codegen::ir`])
//! - C# rendering and the registration/startup hook
//!
//! The generator is host-agnostic: a compiler front end (or a test) supplies
//! [`declaration::TypeDeclaration`]s and receives rendered source units plus
//! diagnostics.
//!
//! ```
//! use crosschannel_core::declaration::TypeDeclaration;
//! use crosschannel_core::diagnostics::Diagnostic;
//! use crosschannel_core::{CancellationToken, Generator, GeneratorOptions};
//!
//! let decls = vec![
//!     TypeDeclaration::interface("Demo", "IPing")
//!         .marked()
//!         .extends("CrossChannel.IRadioService")
//!         .method("Ping", "void", &["int"]),
//! ];
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! let generation = Generator::new(GeneratorOptions::default())
//!     .run(&decls, &CancellationToken::new(), &mut diagnostics)
//!     .unwrap();
//! assert!(diagnostics.is_empty());
//! assert!(generation.unit("gen.CrossChannel.Demo").is_some());
//! ```

pub mod cancel;
pub mod codegen;
pub mod declaration;
pub mod diagnostics;
pub mod generator;
pub mod model;
pub mod naming;
pub mod options;
pub mod output;
pub mod span;

pub use cancel::{CancellationToken, Cancelled};
pub use generator::{GenerateError, Generation, Generator, RunSummary};
pub use output::{GeneratedUnit, OutputSink};
pub use options::GeneratorOptions;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::declaration::{DeclarationSource, MethodDeclaration, TypeDeclaration, TypeRef};
    pub use crate::diagnostics::{Diagnostic, DiagnosticId, DiagnosticSink, Severity};
    pub use crate::model::{DispatchKind, ObjectId, ServiceModel};
    pub use crate::span::{Location, Span};
}
