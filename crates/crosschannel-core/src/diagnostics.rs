// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generator diagnostics.
//!
//! **DDD Context:** Object Model Builder
//!
//! Passes never stop at the first problem. They push [`DiagnosticKind`]s into
//! a [`DiagnosticBag`], which batches them and hands them to the host's
//! [`DiagnosticSink`] at two checkpoints: after configure + relation, and
//! after check. A fatal diagnostic sets the abort flag and no output is
//! produced for the pass.

use crate::span::Location;
use ecow::EcoString;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Aborts all output for the pass.
    Fatal,
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// Stable diagnostic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DiagnosticId {
    #[serde(rename = "CCG001")]
    NotPartialParent,
    #[serde(rename = "CCG002")]
    MissingRadioService,
    #[serde(rename = "CCG003")]
    UnsupportedReturnType,
    #[serde(rename = "CCG004")]
    DuplicateInheritedMethod,
    #[serde(rename = "CCG005")]
    InvalidMaxLinks,
}

impl DiagnosticId {
    /// The `CCGnnn` code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticId::NotPartialParent => "CCG001",
            DiagnosticId::MissingRadioService => "CCG002",
            DiagnosticId::UnsupportedReturnType => "CCG003",
            DiagnosticId::DuplicateInheritedMethod => "CCG004",
            DiagnosticId::InvalidMaxLinks => "CCG005",
        }
    }

    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticId::MissingRadioService => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            DiagnosticId::NotPartialParent => "Partial class/struct",
            DiagnosticId::MissingRadioService => "IRadioService",
            DiagnosticId::UnsupportedReturnType => "Method return type",
            DiagnosticId::DuplicateInheritedMethod => "Duplicate inherited method",
            DiagnosticId::InvalidMaxLinks => "MaxLinks",
        }
    }

    /// Message template with `{0}`-style placeholders, as hosts expect it.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            DiagnosticId::NotPartialParent => "Parent type '{0}' is not a partial class/struct",
            DiagnosticId::MissingRadioService => {
                "Types with the RadioServiceInterface attribute must derive from IRadioService"
            }
            DiagnosticId::UnsupportedReturnType => {
                "The return type of the method must be void, Task, RadioResult<T>, Task<RadioResult<T>>"
            }
            DiagnosticId::DuplicateInheritedMethod => {
                "Method '{0}' is inherited from both '{1}' and '{2}'"
            }
            DiagnosticId::InvalidMaxLinks => "MaxLinks must be a positive 32-bit integer, found '{0}'",
        }
    }
}

impl fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A problem found in the declarations, before it is placed at a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum DiagnosticKind {
    #[error("Parent type '{parent}' is not a partial class/struct")]
    NotPartialParent { parent: EcoString },

    #[error("Types with the RadioServiceInterface attribute must derive from IRadioService")]
    MissingRadioService,

    /// `definition` is the generic definition's full name for closed
    /// instantiations and `slot` the method's position in its declaration,
    /// so every instantiation of one bad method maps to a single diagnostic.
    #[error(
        "The return type of the method must be void, Task, RadioResult<T>, Task<RadioResult<T>>"
    )]
    UnsupportedReturnType {
        method: EcoString,
        definition: EcoString,
        slot: usize,
    },

    #[error("Method '{method}' is inherited from both '{first}' and '{second}'")]
    DuplicateInheritedMethod {
        method: EcoString,
        first: EcoString,
        second: EcoString,
    },

    #[error("MaxLinks must be a positive 32-bit integer, found '{found}'")]
    InvalidMaxLinks { found: EcoString },
}

impl DiagnosticKind {
    #[must_use]
    pub fn id(&self) -> DiagnosticId {
        match self {
            DiagnosticKind::NotPartialParent { .. } => DiagnosticId::NotPartialParent,
            DiagnosticKind::MissingRadioService => DiagnosticId::MissingRadioService,
            DiagnosticKind::UnsupportedReturnType { .. } => DiagnosticId::UnsupportedReturnType,
            DiagnosticKind::DuplicateInheritedMethod { .. } => {
                DiagnosticId::DuplicateInheritedMethod
            }
            DiagnosticKind::InvalidMaxLinks { .. } => DiagnosticId::InvalidMaxLinks,
        }
    }

    /// Arguments substituted into [`DiagnosticId::template`], in order.
    #[must_use]
    pub fn arguments(&self) -> Vec<EcoString> {
        match self {
            DiagnosticKind::NotPartialParent { parent } => vec![parent.clone()],
            DiagnosticKind::MissingRadioService | DiagnosticKind::UnsupportedReturnType { .. } => {
                Vec::new()
            }
            DiagnosticKind::DuplicateInheritedMethod {
                method,
                first,
                second,
            } => vec![method.clone(), first.clone(), second.clone()],
            DiagnosticKind::InvalidMaxLinks { found } => vec![found.clone()],
        }
    }

    /// Places the problem at `location`.
    #[must_use]
    pub fn at(self, location: Location) -> Diagnostic {
        let id = self.id();
        Diagnostic {
            id,
            severity: id.severity(),
            message: self.to_string().into(),
            arguments: self.arguments(),
            location,
        }
    }
}

/// A reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub severity: Severity,
    /// Rendered message.
    pub message: EcoString,
    /// Template arguments, see [`DiagnosticId::template`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<EcoString>,
    pub location: Location,
}

impl Diagnostic {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} ({})",
            self.severity, self.id, self.message, self.location
        )
    }
}

/// Receives diagnostics as they are flushed.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Batches diagnostics between checkpoints.
///
/// Duplicates are dropped on the unrendered kind plus location, so revisiting
/// a type through a second graph edge never reports the same problem twice
/// while distinct problems with identical text all survive.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    pending: Vec<Diagnostic>,
    seen: HashSet<(DiagnosticKind, Location)>,
    aborted: bool,
    errors: usize,
}

impl DiagnosticBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `kind` at `location`.
    pub fn add(&mut self, kind: DiagnosticKind, location: &Location) {
        if !self.seen.insert((kind.clone(), location.clone())) {
            return;
        }
        let diagnostic = kind.at(location.clone());
        match diagnostic.severity {
            Severity::Fatal => {
                self.aborted = true;
                self.errors += 1;
            }
            Severity::Error => self.errors += 1,
            Severity::Warning => {}
        }
        self.pending.push(diagnostic);
    }

    /// Hands every pending diagnostic to `sink`, in the order recorded.
    pub fn flush(&mut self, sink: &mut dyn DiagnosticSink) {
        for diagnostic in self.pending.drain(..) {
            sink.report(diagnostic);
        }
    }

    /// True once a fatal diagnostic was recorded.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Number of distinct error and fatal diagnostics recorded so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors
    }

    #[must_use]
    pub fn pending(&self) -> &[Diagnostic] {
        &self.pending
    }
}
