// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generator diagnostics rendered with miette.
//!
//! When the declaring file named by a diagnostic's location can be read, the
//! report shows the offending snippet; otherwise it falls back to the plain
//! message with the location appended.

use camino::Utf8Path;
use crosschannel_core::prelude::{Diagnostic as CoreDiagnostic, DiagnosticId, Severity};
use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use std::fmt;

/// A generator diagnostic with rich formatting.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct GeneratorDiagnostic {
    pub id: DiagnosticId,
    pub severity: Severity,
    pub message: String,
    pub src: Option<NamedSource<String>>,
    pub span: SourceSpan,
}

impl GeneratorDiagnostic {
    /// Create a diagnostic from a core diagnostic. Relative file names are
    /// looked up under `base_dir`.
    pub fn from_core_diagnostic(diagnostic: &CoreDiagnostic, base_dir: Option<&Utf8Path>) -> Self {
        let location = &diagnostic.location;
        let src = location.file.as_deref().and_then(|file| {
            let path = match base_dir {
                Some(dir) if Utf8Path::new(file).is_relative() => dir.join(file),
                _ => file.into(),
            };
            let source = std::fs::read_to_string(&path).ok()?;
            let in_range = location.span.end() as usize <= source.len();
            in_range.then(|| NamedSource::new(file, source))
        });
        let message = if src.is_some() || location.is_unknown() {
            diagnostic.message.to_string()
        } else {
            format!("{} ({location})", diagnostic.message)
        };

        Self {
            id: diagnostic.id,
            severity: diagnostic.severity,
            message,
            src,
            span: location.span.into(),
        }
    }

    fn label(&self) -> &'static str {
        match self.severity {
            Severity::Fatal | Severity::Error => "error here",
            Severity::Warning => "warning here",
        }
    }
}

impl Diagnostic for GeneratorDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.id.code()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Fatal | Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.severity == Severity::Fatal {
            Some(Box::new("no code was generated"))
        } else {
            None
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.src.as_ref().map(|src| src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.src.as_ref()?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label().to_string()),
            self.span,
        ))))
    }
}
