// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Pipeline driver.
//!
//! **DDD Context:** Generation Pipeline
//!
//! One run reads declarations, resolves options, builds and prepares the
//! model and, unless a fatal diagnostic was reported, synthesizes and renders
//! one unit per namespace followed by the initializer unit. Units are handed
//! to the output as soon as they are finished, so a cancelled run leaves the
//! earlier ones in place.

use crate::cancel::{CancellationToken, Cancelled};
use crate::codegen::{self, CodeGenError, ROOT_UNIT, Synthesizer, csharp, namespace_unit_name};
use crate::declaration::{DeclarationSource, SourceError, TypeDeclaration};
use crate::diagnostics::{DiagnosticBag, DiagnosticSink};
use crate::model::{ModelError, Prepared, ServiceModel};
use crate::options::GeneratorOptions;
use crate::output::{DirectoryOutput, GeneratedUnit, InMemoryOutput, OutputError, OutputSink};
use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors that stop a run. User mistakes in the declarations are reported as
/// diagnostics instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read declarations")]
    Source(#[from] SourceError),

    #[error("invalid declaration set")]
    Model(#[from] ModelError),

    #[error(transparent)]
    CodeGen(CodeGenError),

    #[error("failed to write generated output")]
    Output(#[from] OutputError),

    #[error("generation was cancelled")]
    Cancelled,
}

impl From<Cancelled> for GenerateError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<CodeGenError> for GenerateError {
    fn from(err: CodeGenError) -> Self {
        match err {
            CodeGenError::Cancelled(_) => Self::Cancelled,
            other => Self::CodeGen(other),
        }
    }
}

/// What a run emitted into a caller-supplied output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Options after the option attribute was applied.
    pub options: GeneratorOptions,
    /// A fatal diagnostic was reported and nothing was emitted.
    pub aborted: bool,
    pub emitted: usize,
}

/// Result of [`Generator::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Units kept in memory. Empty when file output was used.
    pub units: Vec<GeneratedUnit>,
    /// Files written. Empty when units were kept in memory.
    pub files: Vec<Utf8PathBuf>,
    pub options: GeneratorOptions,
    pub aborted: bool,
}

impl Generation {
    /// The in-memory unit with hint name `hint_name`.
    #[must_use]
    pub fn unit(&self, hint_name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|unit| unit.hint_name == hint_name)
    }
}

/// Runs the pipeline with a fixed set of base options.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Runs the pipeline, choosing the output from the resolved options:
    /// the target folder when file output is enabled and the folder exists,
    /// memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] when declarations cannot be read, the
    /// declaration set is inconsistent, a file cannot be written or `cancel`
    /// fires.
    pub fn run<S>(
        &self,
        source: &S,
        cancel: &CancellationToken,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<Generation, GenerateError>
    where
        S: DeclarationSource + ?Sized,
    {
        let declarations = source.declarations()?;
        let mut options = self.options.clone();
        options.merge_declarations(&declarations);

        if let Some(folder) = options.output_folder().map(ToOwned::to_owned) {
            let mut output = DirectoryOutput::new(folder);
            let summary = Self::run_prepared(declarations, options, cancel, diagnostics, &mut output)?;
            return Ok(Generation {
                units: Vec::new(),
                files: output.into_written(),
                options: summary.options,
                aborted: summary.aborted,
            });
        }

        let mut output = InMemoryOutput::new();
        let summary = Self::run_prepared(declarations, options, cancel, diagnostics, &mut output)?;
        Ok(Generation {
            units: output.into_units(),
            files: Vec::new(),
            options: summary.options,
            aborted: summary.aborted,
        })
    }

    /// Runs the pipeline into `output`, ignoring the file output options.
    ///
    /// # Errors
    ///
    /// As for [`Generator::run`].
    pub fn run_into<S>(
        &self,
        source: &S,
        cancel: &CancellationToken,
        diagnostics: &mut dyn DiagnosticSink,
        output: &mut dyn OutputSink,
    ) -> Result<RunSummary, GenerateError>
    where
        S: DeclarationSource + ?Sized,
    {
        let declarations = source.declarations()?;
        let mut options = self.options.clone();
        options.merge_declarations(&declarations);
        Self::run_prepared(declarations, options, cancel, diagnostics, output)
    }

    #[instrument(skip_all, fields(declarations = declarations.len()))]
    fn run_prepared(
        declarations: Vec<TypeDeclaration>,
        options: GeneratorOptions,
        cancel: &CancellationToken,
        diagnostics: &mut dyn DiagnosticSink,
        output: &mut dyn OutputSink,
    ) -> Result<RunSummary, GenerateError> {
        let mut model = ServiceModel::build(declarations)?;
        cancel.check()?;

        let mut bag = DiagnosticBag::new();
        if model.prepare(&mut bag, diagnostics) == Prepared::Aborted {
            info!(errors = bag.error_count(), "Generation aborted by fatal diagnostic");
            return Ok(RunSummary {
                options,
                aborted: true,
                emitted: 0,
            });
        }

        let mut emitted = 0;
        let mut synthesizer = Synthesizer::new(&model);
        for (namespace, roots) in model.namespaces() {
            cancel.check()?;
            if let Some(unit) = synthesizer.namespace_unit(namespace, roots, cancel)? {
                output.emit(GeneratedUnit::new(
                    namespace_unit_name(namespace),
                    csharp::namespace_source(&unit),
                ))?;
                emitted += 1;
            }
        }
        let root = synthesizer.root_routine()?;
        output.emit(GeneratedUnit::new(
            ROOT_UNIT,
            csharp::initializer_source(&root, &codegen::module_hook(&options)),
        ))?;
        emitted += 1;

        info!(
            emitted,
            errors = bag.error_count(),
            brokers = model.objects().filter(|o| o.is_radio_service()).count(),
            "Generation finished"
        );
        Ok(RunSummary {
            options,
            aborted: false,
            emitted,
        })
    }
}
