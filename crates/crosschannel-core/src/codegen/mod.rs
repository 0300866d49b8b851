// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Code generation.
//!
//! **DDD Context:** Code Generation
//!
//! A prepared [`ServiceModel`] is synthesized into the IR in [`ir`] and then
//! rendered by the C# backend in [`csharp`]:
//!
//! - one unit per namespace holding its brokers, partial scopes and
//!   per-level initializer routines (`gen.CrossChannel.<ns>`);
//! - one unit holding the root routine and the startup hook
//!   (`gen.CrossChannel`).

pub mod csharp;
pub mod document;
pub mod ir;
pub mod plan;
mod registration;
pub mod synth;

pub use synth::{Synthesizer, module_hook, synthesize};

use crate::cancel::{CancellationToken, Cancelled};
use crate::model::ServiceModel;
use crate::options::GeneratorOptions;
use crate::output::GeneratedUnit;
use ecow::{EcoString, eco_format};
use thiserror::Error;

/// Hint name of the initializer unit.
pub const ROOT_UNIT: &str = "gen.CrossChannel";

/// Errors raised during code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeGenError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Synthesis was attempted on a model that was not prepared.
    #[error("radio service '{name}' was never checked")]
    Unchecked { name: EcoString },
}

/// Hint name of the unit for `namespace`.
#[must_use]
pub fn namespace_unit_name(namespace: &str) -> EcoString {
    if namespace.is_empty() {
        eco_format!("{ROOT_UNIT}.global")
    } else {
        eco_format!("{ROOT_UNIT}.{namespace}")
    }
}

/// Synthesizes and renders every unit of a prepared model.
///
/// # Errors
///
/// Returns [`CodeGenError`] on cancellation or when the model was not
/// prepared.
pub fn generate(
    model: &ServiceModel,
    options: &GeneratorOptions,
    cancel: &CancellationToken,
) -> Result<Vec<GeneratedUnit>, CodeGenError> {
    let program = synthesize(model, options, cancel)?;
    let mut units: Vec<GeneratedUnit> = program
        .units
        .iter()
        .map(|unit| {
            GeneratedUnit::new(
                namespace_unit_name(&unit.namespace),
                csharp::namespace_source(unit),
            )
        })
        .collect();
    units.push(GeneratedUnit::new(
        ROOT_UNIT,
        csharp::initializer_source(&program.root, &program.module),
    ));
    Ok(units)
}
