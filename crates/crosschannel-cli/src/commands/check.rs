// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `crosschannel check`: validate declarations and list what would be
//! generated, without rendering anything.

use super::{load_options, report};
use camino::Utf8Path;
use crosschannel_core::declaration::{DeclarationFile, DeclarationSource};
use crosschannel_core::diagnostics::{Diagnostic, DiagnosticBag};
use crosschannel_core::model::{Prepared, ServiceModel, UNBOUNDED_LINKS};
use miette::{Context, IntoDiagnostic, Result};
use std::fmt::Write as _;
use tracing::{info, instrument};

#[instrument]
pub fn run(declarations: &Utf8Path, config: Option<&Utf8Path>) -> Result<()> {
    let mut options = load_options(declarations, config)?;
    let types = DeclarationFile::new(declarations)
        .declarations()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read declarations '{declarations}'"))?;
    options.merge_declarations(&types);

    let mut model = ServiceModel::build(types)
        .into_diagnostic()
        .wrap_err("Invalid declaration set")?;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let prepared = model.prepare(&mut DiagnosticBag::new(), &mut diagnostics);
    let errors = report(&diagnostics, declarations);

    if prepared == Prepared::Aborted {
        miette::bail!("Check failed: a fatal diagnostic was reported");
    }
    print!("{}", summary(&model));
    println!(
        "startup hook: {}.{}",
        options.module_namespace(),
        options.module_class_name()
    );
    info!(errors, "Check finished");
    if errors > 0 {
        miette::bail!("{errors} error(s) reported");
    }
    Ok(())
}

/// One line per broker, then one indented line per method.
fn summary(model: &ServiceModel) -> String {
    let mut out = String::new();
    for object in model.objects().filter(|o| o.is_radio_service()) {
        let links = if object.max_links == UNBOUNDED_LINKS {
            String::from("unbounded")
        } else {
            object.max_links.to_string()
        };
        let _ = writeln!(
            out,
            "{} -> {} (max links: {links})",
            object.full_name(),
            object.class_name
        );
        for method in &object.methods {
            let _ = writeln!(out, "    {}.{} [{}]", method.interface, method.name, method.kind);
        }
    }
    out
}
