// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations.

pub mod check;
pub mod generate;

use crate::config::{find_config, parse_config};
use crate::diagnostic::GeneratorDiagnostic;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use crosschannel_core::GeneratorOptions;
use crosschannel_core::prelude::{Diagnostic, Severity};
use miette::Result;
use tracing::debug;

/// Generator option overrides shared by commands.
#[derive(Debug, Default, Args)]
pub struct OptionArgs {
    /// Configuration file (default: crosschannel.toml next to the declarations)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Namespace of the startup hook class
    #[arg(long)]
    pub namespace: Option<String>,

    /// Assembly name used to suffix the startup hook class
    #[arg(long)]
    pub assembly_name: Option<String>,

    /// Leave [ModuleInitializer] off the startup hook
    #[arg(long)]
    pub no_module_initializer: bool,
}

/// Directory holding `declarations`, used to resolve config and source files.
pub(crate) fn declarations_dir(declarations: &Utf8Path) -> &Utf8Path {
    declarations
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."))
}

/// Base options: the explicit config file, or `crosschannel.toml` next to the
/// declarations, or the defaults.
pub(crate) fn load_options(
    declarations: &Utf8Path,
    config: Option<&Utf8Path>,
) -> Result<GeneratorOptions> {
    let config = match config {
        Some(path) => Some(parse_config(path)?),
        None => find_config(declarations_dir(declarations))?,
    };
    match config {
        Some(config) => Ok(config.generator),
        None => {
            debug!("No crosschannel.toml found, using default options");
            Ok(GeneratorOptions::default())
        }
    }
}

impl OptionArgs {
    /// Loads the base options and applies the command-line overrides.
    pub(crate) fn resolve(&self, declarations: &Utf8Path) -> Result<GeneratorOptions> {
        let mut options = load_options(declarations, self.config.as_deref())?;
        if let Some(namespace) = &self.namespace {
            options = options.with_custom_namespace(namespace.as_str());
        }
        if let Some(assembly_name) = &self.assembly_name {
            options = options.with_assembly_name(assembly_name.as_str());
        }
        if self.no_module_initializer {
            options = options.with_module_initializer(false);
        }
        Ok(options)
    }
}

/// Prints every diagnostic to stderr. Returns how many were errors.
pub(crate) fn report(diagnostics: &[Diagnostic], declarations: &Utf8Path) -> usize {
    let base_dir = declarations_dir(declarations);
    for diagnostic in diagnostics {
        let rendered = GeneratorDiagnostic::from_core_diagnostic(diagnostic, Some(base_dir));
        eprintln!("{:?}", miette::Report::new(rendered));
    }
    diagnostics
        .iter()
        .filter(|d| d.severity != Severity::Warning)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;

    #[test]
    fn bare_file_name_resolves_to_current_dir() {
        assert_eq!(declarations_dir(Utf8Path::new("decls.json")).as_str(), ".");
        assert_eq!(declarations_dir(Utf8Path::new("a/b/decls.json")).as_str(), "a/b");
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        std::fs::write(
            dir.join(CONFIG_FILE),
            "[generator]\nassembly_name = \"From.Config\"\n",
        )
        .unwrap();
        let args = OptionArgs {
            namespace: Some("Cli.Boot".into()),
            no_module_initializer: true,
            ..OptionArgs::default()
        };
        let options = args.resolve(&dir.join("decls.json")).unwrap();
        assert_eq!(options.assembly_name.as_deref(), Some("From.Config"));
        assert_eq!(options.module_namespace(), "Cli.Boot");
        assert!(!options.use_module_initializer);
    }

    #[test]
    fn explicit_config_must_exist() {
        let args = OptionArgs {
            config: Some("/nonexistent/crosschannel.toml".into()),
            ..OptionArgs::default()
        };
        assert!(args.resolve(Utf8Path::new("decls.json")).is_err());
    }
}
