// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `crosschannel generate`: declarations in, C# units out.
//!
//! Units go to `--out` when given, to the configured target folder when file
//! output is enabled (by `crosschannel.toml` or the option attribute), and to
//! stdout otherwise.

use super::{OptionArgs, report};
use camino::{Utf8Path, Utf8PathBuf};
use crosschannel_core::declaration::DeclarationFile;
use crosschannel_core::diagnostics::Diagnostic;
use crosschannel_core::output::DirectoryOutput;
use crosschannel_core::{CancellationToken, GeneratedUnit, Generator};
use miette::{Context, IntoDiagnostic, Result};
use std::fs;
use tracing::{debug, info, instrument};

/// What a run produced, for the summary line.
enum Produced {
    Files(Vec<Utf8PathBuf>),
    Units(Vec<GeneratedUnit>),
}

#[instrument(skip(args, cancel))]
pub fn run(
    declarations: &Utf8Path,
    args: &OptionArgs,
    out: Option<&Utf8Path>,
    cancel: &CancellationToken,
) -> Result<()> {
    info!("Starting generation");
    let options = args.resolve(declarations)?;
    debug!(?options, "Resolved options");

    let generator = Generator::new(options);
    let source = DeclarationFile::new(declarations);
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let result = match out {
        Some(out) => {
            fs::create_dir_all(out)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to create output directory '{out}'"))?;
            let mut output = DirectoryOutput::new(out);
            generator
                .run_into(&source, cancel, &mut diagnostics, &mut output)
                .map(|summary| (summary.aborted, Produced::Files(output.into_written())))
        }
        None => generator
            .run(&source, cancel, &mut diagnostics)
            .map(|generation| {
                let produced = if generation.files.is_empty() {
                    Produced::Units(generation.units)
                } else {
                    Produced::Files(generation.files)
                };
                (generation.aborted, produced)
            }),
    };

    let errors = report(&diagnostics, declarations);
    let (aborted, produced) = result
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to generate from '{declarations}'"))?;

    if aborted {
        miette::bail!("Generation aborted: a fatal diagnostic was reported");
    }
    match produced {
        Produced::Files(files) => {
            for file in &files {
                eprintln!("Wrote {file}");
            }
            info!(count = files.len(), "Wrote generated files");
        }
        Produced::Units(units) => {
            for unit in &units {
                println!("// ---- {} ----", unit.file_name);
                print!("{}", unit.source);
            }
        }
    }
    if errors > 0 {
        miette::bail!("{errors} error(s) reported");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING: &str = r#"[{
        "name": "IPing",
        "full_name": "Demo.IPing",
        "namespace": "Demo",
        "kind": "interface",
        "interfaces": ["CrossChannel.IRadioService"],
        "attributes": [{ "name": "CrossChannel.RadioServiceInterfaceAttribute" }],
        "methods": [{ "name": "Ping", "return_type": "void", "parameters": [] }]
    }]"#;

    fn write_declarations(dir: &Utf8Path, content: &str) -> Utf8PathBuf {
        let path = dir.join("decls.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn writes_units_into_out_dir() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let declarations = write_declarations(dir, PING);
        let out = dir.join("nested/out");

        run(
            &declarations,
            &OptionArgs::default(),
            Some(&out),
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(out.join("gen.CrossChannel.Demo.cs").is_file());
        let init = fs::read_to_string(out.join("gen.CrossChannel.cs")).unwrap();
        assert!(init.contains("public static class CrossChannelModule\n"));
    }

    #[test]
    fn fatal_diagnostic_fails_and_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let declarations = write_declarations(
            dir,
            &PING.replace(r#""interfaces": ["CrossChannel.IRadioService"],"#, ""),
        );
        let out = dir.join("out");

        let err = run(
            &declarations,
            &OptionArgs::default(),
            Some(&out),
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("aborted"));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn malformed_declarations_are_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let declarations = write_declarations(dir, "[{");
        let err = run(
            &declarations,
            &OptionArgs::default(),
            Some(&dir.join("out")),
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(format!("{err:?}").contains("Failed to generate"));
    }

    #[test]
    fn cancelled_run_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let declarations = write_declarations(dir, PING);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run(&declarations, &OptionArgs::default(), Some(&dir.join("out")), &cancel)
            .unwrap_err();
        assert!(format!("{err:?}").contains("cancelled"));
    }
}
