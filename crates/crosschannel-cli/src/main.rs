// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CrossChannel broker generator command-line interface.
//!
//! This is the main entry point for the `crosschannel` command.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use crosschannel_core::CancellationToken;
use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod diagnostic;

/// CrossChannel: broker generation for radio service interfaces
#[derive(Debug, Parser)]
#[command(name = "crosschannel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate broker sources from a JSON declaration file
    Generate {
        /// Declaration file (JSON)
        declarations: Utf8PathBuf,

        #[command(flatten)]
        options: commands::OptionArgs,

        /// Write units into this directory (created if missing)
        #[arg(short, long)]
        out: Option<Utf8PathBuf>,
    },

    /// Validate declarations and report diagnostics without generating
    Check {
        /// Declaration file (JSON)
        declarations: Utf8PathBuf,

        /// Configuration file (default: crosschannel.toml next to the declarations)
        #[arg(long)]
        config: Option<Utf8PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate {
            declarations,
            options,
            out,
        } => cancel_on_ctrlc().and_then(|cancel| {
            commands::generate::run(&declarations, &options, out.as_deref(), &cancel)
        }),
        Command::Check {
            declarations,
            config,
        } => commands::check::run(&declarations, config.as_deref()),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

/// A token that Ctrl-C cancels. Units finished before the signal are kept.
fn cancel_on_ctrlc() -> Result<CancellationToken> {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt, cancelling generation");
        handle.cancel();
    })
    .into_diagnostic()?;
    Ok(cancel)
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "crosschannel_cli=warn,crosschannel_core=warn",
        1 => "crosschannel_cli=info,crosschannel_core=info",
        2 => "crosschannel_cli=debug,crosschannel_core=debug",
        _ => "crosschannel_cli=trace,crosschannel_core=trace",
    }
}
