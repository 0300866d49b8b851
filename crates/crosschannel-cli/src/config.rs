// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `crosschannel.toml` parsing.
//!
//! The file holds base generator options under a `[generator]` table:
//!
//! ```toml
//! [generator]
//! assembly_name = "My.App"
//! custom_namespace = "My.Boot"
//! use_module_initializer = true
//! generate_to_file = true
//! target_folder = "Generated"
//! ```
//!
//! A relative `target_folder` is resolved against the directory holding the
//! file.

use camino::Utf8Path;
use crosschannel_core::GeneratorOptions;
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;
use std::fs;
use tracing::debug;

/// Name of the configuration file looked up next to the declarations.
pub const CONFIG_FILE: &str = "crosschannel.toml";

/// The top-level structure of `crosschannel.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorOptions,
}

/// Parse a configuration file.
pub fn parse_config(path: &Utf8Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config '{path}'"))?;

    let mut config: Config = toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse config '{path}'"))?;

    if let (Some(folder), Some(dir)) = (&config.generator.target_folder, path.parent()) {
        if folder.is_relative() {
            config.generator.target_folder = Some(dir.join(folder));
        }
    }
    debug!(%path, ?config, "Loaded config");
    Ok(config)
}

/// Look for `crosschannel.toml` in `dir` and parse it if found.
pub fn find_config(dir: &Utf8Path) -> Result<Option<Config>> {
    let path = dir.join(CONFIG_FILE);
    if path
        .try_exists()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to stat config '{path}'"))?
    {
        parse_config(&path).map(Some)
    } else {
        Ok(None)
    }
}
