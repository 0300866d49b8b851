// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Where rendered units go.
//!
//! A unit is either handed back to the host in memory (keyed by its hint
//! name) or written as `<hint>.cs` into a target folder.

use camino::{Utf8Path, Utf8PathBuf};
use ecow::{EcoString, eco_format};
use thiserror::Error;
use tracing::debug;

/// One rendered C# source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Hint name, such as `gen.CrossChannel.Demo`.
    pub hint_name: EcoString,
    /// File name used for file output: the hint name plus `.cs`.
    pub file_name: EcoString,
    pub source: String,
}

impl GeneratedUnit {
    #[must_use]
    pub fn new(hint_name: impl Into<EcoString>, source: String) -> Self {
        let hint_name = hint_name.into();
        let file_name = eco_format!("{hint_name}.cs");
        Self {
            hint_name,
            file_name,
            source,
        }
    }
}

/// Errors writing generated units.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write '{path}'")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Receives finished units.
pub trait OutputSink {
    /// Accepts one finished unit.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the unit cannot be stored.
    fn emit(&mut self, unit: GeneratedUnit) -> Result<(), OutputError>;
}

/// Keeps units in memory, in emission order.
#[derive(Debug, Default)]
pub struct InMemoryOutput {
    units: Vec<GeneratedUnit>,
}

impl InMemoryOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    #[must_use]
    pub fn into_units(self) -> Vec<GeneratedUnit> {
        self.units
    }
}

impl OutputSink for InMemoryOutput {
    fn emit(&mut self, unit: GeneratedUnit) -> Result<(), OutputError> {
        self.units.push(unit);
        Ok(())
    }
}

/// Writes each unit to `<folder>/<hint>.cs`, replacing existing files.
#[derive(Debug)]
pub struct DirectoryOutput {
    folder: Utf8PathBuf,
    written: Vec<Utf8PathBuf>,
}

impl DirectoryOutput {
    #[must_use]
    pub fn new(folder: impl Into<Utf8PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            written: Vec::new(),
        }
    }

    #[must_use]
    pub fn folder(&self) -> &Utf8Path {
        &self.folder
    }

    /// Paths written so far.
    #[must_use]
    pub fn written(&self) -> &[Utf8PathBuf] {
        &self.written
    }

    #[must_use]
    pub fn into_written(self) -> Vec<Utf8PathBuf> {
        self.written
    }
}

impl OutputSink for DirectoryOutput {
    fn emit(&mut self, unit: GeneratedUnit) -> Result<(), OutputError> {
        let path = self.folder.join(unit.file_name.as_str());
        std::fs::write(&path, unit.source.as_bytes())
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(%path, "Wrote generated unit");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_appends_extension() {
        let unit = GeneratedUnit::new("gen.CrossChannel.Demo", String::new());
        assert_eq!(unit.file_name, "gen.CrossChannel.Demo.cs");
    }

    #[test]
    fn in_memory_keeps_order() {
        let mut out = InMemoryOutput::new();
        out.emit(GeneratedUnit::new("b", "2".into())).unwrap();
        out.emit(GeneratedUnit::new("a", "1".into())).unwrap();
        let names: Vec<_> = out.units().iter().map(|u| u.hint_name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn directory_output_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let folder = Utf8Path::from_path(dir.path()).unwrap();
        let mut out = DirectoryOutput::new(folder);
        out.emit(GeneratedUnit::new("gen.CrossChannel", "class A {}\n".into()))
            .unwrap();
        let path = folder.join("gen.CrossChannel.cs");
        assert_eq!(out.written(), [path.clone()]);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "class A {}\n");
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let folder = Utf8Path::from_path(dir.path()).unwrap().join("absent");
        let mut out = DirectoryOutput::new(&folder);
        let err = out
            .emit(GeneratedUnit::new("gen.CrossChannel", String::new()))
            .unwrap_err();
        assert!(err.to_string().contains("gen.CrossChannel.cs"));
    }
}
