// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! JSON declaration sources.
//!
//! The document is either a bare array of type declarations or an object
//! with a `types` array, so hosts can add metadata alongside later.

use super::{DeclarationSource, SourceError, TypeDeclaration};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Bare(Vec<TypeDeclaration>),
    Wrapped { types: Vec<TypeDeclaration> },
}

impl Document {
    fn into_types(self) -> Vec<TypeDeclaration> {
        match self {
            Document::Bare(types) | Document::Wrapped { types } => types,
        }
    }
}

/// Declarations held as JSON text.
#[derive(Debug, Clone, Copy)]
pub struct JsonDeclarations<'a>(pub &'a str);

impl DeclarationSource for JsonDeclarations<'_> {
    fn declarations(&self) -> Result<Vec<TypeDeclaration>, SourceError> {
        let document: Document = serde_json::from_str(self.0)?;
        Ok(document.into_types())
    }
}

/// Declarations read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct DeclarationFile {
    path: Utf8PathBuf,
}

impl DeclarationFile {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl DeclarationSource for DeclarationFile {
    fn declarations(&self) -> Result<Vec<TypeDeclaration>, SourceError> {
        debug!(path = %self.path, "Reading declarations");
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        JsonDeclarations(&text).declarations()
    }
}
