// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! Declarations carry a [`Location`] pointing back into the host's source
//! file so diagnostics can show the offending interface, method or enclosing
//! type. Hosts that cannot supply positions leave the location empty.

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A span of source code, represented as a byte offset range.
///
/// # Examples
///
/// ```
/// use crosschannel_core::span::Span;
///
/// let span = Span::new(4, 10);
/// assert_eq!(span.len(), 6);
/// assert!(!span.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns the start byte offset.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// Returns the end byte offset (exclusive).
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Converts to a `Range<usize>` for indexing into source text.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<u32>> for Span {
    fn from(range: Range<u32>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}

/// A position in a named source file.
///
/// The file is optional: declarations assembled in memory have no backing
/// file, and the diagnostics renderer falls back to a plain message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<EcoString>,
    #[serde(flatten)]
    pub span: Span,
}

impl Location {
    /// Creates a location inside `file`.
    #[must_use]
    pub fn new(file: impl Into<EcoString>, span: Span) -> Self {
        Self {
            file: Some(file.into()),
            span,
        }
    }

    /// Returns true when neither a file nor a span is known.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.file.is_none() && self.span.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}@{}..{}", self.span.start, self.span.end),
            None => write!(f, "<memory>@{}..{}", self.span.start, self.span.end),
        }
    }
}
