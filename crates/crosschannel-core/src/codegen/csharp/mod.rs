// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! C# backend.
//!
//! **DDD Context:** Code Generation
//!
//! Renders the IR against the CrossChannel runtime API: `Channel<T>`,
//! `InternalGetList`, `TryGetInstance`, `RadioResult<T>` and
//! `ChannelRegistry.Register`.

mod broker;
mod initializer;

use super::document::{Document, block, line, nil};
use super::ir::{InitializerRoutine, Item, ModuleHook, NamespaceUnit, PartialScope};
use crate::docvec;

/// Name of every generated initializer routine.
pub const INITIALIZER_NAME: &str = "__InitializeCC__";

const USINGS: [&str; 7] = [
    "System",
    "System.Collections.Generic",
    "System.Diagnostics.CodeAnalysis",
    "System.Linq",
    "System.Runtime.CompilerServices",
    "System.Threading.Tasks",
    "CrossChannel",
];

/// Renders a namespace unit as a complete C# source file.
#[must_use]
pub fn namespace_source(unit: &NamespaceUnit) -> String {
    let namespace = if unit.namespace.is_empty() {
        nil()
    } else {
        docvec!["namespace ", &unit.namespace, ";", line(), line()]
    };
    let items = separated(unit.items.iter().map(item).collect());
    docvec![header(), namespace, items, line()].to_pretty_string()
}

/// Renders the root routine and the startup hook as a C# source file.
#[must_use]
pub fn initializer_source(root: &InitializerRoutine, module: &ModuleHook) -> String {
    docvec![
        header(),
        initializer::root_class(root),
        line(),
        line(),
        initializer::module_class(module),
        line(),
    ]
    .to_pretty_string()
}

fn header() -> Document<'static> {
    let mut doc = docvec!["// <auto-generated/>"];
    for using in USINGS {
        doc = docvec![doc, line(), "using ", using, ";"];
    }
    docvec![
        doc,
        line(),
        line(),
        "#nullable enable",
        line(),
        "#pragma warning disable CS1591",
        line(),
        "#pragma warning disable CS1998",
        line(),
        line(),
    ]
}

/// Documents one after another, separated by blank lines. Every document
/// starts on a fresh line except the first.
fn separated(docs: Vec<Document<'_>>) -> Document<'_> {
    let mut out = Vec::with_capacity(docs.len() * 3);
    for (i, doc) in docs.into_iter().enumerate() {
        if i > 0 {
            out.push(line());
            out.push(line());
        }
        out.push(doc);
    }
    Document::Vec(out)
}

/// Like [`separated`], for the body of a block: starts with a line break.
fn block_body(docs: Vec<Document<'_>>) -> Document<'_> {
    if docs.is_empty() {
        return nil();
    }
    docvec![line(), separated(docs)]
}

fn item(item: &Item) -> Document<'_> {
    match item {
        Item::Broker(broker) => broker::broker_class(broker),
        Item::Scope(scope) => partial_scope(scope),
    }
}

fn partial_scope(scope: &PartialScope) -> Document<'_> {
    let mut members: Vec<Document<'_>> = scope.items.iter().map(item).collect();
    if let Some(routine) = &scope.initializer {
        members.push(initializer::routine(routine, "internal"));
    }
    block(
        docvec![
            scope.accessibility.keyword(),
            " partial ",
            scope.kind.keyword(),
            " ",
            &scope.name,
        ],
        block_body(members),
    )
}
