// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Broker classes and dispatch bodies.

use super::{INITIALIZER_NAME, block_body, initializer};
use crate::codegen::document::{Document, block, concat, join, line, lines};
use crate::codegen::ir::{BrokerClass, BrokerMethod, Buffer, Call, Counter, Stmt, Value};
use crate::declaration::TypeRef;
use crate::docvec;

pub(super) fn broker_class(broker: &BrokerClass) -> Document<'_> {
    let access = if broker.nested { "private" } else { "internal" };
    let generic = if broker.type_parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", broker.type_parameters.join(", "))
    };
    let channel_type = format!("Channel<{}>", broker.interface);

    let mut members = vec![
        docvec!["private readonly ", channel_type.clone(), " channel;"],
        block(
            docvec!["public ", &broker.name, "(object channel)"],
            docvec![line(), "this.channel = (", channel_type, ")channel;"],
        ),
    ];
    members.extend(broker.methods.iter().map(method));
    if let Some(registration) = &broker.self_registration {
        members.push(block(
            docvec!["public static void ", INITIALIZER_NAME, "()"],
            docvec![line(), initializer::registration(registration)],
        ));
    }

    block(
        docvec![
            access,
            " class ",
            &broker.name,
            generic,
            " : ",
            &broker.interface
        ],
        block_body(members),
    )
}

fn method(method: &BrokerMethod) -> Document<'_> {
    let parameters = join(
        method
            .parameters
            .iter()
            .enumerate()
            .map(|(i, ty)| Document::String(format!("{ty} a{}", i + 1))),
        &Document::Str(", "),
    );
    let header = docvec![
        if method.is_async() { "async " } else { "" },
        method.return_type.to_string(),
        " ",
        &method.interface,
        ".",
        &method.name,
        "(",
        parameters,
        ")",
    ];
    let ctx = Context {
        result: match &method.body[..] {
            [_, Stmt::DeclareResults { result }, ..] => Some(result),
            _ => None,
        },
    };
    block(header, statements(&method.body, &ctx))
}

struct Context<'a> {
    result: Option<&'a TypeRef>,
}

fn statements<'a>(body: &'a [Stmt], ctx: &Context<'a>) -> Document<'a> {
    lines(body.iter().map(|s| stmt(s, ctx)))
}

fn stmt<'a>(stmt: &'a Stmt, ctx: &Context<'a>) -> Document<'a> {
    match stmt {
        Stmt::TakeSnapshot => {
            Document::Str("(var array, var countHint) = this.channel.InternalGetList();")
        }
        Stmt::DeclareResults { result } => concat([
            docvec![result.to_string(), " firstResult = default!;"],
            line(),
            docvec![result.to_string(), "[]? results = default;"],
            line(),
            Document::Str("var count = 0;"),
            line(),
            Document::Str("var invoked = 0;"),
        ]),
        Stmt::DeclarePending { element } => docvec![
            "var tasks = ",
            array_creation(element, "countHint"),
            ";",
            line(),
            "var count = 0;",
        ],
        Stmt::ForEachLive(body) => block(
            "foreach (var x in array)",
            docvec![
                line(),
                "if (x is null) continue;",
                line(),
                "if (!x.TryGetInstance(out var instance)) { x.Dispose(); continue; }",
                statements(body, ctx),
            ],
        ),
        Stmt::BreakIfFull(Counter::Stored) => Document::Str("if (count >= countHint) break;"),
        Stmt::BreakIfFull(Counter::Invoked) => Document::Str("if (invoked >= countHint) break;"),
        Stmt::CountInvocation => Document::Str("invoked++;"),
        Stmt::Invoke(call) => docvec![invocation(call), ";"],
        Stmt::CollectResult(call) => collect_result(call, ctx),
        Stmt::CollectPending(call) => docvec!["tasks[count++] = ", invocation(call), ";"],
        Stmt::ByCount { zero, one, many } => docvec![
            block("if (count == 0)", statements(zero, ctx)),
            line(),
            block("else if (count == 1)", statements(one, ctx)),
            line(),
            block("else", statements(many, ctx)),
        ],
        Stmt::ShrinkToCount(buffer) => {
            let name = match buffer {
                Buffer::Results => "results",
                Buffer::Pending => "tasks",
            };
            docvec!["if (count < countHint) Array.Resize(ref ", name, ", count);"]
        }
        Stmt::AwaitFirst => Document::Str("await tasks[0].ConfigureAwait(false);"),
        Stmt::AwaitAll => Document::Str("await Task.WhenAll(tasks).ConfigureAwait(false);"),
        Stmt::Return(None) => Document::Str("return;"),
        Stmt::Return(Some(value)) => docvec!["return ", return_value(*value), ";"],
    }
}

fn return_value(value: Value) -> &'static str {
    match value {
        Value::Default => "default",
        Value::WrapFirst => "new(firstResult)",
        Value::WrapResults => "new(results!)",
        Value::AwaitFirst => "await tasks[0].ConfigureAwait(false)",
        Value::AwaitAllUnwrapped => {
            "new((await Task.WhenAll(tasks).ConfigureAwait(false)).Select(x => x.TryGetSingleResult(out var r) ? r : default!).ToArray())"
        }
    }
}

fn invocation(call: &Call) -> Document<'_> {
    let arguments: Vec<String> = (1..=call.arguments).map(|i| format!("a{i}")).collect();
    docvec!["instance.", &call.method, "(", arguments.join(", "), ")"]
}

fn collect_result<'a>(call: &'a Call, ctx: &Context<'a>) -> Document<'a> {
    let allocate = match ctx.result {
        Some(result) => array_creation(result, "countHint"),
        None => String::from("new object[countHint]"),
    };
    block(
        docvec![
            "if (",
            invocation(call),
            ".TryGetSingleResult(out var r))"
        ],
        docvec![
            line(),
            block("if (count == 0)", docvec![line(), "firstResult = r;"]),
            line(),
            block(
                "else",
                docvec![
                    line(),
                    block(
                        "if (results is null)",
                        docvec![
                            line(),
                            "results = ",
                            allocate,
                            ";",
                            line(),
                            "results[0] = firstResult;",
                        ],
                    ),
                    line(),
                    line(),
                    "results[count] = r;",
                ],
            ),
            line(),
            line(),
            "count++;",
        ],
    )
}

/// `new T[size]`, with the size placed before any array rank of `T`
/// (`new int[size][]` for `int[]`).
fn array_creation(element: &TypeRef, size: &str) -> String {
    let rendered = element.to_string();
    let suffix = element.suffix();
    let base = &rendered[..rendered.len() - suffix.len()];
    match suffix.find('[') {
        Some(rank) => format!(
            "new {base}{}[{size}]{}",
            &suffix[..rank],
            &suffix[rank..]
        ),
        None => format!("new {rendered}[{size}]"),
    }
}
