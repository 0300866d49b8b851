// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Dispatch body per method shape.
//!
//! | Kind | Per entry | After the loop |
//! |---|---|---|
//! | Void | invoke | nothing |
//! | SingleResult | stop at hint, invoke, keep result | 0 → default, 1 → wrap first, n → shrink, wrap all |
//! | AsyncVoid | stop at hint, invoke, keep task | 0 → return, 1 → await it, n → shrink, await all |
//! | AsyncSingleResult | stop at hint, invoke, keep task | 0 → default, 1 → await it, n → shrink, await all and unwrap |

use super::ir::{Buffer, Call, Counter, Stmt, Value};
use crate::model::{DispatchKind, ServiceMethod};

/// Builds the dispatch body for `method`, or `None` for
/// [`DispatchKind::Other`].
#[must_use]
pub fn dispatch_body(method: &ServiceMethod) -> Option<Vec<Stmt>> {
    let call = Call {
        method: method.name.clone(),
        arguments: method.parameters.len(),
    };
    let body = match method.kind {
        DispatchKind::Other => return None,
        DispatchKind::Void => vec![
            Stmt::TakeSnapshot,
            Stmt::ForEachLive(vec![Stmt::Invoke(call)]),
        ],
        DispatchKind::SingleResult => vec![
            Stmt::TakeSnapshot,
            Stmt::DeclareResults {
                result: method.result.clone()?,
            },
            Stmt::ForEachLive(vec![
                Stmt::BreakIfFull(Counter::Invoked),
                Stmt::CountInvocation,
                Stmt::CollectResult(call),
            ]),
            Stmt::ByCount {
                zero: vec![Stmt::Return(Some(Value::Default))],
                one: vec![Stmt::Return(Some(Value::WrapFirst))],
                many: vec![
                    Stmt::ShrinkToCount(Buffer::Results),
                    Stmt::Return(Some(Value::WrapResults)),
                ],
            },
        ],
        DispatchKind::AsyncVoid => vec![
            Stmt::TakeSnapshot,
            Stmt::DeclarePending {
                element: method.return_type.clone(),
            },
            Stmt::ForEachLive(vec![
                Stmt::BreakIfFull(Counter::Stored),
                Stmt::CollectPending(call),
            ]),
            Stmt::ByCount {
                zero: vec![Stmt::Return(None)],
                one: vec![Stmt::AwaitFirst],
                many: vec![Stmt::ShrinkToCount(Buffer::Pending), Stmt::AwaitAll],
            },
        ],
        DispatchKind::AsyncSingleResult => vec![
            Stmt::TakeSnapshot,
            Stmt::DeclarePending {
                element: method.return_type.clone(),
            },
            Stmt::ForEachLive(vec![
                Stmt::BreakIfFull(Counter::Stored),
                Stmt::CollectPending(call),
            ]),
            Stmt::ByCount {
                zero: vec![Stmt::Return(Some(Value::Default))],
                one: vec![Stmt::Return(Some(Value::AwaitFirst))],
                many: vec![
                    Stmt::ShrinkToCount(Buffer::Pending),
                    Stmt::Return(Some(Value::AwaitAllUnwrapped)),
                ],
            },
        ],
    };
    Some(body)
}
