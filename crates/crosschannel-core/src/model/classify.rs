// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Method return-shape classification.
//!
//! Matching is structural: qualified definition name plus arity, with no
//! array or nullable suffix. Parameters never take part.

use crate::declaration::TypeRef;
use serde::Serialize;
use std::fmt;

pub const RADIO_RESULT: &str = "CrossChannel.RadioResult";
pub const TASK: &str = "System.Threading.Tasks.Task";

/// How a broker method fans out and aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DispatchKind {
    /// Unsupported return shape.
    Other,
    /// `void`
    Void,
    /// `RadioResult<T>`
    SingleResult,
    /// `Task`
    AsyncVoid,
    /// `Task<RadioResult<T>>`
    AsyncSingleResult,
}

impl DispatchKind {
    /// True for the kinds whose broker method is `async`.
    #[must_use]
    pub fn is_async(self) -> bool {
        matches!(self, DispatchKind::AsyncVoid | DispatchKind::AsyncSingleResult)
    }

    /// True for the kinds that carry a wrapped result type.
    #[must_use]
    pub fn has_result(self) -> bool {
        matches!(
            self,
            DispatchKind::SingleResult | DispatchKind::AsyncSingleResult
        )
    }
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchKind::Other => "other",
            DispatchKind::Void => "void",
            DispatchKind::SingleResult => "single-result",
            DispatchKind::AsyncVoid => "async-void",
            DispatchKind::AsyncSingleResult => "async-single-result",
        })
    }
}

/// Dispatch kind plus the innermost result type, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: DispatchKind,
    pub result: Option<TypeRef>,
}

impl Classification {
    fn new(kind: DispatchKind, result: Option<TypeRef>) -> Self {
        Self { kind, result }
    }
}

/// Classifies a method by its declared return type.
///
/// ```
/// use crosschannel_core::model::{DispatchKind, classify};
///
/// let ty = "System.Threading.Tasks.Task<CrossChannel.RadioResult<string>>".parse().unwrap();
/// let c = classify(&ty);
/// assert_eq!(c.kind, DispatchKind::AsyncSingleResult);
/// assert_eq!(c.result.unwrap().to_string(), "string");
/// ```
#[must_use]
pub fn classify(return_type: &TypeRef) -> Classification {
    if return_type.is_definition("void", 0) {
        return Classification::new(DispatchKind::Void, None);
    }
    if return_type.is_definition(RADIO_RESULT, 1) {
        let result = return_type.arguments()[0].clone();
        return Classification::new(DispatchKind::SingleResult, Some(result));
    }
    if return_type.is_definition(TASK, 0) {
        return Classification::new(DispatchKind::AsyncVoid, None);
    }
    if return_type.is_definition(TASK, 1) {
        let inner = &return_type.arguments()[0];
        if inner.is_definition(RADIO_RESULT, 1) {
            let result = inner.arguments()[0].clone();
            return Classification::new(DispatchKind::AsyncSingleResult, Some(result));
        }
    }
    Classification::new(DispatchKind::Other, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind(s: &str) -> DispatchKind {
        classify(&s.parse().unwrap()).kind
    }

    #[test]
    fn recognised_shapes() {
        assert_eq!(kind("void"), DispatchKind::Void);
        assert_eq!(kind("CrossChannel.RadioResult<int>"), DispatchKind::SingleResult);
        assert_eq!(kind("System.Threading.Tasks.Task"), DispatchKind::AsyncVoid);
        assert_eq!(
            kind("System.Threading.Tasks.Task<CrossChannel.RadioResult<Demo.Payload>>"),
            DispatchKind::AsyncSingleResult
        );
    }

    #[test]
    fn result_types() {
        let c = classify(&"CrossChannel.RadioResult<int[]>".parse().unwrap());
        assert_eq!(c.result.unwrap().to_string(), "int[]");
        let c = classify(
            &"System.Threading.Tasks.Task<CrossChannel.RadioResult<System.Collections.Generic.List<int>>>"
                .parse()
                .unwrap(),
        );
        assert_eq!(
            c.result.unwrap().to_string(),
            "System.Collections.Generic.List<int>"
        );
        assert!(classify(&TypeRef::void()).result.is_none());
    }

    #[test]
    fn near_misses_are_other() {
        for ty in [
            "int",
            "RadioResult<int>",
            "Task",
            "CrossChannel.RadioResult<int, int>",
            "CrossChannel.RadioResult<int>[]",
            "CrossChannel.RadioResult<int>?",
            "System.Threading.Tasks.Task<int>",
            "System.Threading.Tasks.Task[]",
            "System.Threading.Tasks.ValueTask",
            "System.Threading.Tasks.Task<CrossChannel.RadioResult<int>[]>",
            "System.Threading.Tasks.Task<System.Threading.Tasks.Task<CrossChannel.RadioResult<int>>>",
        ] {
            assert_eq!(kind(ty), DispatchKind::Other, "{ty}");
        }
    }

    // ========================================================================
    // Property tests
    // ========================================================================

    fn leaf() -> impl Strategy<Value = TypeRef> {
        prop_oneof![
            Just(TypeRef::simple("int")),
            Just(TypeRef::simple("string")),
            Just(TypeRef::simple("Demo.Payload")),
            Just(TypeRef::void()),
            Just(TypeRef::simple(TASK)),
        ]
    }

    fn any_type() -> impl Strategy<Value = TypeRef> {
        leaf().prop_recursive(3, 12, 2, |inner| {
            (
                prop_oneof![Just(RADIO_RESULT), Just(TASK), Just("Demo.Box")],
                prop::collection::vec(inner, 1..3),
            )
                .prop_map(|(name, args)| TypeRef::generic(name, args))
        })
    }

    proptest! {
        #[test]
        fn result_present_iff_kind_has_result(ty in any_type()) {
            let c = classify(&ty);
            prop_assert_eq!(c.result.is_some(), c.kind.has_result());
        }

        #[test]
        fn single_result_unwraps_one_level(inner in any_type()) {
            let ty = TypeRef::generic(RADIO_RESULT, vec![inner.clone()]);
            let c = classify(&ty);
            prop_assert_eq!(c.kind, DispatchKind::SingleResult);
            prop_assert_eq!(c.result, Some(inner));
        }

        #[test]
        fn task_of_result_unwraps_two_levels(inner in any_type()) {
            let ty = TypeRef::generic(
                TASK,
                vec![TypeRef::generic(RADIO_RESULT, vec![inner.clone()])],
            );
            let c = classify(&ty);
            prop_assert_eq!(c.kind, DispatchKind::AsyncSingleResult);
            prop_assert_eq!(c.result, Some(inner));
        }
    }
}
