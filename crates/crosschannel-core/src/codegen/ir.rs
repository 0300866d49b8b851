// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Intermediate representation of generated units.
//!
//! **DDD Context:** Code Generation
//!
//! The synthesizer decides *what* a broker does; a backend decides how it is
//! spelled. Statements are semantic (take a snapshot, collect a result,
//! branch on how many targets answered) rather than textual, so the dispatch
//! shapes can be checked without parsing C#.

use crate::declaration::{Accessibility, TypeKind, TypeRef};
use crate::model::DispatchKind;
use ecow::EcoString;

/// Everything generated for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub units: Vec<NamespaceUnit>,
    /// Registrations and child calls for root-level definitions.
    pub root: InitializerRoutine,
    pub module: ModuleHook,
}

/// Generated content for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceUnit {
    pub namespace: EcoString,
    pub items: Vec<Item>,
}

/// A top-level or nested generated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Broker(BrokerClass),
    Scope(PartialScope),
}

/// A `partial` re-declaration of a user type that hosts nested brokers and
/// the initializer routine for its level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialScope {
    pub accessibility: Accessibility,
    pub kind: TypeKind,
    /// Name with generic parameters, as declared (`Outer`, `Box<T>`).
    pub name: EcoString,
    pub items: Vec<Item>,
    pub initializer: Option<InitializerRoutine>,
}

/// A broker class implementing one marked interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerClass {
    pub name: EcoString,
    /// Type parameters of an open generic interface.
    pub type_parameters: Vec<EcoString>,
    /// Nested brokers are `private`, top-level ones `internal`.
    pub nested: bool,
    /// The implemented interface as written at the broker's level.
    pub interface: EcoString,
    pub methods: Vec<BrokerMethod>,
    /// Lazy registration helper for open generic brokers.
    pub self_registration: Option<Registration>,
}

/// One explicit interface method implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMethod {
    pub name: EcoString,
    /// Interface qualifier of the explicit implementation.
    pub interface: EcoString,
    pub return_type: TypeRef,
    pub parameters: Vec<TypeRef>,
    pub kind: DispatchKind,
    pub body: Vec<Stmt>,
}

impl BrokerMethod {
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.kind.is_async()
    }
}

/// A call on the resolved subscriber instance, forwarding every parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: EcoString,
    pub arguments: usize,
}

/// Aggregation buffers a dispatch body can shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    /// Collected single results.
    Results,
    /// Pending operation handles.
    Pending,
}

/// Counters a dispatch body can stop on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Entries stored in the buffer.
    Stored,
    /// Subscribers invoked so far, whether or not they answered.
    Invoked,
}

/// Values a dispatch body returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// The empty result wrapper.
    Default,
    /// A wrapper around the only collected result.
    WrapFirst,
    /// A wrapper around the collected results buffer.
    WrapResults,
    /// The awaited result of the only pending operation.
    AwaitFirst,
    /// Awaits every pending operation concurrently and wraps the single value
    /// of each (or the default when one yielded none).
    AwaitAllUnwrapped,
}

/// Semantic statements of a dispatch body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Takes one snapshot of the channel: entries plus capacity hint.
    TakeSnapshot,
    /// Declares the first-result slot, the lazily allocated results buffer,
    /// the counter and the invocation counter.
    DeclareResults { result: TypeRef },
    /// Declares a pending-operation buffer presized to the hint, and the
    /// counter.
    DeclarePending { element: TypeRef },
    /// Runs the body for every live entry of the snapshot. Null entries are
    /// skipped; entries that no longer resolve are disposed and skipped.
    ForEachLive(Vec<Stmt>),
    /// Leaves the loop once the counter has reached the hint.
    BreakIfFull(Counter),
    /// Counts the invocation about to happen.
    CountInvocation,
    /// Invokes and discards the result.
    Invoke(Call),
    /// Invokes and keeps the single result, if the call produced one.
    CollectResult(Call),
    /// Invokes and stores the returned pending operation.
    CollectPending(Call),
    /// Branches on the counter.
    ByCount {
        zero: Vec<Stmt>,
        one: Vec<Stmt>,
        many: Vec<Stmt>,
    },
    /// Shrinks a buffer to the counter when it is below the hint.
    ShrinkToCount(Buffer),
    /// Awaits the only pending operation.
    AwaitFirst,
    /// Awaits every pending operation concurrently.
    AwaitAll,
    Return(Option<Value>),
}

/// Registers one closed interface with the runtime registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Fully qualified interface type (`Demo.ICalc`, `Demo.IGen<int>`).
    pub interface: EcoString,
    /// Fully qualified broker type to construct.
    pub broker: EcoString,
    pub max_links: i32,
}

/// Registrations for one containment level, then calls into the routines of
/// child levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializerRoutine {
    pub registrations: Vec<Registration>,
    /// Qualified names of child types whose routine is invoked.
    pub child_calls: Vec<EcoString>,
}

impl InitializerRoutine {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty() && self.child_calls.is_empty()
    }
}

/// The process-startup hook that runs the root routine once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHook {
    pub namespace: EcoString,
    pub class_name: EcoString,
    pub use_module_initializer: bool,
}
