// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for generator crash safety.
//!
//! Arbitrary bytes are read as a JSON declaration set and pushed through the
//! whole pipeline. Malformed input must come back as an error or as
//! diagnostics, never as a panic.
//!
//! Seed `fuzz/corpus/generate_arbitrary/` with the files in
//! `crates/crosschannel-core/tests/fixtures/`.

#![no_main]

use crosschannel_core::declaration::JsonDeclarations;
use crosschannel_core::prelude::Diagnostic;
use crosschannel_core::{CancellationToken, Generator};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The declaration reader only accepts text.
    if let Ok(json) = std::str::from_utf8(data) {
        let mut diagnostics = Vec::<Diagnostic>::new();
        if let Ok(generation) =
            Generator::default().run(&JsonDeclarations(json), &CancellationToken::new(), &mut diagnostics)
        {
            // A fatal diagnostic suppresses every unit.
            assert!(!generation.aborted || generation.units.is_empty());
        }
    }
});
