// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Deterministic generated names.
//!
//! Broker class names are a pure function of the interface's qualified name,
//! so they stay stable across incremental rebuilds.

use ecow::{EcoString, eco_format};
use sha2::{Digest, Sha256};

/// 64-bit content hash of `text`: the first eight bytes of its SHA-256
/// digest, read big-endian.
#[must_use]
pub fn hash64(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Broker class name for an interface, e.g. `__ICalc_Broker_1a2b3c4d__`.
///
/// Only the low 32 bits of the hash are printed.
#[must_use]
pub fn broker_class_name(simple_name: &str, full_name: &str) -> EcoString {
    #[allow(clippy::cast_possible_truncation)] // name carries the low 32 bits
    let low = hash64(full_name) as u32;
    eco_format!("__{simple_name}_Broker_{low:08x}__")
}

/// Turns an assembly name into an identifier fragment by replacing every
/// character that cannot appear in a C# identifier with `_`.
#[must_use]
pub fn assembly_identifier(assembly_name: &str) -> String {
    assembly_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Module class name: `CrossChannelModule`, optionally suffixed.
#[must_use]
pub fn module_class_name(custom_namespace: Option<&str>, assembly_name: Option<&str>) -> EcoString {
    match (custom_namespace, assembly_name) {
        (None, Some(assembly)) if !assembly.is_empty() => {
            eco_format!("CrossChannelModule_{}", assembly_identifier(assembly))
        }
        _ => EcoString::from("CrossChannelModule"),
    }
}
