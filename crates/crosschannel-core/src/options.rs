// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generator options.
//!
//! Options come from two places. The host (or the CLI's `crosschannel.toml`)
//! supplies a base [`GeneratorOptions`]; the first
//! `CrossChannel.CrossChannelGeneratorOptionAttribute` found on a declared
//! interface then overrides the fields it names.

use crate::declaration::{
    AttributeDeclaration, AttributeValue, GENERATOR_OPTION_ATTRIBUTE, TypeDeclaration, TypeKind,
};
use camino::{Utf8Path, Utf8PathBuf};
use ecow::EcoString;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name of the folder, next to the declaring file, that receives generated
/// files when the option attribute enables file output.
pub const GENERATED_FOLDER: &str = "Generated";

/// Options controlling the generated units.
///
/// # Example
///
/// ```
/// use crosschannel_core::GeneratorOptions;
///
/// let options = GeneratorOptions::default()
///     .with_assembly_name("My.App")
///     .with_module_initializer(false);
/// assert_eq!(options.module_namespace(), "CrossChannel");
/// assert_eq!(options.module_class_name(), "CrossChannelModule_My_App");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Namespace of the startup hook class. Replaces `CrossChannel` and drops
    /// the assembly suffix from the class name.
    pub custom_namespace: Option<EcoString>,
    /// Assembly name, used for the startup hook class suffix.
    pub assembly_name: Option<EcoString>,
    /// Write units to `target_folder` instead of keeping them in memory.
    pub generate_to_file: bool,
    pub target_folder: Option<Utf8PathBuf>,
    /// Put `[ModuleInitializer]` on the startup hook.
    pub use_module_initializer: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            custom_namespace: None,
            assembly_name: None,
            generate_to_file: false,
            target_folder: None,
            use_module_initializer: true,
        }
    }
}

impl GeneratorOptions {
    #[must_use]
    pub fn with_custom_namespace(mut self, namespace: impl Into<EcoString>) -> Self {
        self.custom_namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_assembly_name(mut self, assembly_name: impl Into<EcoString>) -> Self {
        self.assembly_name = Some(assembly_name.into());
        self
    }

    /// Enables file output into `folder`.
    #[must_use]
    pub fn with_target_folder(mut self, folder: impl Into<Utf8PathBuf>) -> Self {
        self.generate_to_file = true;
        self.target_folder = Some(folder.into());
        self
    }

    #[must_use]
    pub fn with_module_initializer(mut self, enabled: bool) -> Self {
        self.use_module_initializer = enabled;
        self
    }

    /// Namespace that holds the startup hook class.
    #[must_use]
    pub fn module_namespace(&self) -> &str {
        match self.custom_namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => "CrossChannel",
        }
    }

    /// Class name of the startup hook.
    #[must_use]
    pub fn module_class_name(&self) -> EcoString {
        let custom = self.custom_namespace.as_deref().filter(|ns| !ns.is_empty());
        crate::naming::module_class_name(custom, self.assembly_name.as_deref())
    }

    /// Folder that file output goes to, if file output is enabled and the
    /// folder exists.
    #[must_use]
    pub fn output_folder(&self) -> Option<&Utf8Path> {
        if !self.generate_to_file {
            return None;
        }
        self.target_folder.as_deref().filter(|folder| folder.is_dir())
    }

    /// Applies the first option attribute found on an interface in
    /// `declarations`. Returns true if one was found.
    pub fn merge_declarations(&mut self, declarations: &[TypeDeclaration]) -> bool {
        let found = declarations
            .iter()
            .filter(|decl| decl.kind == TypeKind::Interface)
            .find_map(|decl| {
                decl.attribute(GENERATOR_OPTION_ATTRIBUTE)
                    .map(|attribute| (decl, attribute))
            });
        let Some((decl, attribute)) = found else {
            return false;
        };
        debug!(interface = %decl.full_name, "Applying generator option attribute");
        self.apply_attribute(attribute, decl.location.file.as_deref());
        true
    }

    /// Applies the named arguments of an option attribute. The target folder
    /// becomes `Generated` next to `declaring_file`.
    pub fn apply_attribute(&mut self, attribute: &AttributeDeclaration, declaring_file: Option<&str>) {
        for (name, value) in &attribute.named_arguments {
            match (name.as_str(), value) {
                ("GenerateToFile", AttributeValue::Bool(enabled)) => {
                    self.generate_to_file = *enabled;
                }
                ("CustomNamespace", AttributeValue::String(ns)) => {
                    self.custom_namespace = Some(ns.clone());
                }
                ("UseModuleInitializer", AttributeValue::Bool(enabled)) => {
                    self.use_module_initializer = *enabled;
                }
                ("AttachDebugger", _) => {}
                (other, value) => {
                    warn!(argument = other, ?value, "Ignoring generator option argument");
                }
            }
        }
        if let Some(file) = declaring_file {
            let dir = Utf8Path::new(file).parent().unwrap_or(Utf8Path::new(""));
            self.target_folder = Some(dir.join(GENERATED_FOLDER));
        }
    }
}
