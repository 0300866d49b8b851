// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Initializer routines, the root class and the startup hook.

use super::INITIALIZER_NAME;
use crate::codegen::document::{Document, block, line, lines};
use crate::codegen::ir::{InitializerRoutine, ModuleHook, Registration};
use crate::docvec;

const ROOT_NAMESPACE: &str = "CrossChannel.Generated";

pub(super) fn registration(registration: &Registration) -> Document<'_> {
    let interface = &registration.interface;
    Document::String(format!(
        "ChannelRegistry.Register(new(typeof({interface}), x => new {}(x), () => new Channel<{interface}>(), (a) => new Channel<{interface}>(a), {}));",
        registration.broker, registration.max_links
    ))
}

pub(super) fn routine<'a>(routine: &'a InitializerRoutine, access: &'a str) -> Document<'a> {
    let registrations = routine.registrations.iter().map(registration);
    let calls = routine
        .child_calls
        .iter()
        .map(|child| docvec![child, ".", INITIALIZER_NAME, "();"]);
    block(
        docvec![access, " static void ", INITIALIZER_NAME, "()"],
        lines(registrations.chain(calls)),
    )
}

pub(super) fn root_class(root: &InitializerRoutine) -> Document<'_> {
    block(
        docvec!["namespace ", ROOT_NAMESPACE],
        docvec![
            line(),
            block("internal static class Root", docvec![line(), routine(root, "internal")]),
        ],
    )
}

pub(super) fn module_class(module: &ModuleHook) -> Document<'_> {
    let attribute = if module.use_module_initializer {
        docvec![line(), "[ModuleInitializer]"]
    } else {
        docvec![]
    };
    let initialize = block(
        "public static void Initialize()",
        docvec![
            line(),
            "if (Initialized) return;",
            line(),
            "Initialized = true;",
            line(),
            ROOT_NAMESPACE,
            ".Root.",
            INITIALIZER_NAME,
            "();",
        ],
    );
    block(
        docvec!["namespace ", &module.namespace],
        docvec![
            line(),
            block(
                docvec!["public static class ", &module.class_name],
                docvec![
                    line(),
                    "private static bool Initialized;",
                    line(),
                    attribute,
                    line(),
                    initialize,
                ],
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::csharp::initializer_source;

    #[test]
    fn registration_line() {
        let r = Registration {
            interface: "Demo.ICalc".into(),
            broker: "Demo.__ICalc_Broker_12345678__".into(),
            max_links: 8,
        };
        assert_eq!(
            registration(&r).to_pretty_string(),
            "ChannelRegistry.Register(new(typeof(Demo.ICalc), x => new Demo.__ICalc_Broker_12345678__(x), () => new Channel<Demo.ICalc>(), (a) => new Channel<Demo.ICalc>(a), 8));"
        );
    }

    #[test]
    fn initializer_unit_layout() {
        let root = InitializerRoutine {
            registrations: Vec::new(),
            child_calls: vec!["Demo.Outer".into()],
        };
        let module = ModuleHook {
            namespace: "CrossChannel".into(),
            class_name: "CrossChannelModule_App".into(),
            use_module_initializer: true,
        };
        let text = initializer_source(&root, &module);
        let expected_tail = "\
namespace CrossChannel.Generated
{
    internal static class Root
    {
        internal static void __InitializeCC__()
        {
            Demo.Outer.__InitializeCC__();
        }
    }
}

namespace CrossChannel
{
    public static class CrossChannelModule_App
    {
        private static bool Initialized;

        [ModuleInitializer]
        public static void Initialize()
        {
            if (Initialized) return;
            Initialized = true;
            CrossChannel.Generated.Root.__InitializeCC__();
        }
    }
}
";
        assert!(text.starts_with("// <auto-generated/>\n"));
        assert!(text.ends_with(expected_tail), "{text}");
    }

    #[test]
    fn module_initializer_attribute_is_optional() {
        let module = ModuleHook {
            namespace: "Custom".into(),
            class_name: "CrossChannelModule".into(),
            use_module_initializer: false,
        };
        let text = module_class(&module).to_pretty_string();
        assert!(!text.contains("[ModuleInitializer]"));
        assert!(text.contains("private static bool Initialized;\n\n        public static void Initialize()"));
    }
}
