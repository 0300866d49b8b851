// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Whole-pipeline scenarios over the JSON fixtures in `tests/fixtures`.

use camino::Utf8PathBuf;
use crosschannel_core::declaration::{DeclarationFile, JsonDeclarations};
use crosschannel_core::naming::broker_class_name;
use crosschannel_core::output::{GeneratedUnit, InMemoryOutput, OutputError, OutputSink};
use crosschannel_core::prelude::*;
use crosschannel_core::{CancellationToken, GenerateError, Generation, Generator, GeneratorOptions};

fn fixture(name: &str) -> DeclarationFile {
    let dir = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    DeclarationFile::new(dir.join("tests/fixtures").join(name))
}

fn generate(name: &str) -> (Generation, Vec<Diagnostic>) {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let generation = Generator::default()
        .run(&fixture(name), &CancellationToken::new(), &mut diagnostics)
        .unwrap();
    (generation, diagnostics)
}

fn source<'a>(generation: &'a Generation, hint: &str) -> &'a str {
    &generation
        .unit(hint)
        .unwrap_or_else(|| panic!("missing unit {hint}"))
        .source
}

#[test]
fn services_produce_one_unit_per_namespace_plus_root() {
    let (generation, diagnostics) = generate("services.json");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let names: Vec<_> = generation.units.iter().map(|u| u.hint_name.as_str()).collect();
    assert_eq!(
        names,
        ["gen.CrossChannel.Demo", "gen.CrossChannel.Tools", "gen.CrossChannel"]
    );
}

#[test]
fn root_broker_is_internal_and_registered_at_root() {
    let (generation, _) = generate("services.json");
    let ping = broker_class_name("IPing", "Demo.IPing");
    let demo = source(&generation, "gen.CrossChannel.Demo");
    assert!(demo.contains("namespace Demo;\n\n"));
    assert!(demo.contains(&format!("internal class {ping} : IPing\n{{")));
    assert!(demo.contains("    void IPing.Ping(int a1)\n"));

    let root = source(&generation, "gen.CrossChannel");
    assert!(root.contains(&format!(
        "ChannelRegistry.Register(new(typeof(Demo.IPing), x => new Demo.{ping}(x), () => new Channel<Demo.IPing>(), (a) => new Channel<Demo.IPing>(a), {}));",
        i32::MAX
    )));
}

#[test]
fn nested_broker_is_private_inside_partial_parent() {
    let (generation, _) = generate("services.json");
    let calc = broker_class_name("ICalc", "Demo.Outer.ICalc");
    let demo = source(&generation, "gen.CrossChannel.Demo");

    assert!(demo.contains("internal partial class Outer\n{\n"));
    assert!(demo.contains(&format!("    private class {calc} : ICalc\n    {{")));
    assert!(demo.contains("        CrossChannel.RadioResult<int> ICalc.Add(int a1, int a2)\n"));
    assert!(demo.contains("        async System.Threading.Tasks.Task ICalc.Flush()\n"));
    assert!(demo.contains(&format!(
        "    internal static void __InitializeCC__()\n    {{\n        ChannelRegistry.Register(new(typeof(Demo.Outer.ICalc), x => new Demo.Outer.{calc}(x), () => new Channel<Demo.Outer.ICalc>(), (a) => new Channel<Demo.Outer.ICalc>(a), 8));\n    }}\n"
    )));

    let root = source(&generation, "gen.CrossChannel");
    assert!(root.contains("            Demo.Outer.__InitializeCC__();\n"));
}

#[test]
fn inherited_method_is_implemented_against_its_interface() {
    let (generation, _) = generate("services.json");
    let demo = source(&generation, "gen.CrossChannel.Demo");
    assert!(demo.contains("    void IChild.Poke()\n"));
    assert!(demo.contains(
        "    async System.Threading.Tasks.Task<CrossChannel.RadioResult<string>> Demo.IBase.Describe()\n"
    ));
    // IBase carries no marker and gets no broker of its own.
    assert!(!demo.contains(broker_class_name("IBase", "Demo.IBase").as_str()));
}

#[test]
fn generic_definition_and_instantiation() {
    let (generation, _) = generate("services.json");
    let generic = broker_class_name("IGen", "Tools.IGen<T>");
    let tools = source(&generation, "gen.CrossChannel.Tools");

    assert!(tools.contains(&format!("internal class {generic}<T> : IGen<T>\n{{")));
    assert!(tools.contains("    CrossChannel.RadioResult<T> IGen<T>.Get(T[] a1)\n"));
    assert!(tools.contains("results = new T[countHint];"));
    assert!(tools.contains(&format!(
        "ChannelRegistry.Register(new(typeof(Tools.IGen<T>), x => new Tools.{generic}<T>(x), () => new Channel<Tools.IGen<T>>(), (a) => new Channel<Tools.IGen<T>>(a), 2));"
    )));
    // Only the definition gets a class.
    assert_eq!(tools.matches(" class ").count(), 1);

    let root = source(&generation, "gen.CrossChannel");
    assert!(root.contains(&format!(
        "ChannelRegistry.Register(new(typeof(Tools.IGen<int>), x => new Tools.{generic}<int>(x), () => new Channel<Tools.IGen<int>>(), (a) => new Channel<Tools.IGen<int>>(a), 2));"
    )));
    assert!(!root.contains("Tools.IGen<T>"));
}

#[test]
fn generated_text_has_no_trailing_whitespace() {
    let (generation, _) = generate("services.json");
    for unit in &generation.units {
        for (n, line) in unit.source.lines().enumerate() {
            assert_eq!(line.trim_end(), line, "{}:{}", unit.hint_name, n + 1);
        }
        assert!(unit.source.starts_with("// <auto-generated/>\n"));
        assert!(unit.source.ends_with("}\n"));
    }
}

#[test]
fn output_is_deterministic() {
    let (first, _) = generate("services.json");
    let (second, _) = generate("services.json");
    assert_eq!(first.units, second.units);
}

#[test]
fn problems_are_reported_and_valid_parts_still_generate() {
    let (generation, diagnostics) = generate("problems.json");
    let ids: Vec<_> = diagnostics.iter().map(|d| d.id).collect();
    assert_eq!(
        ids,
        [
            DiagnosticId::InvalidMaxLinks,
            DiagnosticId::NotPartialParent,
            DiagnosticId::UnsupportedReturnType,
        ]
    );
    assert_eq!(diagnostics[1].arguments, ["Demo.Holder"]);
    assert_eq!(diagnostics[1].location, Location::new("Holder.cs", Span::new(0, 40)));
    assert_eq!(diagnostics[2].location, Location::new("Holder.cs", Span::new(60, 72)));
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));

    assert!(!generation.aborted);
    // The non-partial holder cannot host the nested broker.
    let names: Vec<_> = generation.units.iter().map(|u| u.hint_name.as_str()).collect();
    assert_eq!(names, ["gen.CrossChannel"]);
    assert!(!source(&generation, "gen.CrossChannel").contains("ChannelRegistry"));
}

#[test]
fn fatal_diagnostic_stops_all_output() {
    let (generation, diagnostics) = generate("fatal.json");
    assert!(generation.aborted);
    assert!(generation.units.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].is_fatal());
    assert_eq!(diagnostics[0].id, DiagnosticId::MissingRadioService);
    assert_eq!(diagnostics[0].location, Location::new("Bad.cs", Span::new(10, 22)));
}

#[test]
fn option_attribute_changes_startup_hook() {
    let json = r#"[{
        "name": "IPing",
        "full_name": "Demo.IPing",
        "namespace": "Demo",
        "kind": "interface",
        "interfaces": ["CrossChannel.IRadioService"],
        "attributes": [
            { "name": "CrossChannel.RadioServiceInterfaceAttribute" },
            {
                "name": "CrossChannel.CrossChannelGeneratorOptionAttribute",
                "named_arguments": { "CustomNamespace": "My.Boot", "UseModuleInitializer": false }
            }
        ]
    }]"#;
    let generation = Generator::new(GeneratorOptions::default().with_assembly_name("My.App"))
        .run(&JsonDeclarations(json), &CancellationToken::new(), &mut Vec::<Diagnostic>::new())
        .unwrap();
    assert_eq!(generation.options.custom_namespace.as_deref(), Some("My.Boot"));
    let root = source(&generation, "gen.CrossChannel");
    assert!(root.contains("namespace My.Boot\n{\n    public static class CrossChannelModule\n"));
    assert!(!root.contains("[ModuleInitializer]"));
}

#[test]
fn assembly_name_suffixes_default_hook_class() {
    let generation = Generator::new(GeneratorOptions::default().with_assembly_name("My.App"))
        .run(&fixture("services.json"), &CancellationToken::new(), &mut Vec::<Diagnostic>::new())
        .unwrap();
    let root = source(&generation, "gen.CrossChannel");
    assert!(root.contains("namespace CrossChannel\n{\n    public static class CrossChannelModule_My_App\n"));
    assert!(root.contains("        [ModuleInitializer]\n"));
}

/// Cancels the run once the first unit has been handed over.
struct CancelAfterFirst<'a> {
    inner: InMemoryOutput,
    cancel: &'a CancellationToken,
}

impl OutputSink for CancelAfterFirst<'_> {
    fn emit(&mut self, unit: GeneratedUnit) -> Result<(), OutputError> {
        self.inner.emit(unit)?;
        self.cancel.cancel();
        Ok(())
    }
}

#[test]
fn cancellation_keeps_finished_units() {
    let cancel = CancellationToken::new();
    let mut output = CancelAfterFirst {
        inner: InMemoryOutput::new(),
        cancel: &cancel,
    };
    let err = Generator::default()
        .run_into(&fixture("services.json"), &cancel, &mut Vec::<Diagnostic>::new(), &mut output)
        .unwrap_err();
    assert!(matches!(err, GenerateError::Cancelled));
    let units = output.inner.into_units();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].hint_name, "gen.CrossChannel.Demo");
}

#[test]
fn missing_fixture_is_a_source_error() {
    let err = Generator::default()
        .run(&fixture("absent.json"), &CancellationToken::new(), &mut Vec::<Diagnostic>::new())
        .unwrap_err();
    assert!(matches!(err, GenerateError::Source(_)));
}
