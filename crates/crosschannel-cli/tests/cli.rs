// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Runs the `crosschannel` binary end to end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const BAD_METHOD: &str = r#",
        { "name": "Bad", "return_type": "int", "parameters": [], "location": { "file": "Calc.cs", "start": 7, "end": 10 } }"#;

const CALC: &str = r#"{
  "types": [
    {
      "name": "Outer",
      "full_name": "Demo.Outer",
      "namespace": "Demo",
      "kind": "class",
      "is_partial": true
    },
    {
      "name": "ICalc",
      "full_name": "Demo.Outer.ICalc",
      "namespace": "Demo",
      "kind": "interface",
      "containing_type": "Demo.Outer",
      "interfaces": ["CrossChannel.IRadioService"],
      "attributes": [{ "name": "CrossChannel.RadioServiceInterfaceAttribute" }],
      "methods": [
        { "name": "Add", "return_type": "CrossChannel.RadioResult<int>", "parameters": ["int", "int"] }
      ]
    }
  ]
}"#;

fn crosschannel(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crosschannel"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run crosschannel")
}

fn write_declarations(dir: &Path, content: &str) {
    fs::write(dir.join("decls.json"), content).unwrap();
}

/// The calculator declarations with an extra method returning a plain `int`.
fn calc_with_bad_method() -> String {
    let at = CALC.find("] }\n      ]").unwrap() + "] }".len();
    format!("{}{BAD_METHOD}{}", &CALC[..at], &CALC[at..])
}

#[test]
fn generate_to_stdout() {
    let temp = tempfile::tempdir().unwrap();
    write_declarations(temp.path(), CALC);

    let output = crosschannel(&["generate", "decls.json", "--assembly-name", "My.App"], temp.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("// ---- gen.CrossChannel.Demo.cs ----\n"));
    assert!(stdout.contains("// ---- gen.CrossChannel.cs ----\n"));
    assert!(stdout.contains("public static class CrossChannelModule_My_App"));
}

#[test]
fn generate_reports_errors_but_still_writes() {
    let temp = tempfile::tempdir().unwrap();
    write_declarations(temp.path(), &calc_with_bad_method());
    fs::write(temp.path().join("Calc.cs"), "int x; Bad();").unwrap();

    let output = crosschannel(&["generate", "decls.json", "--out", "out"], temp.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CCG003"), "{stderr}");
    assert!(stderr.contains("1 error(s) reported"), "{stderr}");
    assert!(temp.path().join("out/gen.CrossChannel.Demo.cs").is_file());
    assert!(temp.path().join("out/gen.CrossChannel.cs").is_file());
}

#[test]
fn config_file_enables_file_output() {
    let temp = tempfile::tempdir().unwrap();
    write_declarations(temp.path(), CALC);
    fs::create_dir(temp.path().join("Generated")).unwrap();
    fs::write(
        temp.path().join("crosschannel.toml"),
        "[generator]\ngenerate_to_file = true\ntarget_folder = \"Generated\"\ncustom_namespace = \"Boot\"\n",
    )
    .unwrap();

    let output = crosschannel(&["generate", "decls.json"], temp.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
    let init = fs::read_to_string(temp.path().join("Generated/gen.CrossChannel.cs")).unwrap();
    assert!(init.contains("namespace Boot\n"));
}

#[test]
fn check_lists_brokers() {
    let temp = tempfile::tempdir().unwrap();
    write_declarations(temp.path(), &calc_with_bad_method());

    let output = crosschannel(&["check", "decls.json"], temp.path());
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Demo.Outer.ICalc -> __ICalc_Broker_"));
    assert!(stdout.contains("    ICalc.Add [single-result]\n"));
    assert!(stdout.contains("startup hook: CrossChannel.CrossChannelModule\n"));
}

#[test]
fn check_fails_on_fatal() {
    let temp = tempfile::tempdir().unwrap();
    write_declarations(
        temp.path(),
        &CALC.replace(r#""interfaces": ["CrossChannel.IRadioService"],"#, ""),
    );
    let output = crosschannel(&["check", "decls.json"], temp.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CCG002"), "{stderr}");
    assert!(output.stdout.is_empty());
}
