//! CLI surface tests for the `rmc4` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rmc4() -> Command {
    Command::cargo_bin("rmc4").expect("binary builds")
}

fn write_source(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("test.c");
    std::fs::write(&path, format!("#include <stdio.h>\nint main() {{\n{body}\n}}\n")).unwrap();
    path
}

#[test]
fn test_no_arguments_is_usage_error() {
    rmc4()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("usage: rmc4"));
}

#[test]
fn test_wrong_output_name_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "int a = 1;");

    rmc4()
        .arg(source)
        .arg(dir.path().join("somewhere_else.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("compiler_output.txt"));
}

#[test]
fn test_missing_source_is_io_error() {
    let dir = TempDir::new().unwrap();

    rmc4()
        .arg(dir.path().join("no_such_file.c"))
        .arg(dir.path().join("compiler_output.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot open"));
}

#[test]
fn test_successful_compilation() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "int a = 5;\nint b = 10;\nint c = a + b;");
    let output = dir.path().join("compiler_output.txt");

    rmc4().arg(source).arg(&output).assert().success();

    let report = std::fs::read_to_string(output).unwrap();
    assert!(report.contains("REAL TARGET CODE"));
    assert!(report.contains("c = 15"));
}

#[test]
fn test_redeclaration_exits_3() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "int a;\nint a;");
    let output = dir.path().join("compiler_output.txt");

    rmc4()
        .arg(source)
        .arg(&output)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("[03.22]"));

    assert!(!output.exists());
}

#[test]
fn test_syntax_error_exits_2() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "int a = ;");

    rmc4()
        .arg(source)
        .arg(dir.path().join("compiler_output.txt"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Syntax error"));
}

#[test]
fn test_warning_compiles_successfully() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "int x;\nif (x) {\nx = 1;\n}");
    let output = dir.path().join("compiler_output.txt");

    rmc4().arg(source).arg(&output).assert().success();

    let report = std::fs::read_to_string(output).unwrap();
    assert!(report.contains("Expected BOOL in condition of IF"));
}

#[test]
fn test_progress_lines_on_stdout() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "int a = 1;");

    rmc4()
        .arg(source)
        .arg(dir.path().join("compiler_output.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Lexical analysis completed"))
        .stdout(predicate::str::contains("Target code generation completed"));
}
