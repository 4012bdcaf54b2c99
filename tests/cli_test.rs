//! Integration tests for the `ccode` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_ccode(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ccode"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run ccode")
}

fn output_text(output: &Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn create_package(dir: &Path) {
    fs::create_dir_all(dir.join("lib")).expect("Failed to create lib dir");
    fs::create_dir_all(dir.join("app")).expect("Failed to create app dir");
    fs::write(dir.join("lib/util.c"), "int util;\n").expect("Failed to write source");
    fs::write(dir.join("app/main.c"), "int main(void) { return 0; }\n")
        .expect("Failed to write source");
    fs::write(
        dir.join("ccode.toml"),
        r#"[package]
name = "tiny"
version = "0.2.0"
edition = "c11"

[vars]
TARGETS = ["alpha", "beta"]

[[library]]
name = "util"
sources = ["lib/*.c"]

[[executable]]
name = "tool"
sources = ["app/*.c"]
dependencies = ["util"]
"#,
    )
    .expect("Failed to write ccode.toml");
}

#[test]
fn expand_prints_one_line_per_result() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ccode(
        dir.path(),
        &[
            "expand",
            "$(OS)-$(ARCH:u)",
            "-D",
            "OS=linux",
            "-D",
            "ARCH=x64",
            "-D",
            "ARCH=arm64",
        ],
    );

    assert!(output.status.success(), "{}", output_text(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "linux-X64\nlinux-ARM64\n"
    );
}

#[test]
fn expand_reads_package_vars() {
    let dir = tempfile::tempdir().unwrap();
    create_package(dir.path());

    let output = run_ccode(
        dir.path(),
        &["expand", "$(TARGETS:p--:j,)", "--file", "ccode.toml"],
    );
    assert!(output.status.success(), "{}", output_text(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "--alpha,--beta\n");
}

#[test]
fn expand_rejects_bad_definition() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ccode(dir.path(), &["expand", "$(X)", "-D", "X"]);
    let text = output_text(&output);

    assert!(!output.status.success());
    assert!(text.contains("expected KEY=VALUE"), "{}", text);
}

#[test]
fn tree_shows_build_order() {
    let dir = tempfile::tempdir().unwrap();
    create_package(dir.path());

    let output = run_ccode(dir.path(), &["tree"]);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    assert!(output.status.success(), "{}", output_text(&output));
    assert!(stdout.contains("tiny v0.2.0"));
    assert!(stdout.contains("├── util (library, 1 source)"));
    assert!(stdout.contains("└── tool (executable, 1 source)"));
    assert!(stdout.contains("    └── util"));
}

#[test]
fn generate_writes_requested_formats() {
    let dir = tempfile::tempdir().unwrap();
    create_package(dir.path());

    let output = run_ccode(
        dir.path(),
        &[
            "generate", "--dev", "make", "--dev", "cmake", "--os", "linux", "--arch", "x64",
            "--compiler", "clang",
        ],
    );
    let text = output_text(&output);
    assert!(output.status.success(), "{}", text);
    assert!(text.contains("Created"), "{}", text);

    let util_mk = fs::read_to_string(dir.path().join("target/make/util.mk")).unwrap();
    assert!(util_mk.contains("util_CFLAGS := -std=c11 -Wall -Wextra"));
    assert!(dir.path().join("target/cmake/CMakeLists.txt").is_file());
    assert!(!dir.path().join("target/tundra").exists());
    assert!(!dir.path().join(".vscode").exists());

    let makefile = fs::read_to_string(dir.path().join("target/make/Makefile")).unwrap();
    assert!(makefile.contains("CC := clang"));
}

#[test]
fn generate_without_package_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ccode(dir.path(), &["generate"]);
    let text = output_text(&output);

    assert!(!output.status.success());
    assert!(text.contains("ccode.toml"), "{}", text);
}
