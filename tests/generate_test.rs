//! Integration tests for generation
//!
//! These tests load a package from a temporary directory and write every
//! output format through the library API.

use ccode::diag::Collect;
use ccode::generate::{self, Dev, GenerateError};
use ccode::project::{GraphError, Package};
use ccode::toolchain::{Arch, Compiler, Os, Toolchain};
use ccode::writer::WriteStatus;
use std::fs;
use std::path::Path;

const PACKAGE: &str = r#"
[package]
name = "demo"
version = "1.0.0"
edition = "c++20"

[build]
compiler = "gcc"
flags = ["-pthread"]

[vars]
VENDOR = "acme"

[[library]]
name = "core"
sources = ["src/core/**/*.cpp"]
include_dirs = ["include"]
defines = ["CORE_API=$(VENDOR:u)"]

[library.config_defines]
debug = ["CORE_CHECKS"]

[[executable]]
name = "app"
sources = ["src/app/*.cpp"]
dependencies = ["core"]
"#;

fn write_package(root: &Path, manifest: &str) {
    for dir in ["src/core/detail", "src/app", "include"] {
        fs::create_dir_all(root.join(dir)).expect("Failed to create package dirs");
    }
    for file in [
        "src/core/engine.cpp",
        "src/core/detail/pool.cpp",
        "src/app/main.cpp",
    ] {
        fs::write(root.join(file), "int x;\n").expect("Failed to write source");
    }
    fs::write(root.join("ccode.toml"), manifest).expect("Failed to write ccode.toml");
}

fn toolchain() -> Toolchain {
    Toolchain::new(Compiler::Gcc, Os::Linux, Arch::X64)
}

#[test]
fn generates_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_package(root, PACKAGE);

    let diag = Collect::new();
    let package = Package::load(&root.join("ccode.toml"), &diag).unwrap();
    let out = root.join("target");
    let written = generate::generate(&package, toolchain(), &Dev::ALL, &out, &diag).unwrap();

    assert!(written.iter().all(|(_, s)| *s == WriteStatus::Created));
    for file in [
        "target/make/Makefile",
        "target/make/core.mk",
        "target/make/app.mk",
        "target/cmake/CMakeLists.txt",
        "target/tundra/tundra.lua",
        "target/tundra/units.lua",
        ".vscode/c_cpp_properties.json",
        ".vscode/tasks.json",
        ".vscode/launch.json",
    ] {
        assert!(root.join(file).is_file(), "missing {}", file);
    }

    let core_mk = fs::read_to_string(out.join("make/core.mk")).unwrap();
    assert!(core_mk.contains(
        "core_SOURCES := ../../src/core/detail/pool.cpp ../../src/core/engine.cpp"
    ));
    // [vars] values are templates too
    assert!(core_mk.contains("core_DEFINES := -DCORE_API=ACME"));
    assert!(core_mk.contains("core_CXXFLAGS := -std=c++20 -Wall -Wextra -pthread"));
    assert!(core_mk.contains("core_FLAGS_debug := -g -O0 -DCORE_CHECKS"));

    let cmake = fs::read_to_string(out.join("cmake/CMakeLists.txt")).unwrap();
    assert!(cmake.contains("set(CMAKE_CXX_STANDARD 20)"));
    assert!(cmake.contains("    ${CCODE_ROOT}/src/core/engine.cpp"));
    assert!(cmake.contains("target_link_libraries(app PRIVATE core)"));

    let tasks = fs::read_to_string(root.join(".vscode/tasks.json")).unwrap();
    assert!(tasks.contains("make -C target/make CONFIG=debug"));

    assert!(diag.warnings().is_empty(), "{:?}", diag.warnings());
}

#[test]
fn second_run_rewrites_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_package(root, PACKAGE);

    let diag = Collect::new();
    let package = Package::load(&root.join("ccode.toml"), &diag).unwrap();
    let out = root.join("target");
    generate::generate(&package, toolchain(), &Dev::ALL, &out, &diag).unwrap();

    // User edits to editor settings survive regeneration
    let tasks = root.join(".vscode/tasks.json");
    fs::write(&tasks, "{}\n").unwrap();

    let written = generate::generate(&package, toolchain(), &Dev::ALL, &out, &diag).unwrap();
    for (path, status) in &written {
        if path.starts_with(root.join(".vscode")) {
            assert_eq!(*status, WriteStatus::Skipped, "{}", path.display());
        } else {
            assert_eq!(*status, WriteStatus::Unchanged, "{}", path.display());
        }
    }
    assert_eq!(fs::read_to_string(&tasks).unwrap(), "{}\n");
}

#[test]
fn changed_package_updates_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_package(root, PACKAGE);

    let diag = Collect::new();
    let package = Package::load(&root.join("ccode.toml"), &diag).unwrap();
    let out = root.join("target");
    generate::generate(&package, toolchain(), &[Dev::Make], &out, &diag).unwrap();

    fs::write(root.join("src/app/extra.cpp"), "int y;\n").unwrap();
    let package = Package::load(&root.join("ccode.toml"), &diag).unwrap();
    let written = generate::generate(&package, toolchain(), &[Dev::Make], &out, &diag).unwrap();

    let status = |name: &str| {
        written
            .iter()
            .find(|(p, _)| p.ends_with(name))
            .map(|(_, s)| *s)
            .unwrap()
    };
    assert_eq!(status("app.mk"), WriteStatus::Updated);
    assert_eq!(status("core.mk"), WriteStatus::Unchanged);
    assert_eq!(status("Makefile"), WriteStatus::Unchanged);
}

#[test]
fn dependency_cycle_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = PACKAGE.replace(
        "include_dirs = [\"include\"]",
        "include_dirs = [\"include\"]\ndependencies = [\"app\"]",
    );
    write_package(root, &manifest);

    let diag = Collect::new();
    let package = Package::load(&root.join("ccode.toml"), &diag).unwrap();
    let err = generate::generate(&package, toolchain(), &Dev::ALL, &root.join("target"), &diag)
        .unwrap_err();

    match err {
        GenerateError::Graph(GraphError::Cycle(names)) => {
            assert_eq!(names, vec!["core", "app", "core"]);
        }
        other => panic!("expected a cycle, got {}", other),
    }
    assert!(!root.join("target").exists());
}
