//! VSCode settings in `.vscode/`: IntelliSense configuration per build
//! configuration, build tasks that drive the Make output, and a launch entry
//! per executable.
//!
//! These files are written once. After that they belong to the user and are
//! left alone.

use super::{Dev, Generation, Output, lines_for, relative_path};
use crate::project::Project;
use crate::toolchain::{self, Compiler};
use crate::vars::{Lookup, Scope};
use serde_json::{Value, json};

const WORKSPACE: &str = "${workspaceFolder}";

pub fn generate(generation: &Generation, root: &str) -> Vec<Output> {
    let mut base = Scope::new(&generation.vars);
    base.set_one("ROOT", root);
    base.set_one("WORKSPACE", WORKSPACE);

    let make_dir = make_dir(generation);
    vec![
        json_output("c_cpp_properties.json", &cpp_properties(generation, &base)),
        json_output("tasks.json", &tasks(generation, &make_dir)),
        json_output("launch.json", &launch(generation, &base, &make_dir)),
    ]
}

fn json_output(name: &str, value: &Value) -> Output {
    // Serializing a json! value cannot fail
    let text = serde_json::to_string_pretty(value).unwrap_or_default();
    let lines = text.lines().map(str::to_string).collect();
    Output::new(format!(".vscode/{}", name), lines).preserved()
}

/// Where the Make output lives, as seen from the package root.
fn make_dir(generation: &Generation) -> String {
    let dir = Dev::Make.output_dir(&generation.out_dir, &generation.package.root);
    relative_path(&generation.package.root, &dir)
        .unwrap_or_else(|_| dir.to_string_lossy().replace('\\', "/"))
}

fn push_unique(list: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn cpp_properties(generation: &Generation, base: &dyn Lookup) -> Value {
    let package = generation.package;
    let tc = &generation.toolchain;
    let projects = generation.graph.build_order();

    let is_c = toolchain::is_c_edition(&package.edition);
    let std = toolchain::standard_number(&package.edition);
    let (c_standard, cpp_standard) = match (is_c, std.is_empty()) {
        (true, false) => (format!("c{}", std), "c++17".to_string()),
        (false, false) => ("c17".to_string(), format!("c++{}", std)),
        (_, true) => ("c17".to_string(), "c++17".to_string()),
    };

    let driver = if is_c { "$(CC)" } else { "$(CXX)" };
    let compiler = generation.interpolator(base).resolve_one(driver);

    let configurations: Vec<Value> = package
        .configs
        .iter()
        .map(|config| {
            let mut include_path = Vec::new();
            let mut defines = Vec::new();
            for project in &projects {
                let scope = generation.project_scope(base, project);
                let mut per_config = Scope::new(&scope);
                per_config.set_one("CONFIG", config.as_str());
                let ix = generation.interpolator(&per_config);

                push_unique(
                    &mut include_path,
                    lines_for(&ix, &per_config, "INCLUDES", "$(WORKSPACE)/$(INCLUDES)"),
                );
                push_unique(&mut defines, lines_for(&ix, &per_config, "DEFINES", "$(DEFINES)"));
                let key = format!("DEFINES_{}", config.to_uppercase());
                push_unique(
                    &mut defines,
                    lines_for(&ix, &per_config, &key, "$(DEFINES_$(CONFIG:u))"),
                );
            }
            include_path.push(format!("{}/**", WORKSPACE));

            json!({
                "name": config,
                "includePath": include_path,
                "defines": defines,
                "compilerPath": compiler,
                "cStandard": c_standard,
                "cppStandard": cpp_standard,
                "intelliSenseMode": tc.intellisense_mode(),
            })
        })
        .collect();

    json!({
        "configurations": configurations,
        "version": 4
    })
}

fn tasks(generation: &Generation, make_dir: &str) -> Value {
    let tasks: Vec<Value> = generation
        .package
        .configs
        .iter()
        .enumerate()
        .map(|(i, config)| {
            let group = if i == 0 {
                json!({ "kind": "build", "isDefault": true })
            } else {
                json!("build")
            };
            json!({
                "label": format!("Build {}", config),
                "type": "shell",
                "command": format!("make -C {} CONFIG={}", make_dir, config),
                "group": group,
                "problemMatcher": [problem_matcher(generation.toolchain.compiler)],
            })
        })
        .collect();

    json!({
        "version": "2.0.0",
        "tasks": tasks
    })
}

fn problem_matcher(compiler: Compiler) -> &'static str {
    if compiler.uses_msvc_flags() { "$msCompile" } else { "$gcc" }
}

fn launch(generation: &Generation, base: &dyn Lookup, make_dir: &str) -> Value {
    let compiler = generation.toolchain.compiler;
    let config = generation
        .package
        .configs
        .first()
        .map(String::as_str)
        .unwrap_or("debug");

    let configurations: Vec<Value> = generation
        .graph
        .build_order()
        .into_iter()
        .filter(|p| p.is_executable())
        .map(|project| launch_entry(generation, base, project, compiler, make_dir, config))
        .collect();

    json!({
        "version": "0.2.0",
        "configurations": configurations
    })
}

fn launch_entry(
    generation: &Generation,
    base: &dyn Lookup,
    project: &Project,
    compiler: Compiler,
    make_dir: &str,
    config: &str,
) -> Value {
    let scope = generation.project_scope(base, project);
    let ix = generation.interpolator(&scope);
    let program = format!(
        "{}/{}/build/{}/{}",
        WORKSPACE,
        make_dir,
        config,
        scope.get_one("TARGET_FILE")
    );

    let debugger_type = if compiler.uses_msvc_flags() {
        "cppvsdbg"
    } else {
        "cppdbg"
    };

    let mut entry = json!({
        "name": ix.resolve_one("Debug $(NAME)"),
        "type": debugger_type,
        "request": "launch",
        "program": program,
        "args": [],
        "stopAtEntry": false,
        "cwd": WORKSPACE,
        "preLaunchTask": format!("Build {}", config),
    });
    if !compiler.uses_msvc_flags() {
        let debugger = if compiler == Compiler::Clang { "lldb" } else { "gdb" };
        entry["MIMode"] = json!(debugger);
    }
    entry
}
