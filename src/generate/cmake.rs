//! A single `CMakeLists.txt` with one target per project.

use super::{Generation, Output, header_comment, lines_for, squash};
use crate::project::Project;
use crate::toolchain;
use crate::vars::{Lookup, Scope};

pub fn generate(generation: &Generation, root: &str) -> Vec<Output> {
    let mut base = Scope::new(&generation.vars);
    base.set_one("ROOT", root);

    let mut lines = preamble(generation, &base);
    for project in generation.graph.build_order() {
        lines.push(String::new());
        lines.extend(target(generation, &base, project));
    }

    vec![Output::new("CMakeLists.txt", lines)]
}

/// CMake only takes `major[.minor[.patch[.tweak]]]` in `project(VERSION)`.
fn numeric_version(version: &str) -> &str {
    let end = version.find(['-', '+']).unwrap_or(version.len());
    &version[..end]
}

fn preamble(generation: &Generation, vars: &dyn Lookup) -> Vec<String> {
    let package = generation.package;
    let ix = generation.interpolator(vars);

    let mut lines = vec![
        header_comment(generation, "#"),
        "cmake_minimum_required(VERSION 3.16)".to_string(),
        format!(
            "project({} VERSION {} LANGUAGES C CXX)",
            package.name,
            numeric_version(&package.version)
        ),
        String::new(),
    ];

    let std = toolchain::standard_number(&package.edition);
    if !std.is_empty() {
        let lang = if toolchain::is_c_edition(&package.edition) {
            "C"
        } else {
            "CXX"
        };
        lines.push(format!("set(CMAKE_{}_STANDARD {})", lang, std));
        lines.push(format!("set(CMAKE_{}_STANDARD_REQUIRED ON)", lang));
    }

    let configs: Vec<String> = package.configs.iter().map(|c| cmake_config(c)).collect();
    lines.push(format!(
        "set(CMAKE_CONFIGURATION_TYPES {} CACHE STRING \"\" FORCE)",
        configs.join(" ")
    ));
    lines.push(ix.resolve_one("set(CCODE_ROOT \"${CMAKE_CURRENT_LIST_DIR}/$(ROOT)\")"));
    lines
}

/// `debug` -> `Debug`, matching CMake's built-in configuration names.
fn cmake_config(config: &str) -> String {
    let mut chars = config.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn target(generation: &Generation, base: &dyn Lookup, project: &Project) -> Vec<String> {
    let scope = generation.project_scope(base, project);
    let ix = generation.interpolator(&scope);

    let mut lines = Vec::new();
    if project.is_executable() {
        lines.push(ix.resolve_one("add_executable($(NAME)"));
    } else {
        lines.push(ix.resolve_one("add_library($(NAME) STATIC"));
    }
    lines.extend(lines_for(&ix, &scope, "SOURCES", "    ${CCODE_ROOT}/$(SOURCES)"));
    lines.push(")".to_string());

    if !project.include_dirs.is_empty() {
        lines.push(ix.resolve_one("target_include_directories($(NAME) PUBLIC"));
        lines.extend(ix.resolve("    ${CCODE_ROOT}/$(INCLUDES)"));
        lines.push(")".to_string());
    }

    let mut defines = lines_for(&ix, &scope, "DEFINES", "    $(DEFINES)");
    for config in &generation.package.configs {
        let mut per_config = Scope::new(&scope);
        per_config.set_one("CONFIG", config.as_str());
        per_config.set_one("CMAKE_CONFIG", cmake_config(config));
        let ix = generation.interpolator(&per_config);
        let key = format!("DEFINES_{}", config.to_uppercase());
        defines.extend(lines_for(
            &ix,
            &per_config,
            &key,
            "    $<$<CONFIG:$(CMAKE_CONFIG)>:$(DEFINES_$(CONFIG:u))>",
        ));
    }
    if !defines.is_empty() {
        lines.push(ix.resolve_one("target_compile_definitions($(NAME) PUBLIC"));
        lines.extend(defines);
        lines.push(")".to_string());
    }

    let options = squash(&ix.resolve_one("$(CFLAGS:j )"));
    if !options.is_empty() {
        lines.push(format!(
            "target_compile_options({} PRIVATE {})",
            project.name, options
        ));
    }

    if project.is_executable() {
        let link_options = ix.resolve_one("$(LDFLAGS:j )");
        if !link_options.is_empty() {
            lines.push(format!(
                "target_link_options({} PRIVATE {})",
                project.name, link_options
            ));
        }
    }

    // Direct dependencies only; CMake carries transitive ones through
    // the PUBLIC links of each library
    if !project.dependencies.is_empty() {
        let visibility = if project.is_executable() { "PRIVATE" } else { "PUBLIC" };
        lines.push(format!(
            "target_link_libraries({} {} {})",
            project.name,
            visibility,
            ix.resolve_one("$(DEPS:j )")
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::tests::{generation, sample_package};

    fn cmake_lines() -> Vec<String> {
        let package = sample_package();
        let mut outputs = generate(&generation(&package), "../..");
        assert_eq!(outputs.len(), 1);
        outputs.remove(0).lines
    }

    fn block(lines: &[String], opener: &str) -> Vec<String> {
        let start = lines.iter().position(|l| l == opener).unwrap();
        let len = lines[start..].iter().position(|l| l == ")").unwrap();
        lines[start + 1..start + len].to_vec()
    }

    #[test]
    fn test_preamble() {
        let lines = cmake_lines();
        assert!(lines.contains(&"project(netkit VERSION 0.3.0 LANGUAGES C CXX)".to_string()));
        assert!(lines.contains(&"set(CMAKE_CXX_STANDARD 17)".to_string()));
        assert!(lines.contains(
            &"set(CMAKE_CONFIGURATION_TYPES Debug Release CACHE STRING \"\" FORCE)".to_string()
        ));
        assert!(lines.contains(
            &"set(CCODE_ROOT \"${CMAKE_CURRENT_LIST_DIR}/../..\")".to_string()
        ));
    }

    #[test]
    fn test_one_source_per_line() {
        let lines = cmake_lines();
        assert_eq!(
            block(&lines, "add_library(base STATIC"),
            vec!["    ${CCODE_ROOT}/base/log.cpp", "    ${CCODE_ROOT}/base/str.c"]
        );
        assert_eq!(
            block(&lines, "add_executable(app"),
            vec!["    ${CCODE_ROOT}/app/main.cpp"]
        );
    }

    #[test]
    fn test_config_defines_use_generator_expressions() {
        let lines = cmake_lines();
        assert_eq!(
            block(&lines, "target_compile_definitions(net PUBLIC"),
            vec!["    $<$<CONFIG:Debug>:NET_TRACE>"]
        );
        assert_eq!(
            block(&lines, "target_compile_definitions(base PUBLIC"),
            vec!["    BASE_STATIC"]
        );
        // app has no defines at all
        assert!(!lines.iter().any(|l| l.starts_with("target_compile_definitions(app")));
    }

    #[test]
    fn test_links_direct_dependencies() {
        let lines = cmake_lines();
        assert!(lines.contains(&"target_link_libraries(app PRIVATE net)".to_string()));
        assert!(lines.contains(&"target_link_libraries(net PUBLIC base)".to_string()));
        assert!(lines.contains(&"target_link_options(app PRIVATE -fno-rtti)".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("target_link_options(net")));
        assert!(lines.contains(
            &"target_compile_options(base PRIVATE -Wall -Wextra -fno-rtti)".to_string()
        ));
        assert_eq!(
            block(&lines, "target_include_directories(net PUBLIC"),
            vec!["    ${CCODE_ROOT}/net/include"]
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(numeric_version("1.2.0-beta.1"), "1.2.0");
        assert_eq!(numeric_version("0.3.0"), "0.3.0");
        assert_eq!(cmake_config("release"), "Release");
        assert_eq!(cmake_config("RelWithDebInfo"), "RelWithDebInfo");
    }
}
