//! Tundra output: `tundra.lua` (configs and variants) and `units.lua`.

use super::{Generation, Output, header_comment, lines_for};
use crate::project::Project;
use crate::toolchain::{Compiler, Os};
use crate::vars::{Lookup, Scope};

pub fn generate(generation: &Generation, root: &str) -> Vec<Output> {
    let mut base = Scope::new(&generation.vars);
    base.set_one("ROOT", root);

    vec![
        Output::new("tundra.lua", build_file(generation)),
        Output::new("units.lua", units_file(generation, &base)),
    ]
}

fn host_name(os: Os) -> &'static str {
    match os {
        Os::Linux => "linux",
        Os::Macos => "macosx",
        Os::Windows => "windows",
    }
}

fn tool_name(compiler: Compiler) -> &'static str {
    match compiler {
        Compiler::Gcc => "gcc",
        Compiler::Clang => "clang",
        Compiler::Msvc => "msvc",
    }
}

fn config_name(generation: &Generation) -> String {
    let tc = &generation.toolchain;
    format!("{}-{}", host_name(tc.os), tool_name(tc.compiler))
}

fn build_file(generation: &Generation) -> Vec<String> {
    let tc = &generation.toolchain;
    let configs = &generation.package.configs;
    let variants: Vec<String> = configs.iter().map(|c| format!("\"{}\"", c)).collect();

    let mut lines = vec![
        header_comment(generation, "--"),
        "Build {".to_string(),
        "    Units = \"units.lua\",".to_string(),
        "    Configs = {".to_string(),
        "        Config {".to_string(),
        format!("            Name = \"{}\",", config_name(generation)),
        format!("            DefaultOnHost = \"{}\",", host_name(tc.os)),
        format!("            Tools = {{ \"{}\" }},", tool_name(tc.compiler)),
        "        },".to_string(),
        "    },".to_string(),
        format!("    Variants = {{ {} }},", variants.join(", ")),
    ];
    if let Some(first) = configs.first() {
        lines.push(format!("    DefaultVariant = \"{}\",", first));
    }
    lines.push("}".to_string());
    lines
}

fn units_file(generation: &Generation, base: &dyn Lookup) -> Vec<String> {
    let mut lines = vec![header_comment(generation, "--")];
    let mut programs = Vec::new();

    for project in generation.graph.build_order() {
        lines.push(String::new());
        lines.extend(unit(generation, base, project));
        if project.is_executable() {
            programs.push(project.name.as_str());
        }
    }

    if !programs.is_empty() {
        lines.push(String::new());
        lines.extend(programs.iter().map(|p| format!("Default \"{}\"", p)));
    }
    lines
}

fn unit(generation: &Generation, base: &dyn Lookup, project: &Project) -> Vec<String> {
    let scope = generation.project_scope(base, project);
    let ix = generation.interpolator(&scope);

    let kind = if project.is_executable() {
        "Program"
    } else {
        "StaticLibrary"
    };
    let mut lines = vec![
        format!("{} {{", kind),
        ix.resolve_one("    Name = \"$(NAME)\","),
    ];

    let sources = lines_for(&ix, &scope, "SOURCES", "        \"$(ROOT)/$(SOURCES)\",");
    lines.extend(list("Sources", sources));

    let includes = lines_for(&ix, &scope, "ALL_INCLUDES", "        \"$(ROOT)/$(ALL_INCLUDES)\",");
    lines.extend(list("Includes", includes));

    let mut defines = lines_for(&ix, &scope, "DEFINES", "        \"$(DEFINES)\",");
    let config = config_name(generation);
    for variant in &generation.package.configs {
        let mut per_config = Scope::new(&scope);
        per_config.set_one("CONFIG", variant.as_str());
        per_config.set_one("CONFIG_FILTER", format!("{}-{}-*", config, variant));
        let ix = generation.interpolator(&per_config);
        let key = format!("DEFINES_{}", variant.to_uppercase());
        defines.extend(lines_for(
            &ix,
            &per_config,
            &key,
            "        { \"$(DEFINES_$(CONFIG:u))\"; Config = \"$(CONFIG_FILTER)\" },",
        ));
    }
    lines.extend(list("Defines", defines));

    if !project.dependencies.is_empty() {
        lines.push(ix.resolve_one("    Depends = { $(DEPS:p\":s\":j, ) },"));
    }

    lines.push("}".to_string());
    lines
}

fn list(field: &str, items: Vec<String>) -> Vec<String> {
    if items.is_empty() {
        return items;
    }
    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(format!("    {} = {{", field));
    lines.extend(items);
    lines.push("    },".to_string());
    lines
}
