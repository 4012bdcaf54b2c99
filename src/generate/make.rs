//! GNU Make output: a top-level `Makefile` that includes one `<project>.mk`
//! per project. Run it from its own directory (`make -C <out>/make`).
//!
//! Make's own `$(...)` references are written with `format!`, never through
//! the interpolator, which would try to resolve them.

use super::{Generation, Output, header_comment, object_name, squash};
use crate::project::Project;
use crate::toolchain;
use crate::vars::{Lookup, Scope};

pub fn generate(generation: &Generation, root: &str) -> Vec<Output> {
    let mut base = Scope::new(&generation.vars);
    base.set_one("ROOT", root);

    let projects = generation.graph.build_order();
    let mut outputs = vec![Output::new("Makefile", makefile(generation, &base, &projects))];
    for project in projects {
        outputs.push(Output::new(
            format!("{}.mk", project.name),
            project_mk(generation, &base, project),
        ));
    }
    outputs
}

fn makefile(generation: &Generation, vars: &dyn Lookup, projects: &[&Project]) -> Vec<String> {
    let ix = generation.interpolator(vars);
    let configs = &generation.package.configs;
    let default_config = configs.first().map(String::as_str).unwrap_or("debug");
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();

    let mut lines = vec![
        header_comment(generation, "#"),
        String::new(),
        format!("CONFIG ?= {}", default_config),
        "BUILDDIR ?= build/$(CONFIG)".to_string(),
        format!("ifeq ($(filter $(CONFIG),{}),)", configs.join(" ")),
        format!(
            "$(error Unknown CONFIG '$(CONFIG)', expected one of: {})",
            configs.join(" ")
        ),
        "endif".to_string(),
        String::new(),
        ix.resolve_one("CC := $(CC)"),
        ix.resolve_one("CXX := $(CXX)"),
        ix.resolve_one("AR := $(AR)"),
        String::new(),
        format!(".PHONY: all clean {}", names.join(" ")),
        format!("all: {}", names.join(" ")),
        String::new(),
    ];

    lines.extend(names.iter().map(|name| format!("include {}.mk", name)));
    lines.push(String::new());
    lines.push("clean:".to_string());
    lines.push("\trm -rf build".to_string());
    lines
}

fn project_mk(generation: &Generation, base: &dyn Lookup, project: &Project) -> Vec<String> {
    let scope = generation.project_scope(base, project);
    let ix = generation.interpolator(&scope);
    let tc = &generation.toolchain;
    let msvc = tc.compiler.uses_msvc_flags();
    let name = project.name.as_str();

    let mut lines = vec![
        header_comment(generation, "#"),
        ix.resolve_one("# $(NAME) ($(KIND))"),
        String::new(),
        format!(
            "{}_SOURCES := {}",
            name,
            ix.resolve_one("$(SOURCES:p$(ROOT)/:j )")
        ),
        format!(
            "{}_INCLUDES := {}",
            name,
            ix.resolve_one("$(ALL_INCLUDES:p$(ROOT)/:p$(INCLUDE_PREFIX):j )")
        ),
        format!(
            "{}_DEFINES := {}",
            name,
            ix.resolve_one("$(DEFINES:p$(DEFINE_PREFIX):j )")
        ),
        format!(
            "{}_CFLAGS := {}",
            name,
            squash(&ix.resolve_one("$(CSTD) $(CFLAGS:j )"))
        ),
        format!(
            "{}_CXXFLAGS := {}",
            name,
            squash(&ix.resolve_one("$(CXXSTD) $(CFLAGS:j )"))
        ),
    ];

    for config in &generation.package.configs {
        let mut per_config = Scope::new(&scope);
        per_config.set_one("CONFIG", config.as_str());
        let ix = generation.interpolator(&per_config);
        lines.push(format!(
            "{}_FLAGS_{} := {}",
            name,
            config,
            squash(&ix.resolve_one(
                "$(CCOPTS_$(CONFIG:u):j ) $(DEFINES_$(CONFIG:u):p$(DEFINE_PREFIX):j )"
            ))
        ));
    }

    let objects: Vec<String> = project
        .sources
        .iter()
        .map(|s| format!("$(BUILDDIR)/{}/{}", name, object_name(s, tc.obj_ext())))
        .collect();
    if project.is_executable() {
        lines.push(format!("{}_LDFLAGS := {}", name, ix.resolve_one("$(LDFLAGS:j )")));
    }
    lines.push(format!("{}_OBJS := {}", name, objects.join(" ")));
    lines.push(format!(
        "{}_TARGET := $(BUILDDIR)/{}",
        name,
        scope.get_one("TARGET_FILE")
    ));
    lines.push(String::new());
    lines.push(format!("{name}: $({name}_TARGET)"));
    lines.push(String::new());

    if project.is_executable() {
        let deps: Vec<String> = scope
            .lookup("LINK_DEPS")
            .unwrap_or(&[])
            .iter()
            .map(|d| format!("$({}_TARGET)", d))
            .collect();
        let inputs = squash(&format!("$({}_OBJS) {}", name, deps.join(" ")));
        let linker = if toolchain::is_c_edition(&generation.package.edition) {
            "$(CC)"
        } else {
            "$(CXX)"
        };

        lines.push(format!("$({}_TARGET): {}", name, inputs));
        lines.push("\t@mkdir -p $(dir $@)".to_string());
        if msvc {
            lines.push(format!("\t{} /nologo $({}_LDFLAGS) /Fe$@ {}", linker, name, inputs));
        } else {
            lines.push(format!("\t{} $({}_LDFLAGS) -o $@ {}", linker, name, inputs));
        }
    } else {
        lines.push(format!("$({name}_TARGET): $({name}_OBJS)"));
        lines.push("\t@mkdir -p $(dir $@)".to_string());
        if msvc {
            lines.push(format!("\t$(AR) /nologo /OUT:$@ $({}_OBJS)", name));
        } else {
            lines.push(format!("\t$(AR) rcs $@ $({}_OBJS)", name));
        }
    }

    for (source, object) in project.sources.iter().zip(&objects) {
        let mut per_source = Scope::new(&scope);
        per_source.set_one("SOURCE", source.as_str());
        let ix = generation.interpolator(&per_source);

        let (compiler, flags) = if is_c_source(source) {
            ("$(CC)", "CFLAGS")
        } else {
            ("$(CXX)", "CXXFLAGS")
        };
        let output_args = if msvc {
            "/nologo /c $< /Fo$@"
        } else {
            "-MMD -MP -c $< -o $@"
        };

        lines.push(String::new());
        lines.push(format!("{}: {}", object, ix.resolve_one("$(ROOT)/$(SOURCE)")));
        lines.push("\t@mkdir -p $(dir $@)".to_string());
        lines.push(format!(
            "\t{compiler} $({name}_{flags}) $({name}_FLAGS_$(CONFIG)) $({name}_DEFINES) $({name}_INCLUDES) {output_args}"
        ));
    }

    if !msvc && !objects.is_empty() {
        lines.push(String::new());
        lines.push(format!("-include $({}_OBJS:{}=.d)", name, tc.obj_ext()));
    }

    lines
}

/// `.c` is C; everything else (`.cc`, `.cpp`, `.C`) goes to the C++ driver.
fn is_c_source(path: &str) -> bool {
    path.ends_with(".c")
}
