//! Build-description generators.
//!
//! Every generator works the same way: the package-wide variables live in one
//! read-only [`VariableStore`], each project gets a [`Scope`] layered on top
//! of it, and output lines are produced by expanding templates against that
//! scope. Generators run in parallel; they share nothing mutable.
//!
//! ## Variables
//!
//! Package: `PACKAGE`, `VERSION`, `EDITION`, `CSTD`, `CXXSTD`, `CC`, `CXX`,
//! `AR`, `CFLAGS`, `LDFLAGS`, `CONFIGS`, `CCOPTS_<CONFIG>`, `COMPILER`, `TARGET_OS`,
//! `TARGET_ARCH`, `OBJ_EXT`, `LIB_PREFIX`, `LIB_EXT`, `EXE_EXT`,
//! `DEFINE_PREFIX`, `INCLUDE_PREFIX`, then everything from `[vars]`.
//!
//! Project: `NAME`, `KIND`, `TARGET_FILE`, `SOURCES`, `INCLUDES`,
//! `ALL_INCLUDES`, `DEFINES`, `DEFINES_<CONFIG>`, `DEPS`, `LINK_DEPS`.

pub mod cmake;
pub mod make;
pub mod tundra;
pub mod vscode;

use crate::diag::Diagnostics;
use crate::project::{GraphError, Package, Project, ProjectGraph, ProjectKind};
use crate::toolchain::{self, Toolchain};
use crate::vars::{Interpolator, Lookup, Scope, VariableStore};
use crate::writer::{self, WriteStatus};
use clap::ValueEnum;
use rayon::prelude::*;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dev {
    Make,
    Cmake,
    Tundra,
    Vscode,
}

impl Dev {
    pub const ALL: [Dev; 4] = [Dev::Make, Dev::Cmake, Dev::Tundra, Dev::Vscode];

    pub fn name(&self) -> &'static str {
        match self {
            Dev::Make => "make",
            Dev::Cmake => "cmake",
            Dev::Tundra => "tundra",
            Dev::Vscode => "vscode",
        }
    }

    /// Directory this format's output paths are relative to. Editor
    /// settings belong next to the package, everything else under `out_dir`.
    pub fn output_dir(&self, out_dir: &Path, package_root: &Path) -> PathBuf {
        match self {
            Dev::Vscode => package_root.to_path_buf(),
            _ => out_dir.join(self.name()),
        }
    }

    pub fn run(&self, generation: &Generation, root: &str) -> Vec<Output> {
        match self {
            Dev::Make => make::generate(generation, root),
            Dev::Cmake => cmake::generate(generation, root),
            Dev::Tundra => tundra::generate(generation, root),
            Dev::Vscode => vscode::generate(generation, root),
        }
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub path: PathBuf,
    pub lines: Vec<String>,
    /// Leave an existing file alone (user-owned editor settings)
    pub preserve_existing: bool,
}

impl Output {
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
            preserve_existing: false,
        }
    }

    pub fn preserved(mut self) -> Self {
        self.preserve_existing = true;
        self
    }
}

/// Error type for generation
#[derive(Debug)]
pub enum GenerateError {
    /// Package has neither libraries nor executables
    EmptyPackage(String),
    /// Projects cannot be ordered
    Graph(GraphError),
    /// A generated file could not be written
    Write { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::EmptyPackage(name) => {
                write!(f, "Package '{}' defines no libraries or executables", name)
            }
            GenerateError::Graph(e) => write!(f, "{}", e),
            GenerateError::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Graph(e) => Some(e),
            GenerateError::Write { source, .. } => Some(source),
            GenerateError::EmptyPackage(_) => None,
        }
    }
}

impl From<GraphError> for GenerateError {
    fn from(e: GraphError) -> Self {
        GenerateError::Graph(e)
    }
}

/// Shared, read-only state of one generation run.
pub struct Generation<'a> {
    pub package: &'a Package,
    pub graph: ProjectGraph<'a>,
    pub toolchain: Toolchain,
    pub vars: VariableStore,
    pub out_dir: PathBuf,
    pub diag: &'a dyn Diagnostics,
}

impl<'a> Generation<'a> {
    pub fn new(
        package: &'a Package,
        toolchain: Toolchain,
        out_dir: &Path,
        diag: &'a dyn Diagnostics,
    ) -> Result<Self, GenerateError> {
        if package.projects.is_empty() {
            return Err(GenerateError::EmptyPackage(package.name.clone()));
        }
        let graph = package.graph()?;
        let vars = package_vars(package, &toolchain);
        Ok(Self {
            package,
            graph,
            toolchain,
            vars,
            out_dir: out_dir.to_path_buf(),
            diag,
        })
    }

    pub fn interpolator<'s>(&'s self, vars: &'s dyn Lookup) -> Interpolator<'s> {
        Interpolator::new(vars, self.diag)
    }

    /// Variables of one project, layered over `parent`.
    pub fn project_scope<'s>(&self, parent: &'s dyn Lookup, project: &Project) -> Scope<'s> {
        let tc = &self.toolchain;
        let mut scope = Scope::new(parent);

        scope.set_one("NAME", project.name.as_str());
        scope.set_one("KIND", project.kind.to_string());
        scope.set_one("TARGET_FILE", target_file(tc, project));
        scope.set("SOURCES", project.sources.iter().map(String::as_str));
        scope.set("INCLUDES", project.include_dirs.iter().map(String::as_str));
        scope.set("ALL_INCLUDES", all_includes(&self.graph, project));
        scope.set("DEFINES", project.defines.iter().map(String::as_str));
        for config in &self.package.configs {
            scope.set(
                format!("DEFINES_{}", config.to_uppercase()),
                project.defines_for(config).iter().map(String::as_str),
            );
        }
        scope.set("DEPS", project.dependencies.iter().map(String::as_str));
        scope.set(
            "LINK_DEPS",
            self.graph
                .link_order(&project.name)
                .into_iter()
                .filter(|p| p.kind == ProjectKind::Library)
                .map(|p| p.name.as_str()),
        );
        scope
    }
}

fn package_vars(package: &Package, tc: &Toolchain) -> VariableStore {
    let compiler = tc.compiler;
    let mut vars = VariableStore::new();

    vars.set_one("PACKAGE", package.name.as_str());
    vars.set_one("VERSION", package.version.as_str());
    vars.set_one("EDITION", package.edition.as_str());

    let std_flag = compiler.std_flag(&package.edition);
    if toolchain::is_c_edition(&package.edition) {
        vars.set_one("CSTD", std_flag);
        vars.set("CXXSTD", Vec::<String>::new());
    } else {
        vars.set("CSTD", Vec::<String>::new());
        vars.set_one("CXXSTD", std_flag);
    }

    vars.set_one("CC", compiler.cc());
    vars.set_one("CXX", compiler.cxx());
    vars.set_one("AR", compiler.archiver());
    vars.set_one("COMPILER", compiler.to_string());
    vars.set("CFLAGS", compiler.warning_options().iter().copied());
    vars.append("CFLAGS", package.flags.iter().map(String::as_str));
    vars.set("LDFLAGS", package.flags.iter().map(String::as_str));

    vars.set("CONFIGS", package.configs.iter().map(String::as_str));
    for config in &package.configs {
        vars.set(
            format!("CCOPTS_{}", config.to_uppercase()),
            compiler.config_options(config).iter().copied(),
        );
    }

    vars.set_one("TARGET_OS", tc.os.name());
    vars.set_one("TARGET_ARCH", tc.arch.name());
    vars.set_one("OBJ_EXT", tc.obj_ext());
    vars.set_one("LIB_PREFIX", tc.lib_prefix());
    vars.set_one("LIB_EXT", tc.lib_ext());
    vars.set_one("EXE_EXT", tc.exe_ext());
    vars.set_one("DEFINE_PREFIX", compiler.define_prefix());
    vars.set_one("INCLUDE_PREFIX", compiler.include_prefix());

    // [vars] last: a package may override any of the above
    for key in package.vars.keys() {
        if let Some(values) = package.vars.get_all(key) {
            vars.set(key, values.iter().map(String::as_str));
        }
    }

    vars
}

/// File name of a project's final artifact.
pub fn target_file(tc: &Toolchain, project: &Project) -> String {
    match project.kind {
        ProjectKind::Library => format!("{}{}{}", tc.lib_prefix(), project.name, tc.lib_ext()),
        ProjectKind::Executable => format!("{}{}", project.name, tc.exe_ext()),
    }
}

/// Own include dirs first, then those of every dependency, without repeats.
fn all_includes<'g>(graph: &ProjectGraph<'g>, project: &'g Project) -> Vec<&'g str> {
    let mut dirs: Vec<&str> = Vec::new();
    let deps = graph.dependencies_of(&project.name);
    let own = std::iter::once(project);
    for p in own.chain(deps.into_iter().rev()) {
        for dir in &p.include_dirs {
            if !dirs.contains(&dir.as_str()) {
                dirs.push(dir);
            }
        }
    }
    dirs
}

/// Object file path for a source: extension swapped, directories kept.
pub fn object_name(source: &str, obj_ext: &str) -> String {
    let file_start = source.rfind('/').map(|i| i + 1).unwrap_or(0);
    let stem_end = match source[file_start..].rfind('.') {
        Some(0) | None => source.len(),
        Some(dot) => file_start + dot,
    };
    format!("{}{}", &source[..stem_end], obj_ext)
}

/// Expand `template` once per value of `key`, or not at all if `key` has no
/// values. Keeps empty lists from producing a single blank entry.
pub fn lines_for(ix: &Interpolator, vars: &dyn Lookup, key: &str, template: &str) -> Vec<String> {
    match vars.lookup(key) {
        Some(values) if !values.is_empty() => ix.resolve(template),
        _ => Vec::new(),
    }
}

/// Collapse runs of whitespace left behind by empty variables.
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn header_comment(generation: &Generation, comment: &str) -> String {
    let tc = &generation.toolchain;
    format!(
        "{} Generated by ccode from {} {} for {}-{} ({}). Do not edit.",
        comment,
        generation.package.name,
        generation.package.version,
        tc.os.name(),
        tc.arch.name(),
        tc.compiler
    )
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Path of `to` as seen from directory `from`, `/`-separated.
///
/// Falls back to the absolute path of `to` when the two share no root.
pub fn relative_path(from: &Path, to: &Path) -> io::Result<String> {
    let from = absolute(from)?;
    let to = absolute(to)?;

    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return Ok(to.to_string_lossy().replace('\\', "/"));
    }

    let mut parts: Vec<String> = Vec::new();
    parts.extend(from_parts[common..].iter().map(|_| "..".to_string()));
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().to_string()),
    );

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

/// Run `devs` in parallel and write every output file.
pub fn generate(
    package: &Package,
    toolchain: Toolchain,
    devs: &[Dev],
    out_dir: &Path,
    diag: &dyn Diagnostics,
) -> Result<Vec<(PathBuf, WriteStatus)>, GenerateError> {
    let generation = Generation::new(package, toolchain, out_dir, diag)?;

    let outputs: Vec<Vec<Output>> = devs
        .par_iter()
        .map(|dev| -> Result<Vec<Output>, GenerateError> {
            let dir = dev.output_dir(out_dir, &package.root);
            let root = relative_path(&dir, &package.root).map_err(|source| {
                GenerateError::Write {
                    path: dir.clone(),
                    source,
                }
            })?;
            diag.note(&format!("{}: package root is '{}'", dev.name(), root));

            Ok(dev
                .run(&generation, &root)
                .into_iter()
                .map(|mut output| {
                    output.path = dir.join(&output.path);
                    output
                })
                .collect())
        })
        .collect::<Result<_, _>>()?;

    let mut written = Vec::new();
    for output in outputs.into_iter().flatten() {
        let status = if output.preserve_existing && output.path.exists() {
            WriteStatus::Skipped
        } else {
            writer::write_lines(&output.path, &output.lines).map_err(|source| {
                GenerateError::Write {
                    path: output.path.clone(),
                    source,
                }
            })?
        };
        written.push((output.path, status));
    }

    Ok(written)
}
