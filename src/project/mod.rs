//! The package model generators work from.
//!
//! A [`Package`] is a loaded `ccode.toml` with every source glob already
//! expanded, so generators never touch the filesystem for inputs.

pub mod glob;
pub mod graph;

pub use graph::{GraphError, ProjectGraph};

use crate::config::{self, CcodeConfig, ProjectConfig};
use crate::diag::Diagnostics;
use crate::vars::VariableStore;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectKind {
    #[default]
    Library,
    Executable,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Library => f.write_str("library"),
            ProjectKind::Executable => f.write_str("executable"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Project {
    pub name: String,
    pub kind: ProjectKind,
    /// Package-relative, `/`-separated, sorted
    pub sources: Vec<String>,
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub config_defines: BTreeMap<String, Vec<String>>,
    pub dependencies: Vec<String>,
}

impl Project {
    fn from_config(cfg: ProjectConfig, kind: ProjectKind, root: &Path) -> Result<Self> {
        let sources = glob::expand(root, &cfg.sources)
            .with_context(|| format!("Failed to collect sources of '{}'", cfg.name))?;

        Ok(Self {
            name: cfg.name,
            kind,
            sources,
            include_dirs: cfg
                .include_dirs
                .iter()
                .map(|d| d.trim_end_matches('/').replace('\\', "/"))
                .collect(),
            defines: cfg.defines,
            config_defines: cfg.config_defines,
            dependencies: cfg.dependencies,
        })
    }

    pub fn is_executable(&self) -> bool {
        self.kind == ProjectKind::Executable
    }

    /// Defines for one configuration, matched case-insensitively.
    pub fn defines_for(&self, config: &str) -> &[String] {
        self.config_defines
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(config))
            .map(|(_, defines)| defines.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub edition: String,
    /// Directory holding `ccode.toml`
    pub root: PathBuf,
    pub compiler: Option<String>,
    pub configs: Vec<String>,
    pub flags: Vec<String>,
    /// `[vars]` from the package file
    pub vars: VariableStore,
    pub projects: Vec<Project>,
}

impl Package {
    pub fn from_config(config: CcodeConfig, root: &Path, diag: &dyn Diagnostics) -> Result<Self> {
        let mut vars = VariableStore::new();
        vars.set_many(config.vars.iter().map(|(k, v)| (k.clone(), v.values())));

        let mut projects = Vec::new();
        for lib in config.libraries {
            projects.push(Project::from_config(lib, ProjectKind::Library, root)?);
        }
        for exe in config.executables {
            projects.push(Project::from_config(exe, ProjectKind::Executable, root)?);
        }

        for project in &projects {
            if project.sources.is_empty() {
                diag.warn(&format!("'{}' has no source files", project.name));
            } else {
                diag.note(&format!(
                    "'{}': {} source files",
                    project.name,
                    project.sources.len()
                ));
            }
        }

        Ok(Self {
            name: config.package.name,
            version: config.package.version,
            edition: config.package.edition,
            root: root.to_path_buf(),
            compiler: config.build.compiler,
            configs: config.build.configs,
            flags: config.build.flags,
            vars,
            projects,
        })
    }

    /// Load `ccode.toml` at `path` and expand its sources relative to the
    /// file's directory.
    pub fn load(path: &Path, diag: &dyn Diagnostics) -> Result<Self> {
        let config = config::load_config(path)?;
        let root = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::from_config(config, &root, diag)
    }

    pub fn graph(&self) -> Result<ProjectGraph<'_>, GraphError> {
        ProjectGraph::new(&self.projects)
    }
}
