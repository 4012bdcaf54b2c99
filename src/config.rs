//! `ccode.toml` parsing.
//!
//! ```toml
//! [package]
//! name = "netkit"
//! version = "0.3.0"
//! edition = "c++17"
//!
//! [build]
//! compiler = "clang"
//! configs = ["debug", "release"]
//! flags = ["-fno-exceptions"]
//!
//! [vars]
//! VENDOR = "third_party"
//!
//! [[library]]
//! name = "netcore"
//! sources = ["source/main/cpp/**/*.cpp"]
//! include_dirs = ["source/main/include"]
//! defines = ["NETCORE_STATIC"]
//!
//! [library.config_defines]
//! debug = ["NETCORE_TRACE"]
//!
//! [[executable]]
//! name = "netcat"
//! sources = ["source/app/*.cpp"]
//! dependencies = ["netcore"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "ccode.toml";

#[derive(Deserialize, Debug, Default)]
pub struct CcodeConfig {
    pub package: PackageConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub vars: BTreeMap<String, VarValue>,
    #[serde(default, rename = "library")]
    pub libraries: Vec<ProjectConfig>,
    #[serde(default, rename = "executable")]
    pub executables: Vec<ProjectConfig>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PackageConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_edition")]
    pub edition: String,
}

#[derive(Deserialize, Debug)]
pub struct BuildConfig {
    pub compiler: Option<String>,
    #[serde(default = "default_configs")]
    pub configs: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: None,
            configs: default_configs(),
            flags: Vec::new(),
        }
    }
}

/// A `[vars]` entry: either one string or a list.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum VarValue {
    One(String),
    Many(Vec<String>),
}

impl VarValue {
    pub fn values(&self) -> Vec<String> {
        match self {
            VarValue::One(v) => vec![v.clone()],
            VarValue::Many(vs) => vs.clone(),
        }
    }
}

/// One `[[library]]` or `[[executable]]` table.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub include_dirs: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub config_defines: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_edition() -> String {
    "c++17".to_string()
}

fn default_configs() -> Vec<String> {
    vec!["debug".to_string(), "release".to_string()]
}

pub fn parse_config(content: &str) -> Result<CcodeConfig> {
    let config: CcodeConfig = toml::from_str(content).context(
        "Failed to parse ccode.toml - check for syntax errors (missing quotes, brackets)",
    )?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<CcodeConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} not found.\n\n\
            💡 Tip: run ccode from the package root or pass --file <path>.",
            path.display()
        ));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    parse_config(&content)
}
