//! Expand command handler
//!
//! Handles `ccode expand`: resolves one template against `-D` definitions
//! (and optionally a package's `[vars]`) and prints every result on its own
//! line. Handy for checking what a template will produce before it goes into
//! a generator.

use crate::diag::{Console, Diagnostics};
use crate::project::Package;
use crate::vars::{Interpolator, Scope, VariableStore};
use anyhow::{Result, bail};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ExpandOptions {
    pub template: String,
    /// `KEY=VALUE`; repeating a key adds another value
    pub defines: Vec<String>,
    pub file: Option<PathBuf>,
    pub verbose: bool,
}

pub fn parse_define(define: &str) -> Result<(&str, &str)> {
    match define.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Invalid definition '{}' (expected KEY=VALUE)", define),
    }
}

/// Build the variables for `defines`. Later definitions of a key append.
pub fn define_vars(defines: &[String]) -> Result<VariableStore> {
    let mut vars = VariableStore::new();
    for define in defines {
        let (key, value) = parse_define(define)?;
        vars.append(key, [value]);
    }
    Ok(vars)
}

pub fn expand(
    template: &str,
    defines: &VariableStore,
    base: &VariableStore,
    diag: &dyn Diagnostics,
) -> Vec<String> {
    let mut scope = Scope::new(base);
    for key in defines.keys() {
        if let Some(values) = defines.get_all(key) {
            scope.set(key, values.iter().map(String::as_str));
        }
    }
    Interpolator::new(&scope, diag).resolve(template)
}

pub fn handle_expand(options: &ExpandOptions) -> Result<()> {
    let diag = Console::new(options.verbose);
    let defines = define_vars(&options.defines)?;

    let base = match &options.file {
        Some(file) => Package::load(file, &diag)?.vars,
        None => VariableStore::new(),
    };
    diag.note(&format!(
        "{} package variables, {} definitions",
        base.len(),
        defines.len()
    ));

    for line in expand(&options.template, &defines, &base, &diag) {
        println!("{}", line);
    }
    Ok(())
}
