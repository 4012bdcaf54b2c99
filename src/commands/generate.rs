//! Generate command handler
//!
//! Handles `ccode generate`: loads the package file, settles the toolchain
//! and writes the requested build descriptions.

use crate::diag::{Console, Diagnostics};
use crate::generate::{self, Dev};
use crate::project::Package;
use crate::toolchain::{Arch, Compiler, Os, Toolchain};
use crate::writer::WriteStatus;
use anyhow::{Result, bail};
use colored::*;
use std::path::PathBuf;

/// Options collected from the command line
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub devs: Vec<Dev>,
    pub file: PathBuf,
    /// Defaults to `<package root>/target`
    pub out: Option<PathBuf>,
    pub compiler: Option<Compiler>,
    pub os: Option<Os>,
    pub arch: Option<Arch>,
    pub verbose: bool,
}

/// Command line first, then `[build] compiler`, then the target OS default.
pub fn resolve_toolchain(
    package: &Package,
    compiler: Option<Compiler>,
    os: Option<Os>,
    arch: Option<Arch>,
) -> Result<Toolchain> {
    let os = os.unwrap_or_else(Os::host);
    let arch = arch.unwrap_or_else(Arch::host);

    let compiler = match (compiler, &package.compiler) {
        (Some(c), _) => c,
        (None, Some(name)) => match Compiler::parse(name) {
            Some(c) => c,
            None => bail!(
                "Unknown compiler '{}' in [build] (expected gcc, clang or msvc)",
                name
            ),
        },
        (None, None) => Compiler::default_for(os),
    };

    Ok(Toolchain::new(compiler, os, arch))
}

pub fn handle_generate(options: &GenerateOptions) -> Result<()> {
    let diag = Console::new(options.verbose);
    let package = Package::load(&options.file, &diag)?;
    let toolchain = resolve_toolchain(&package, options.compiler, options.os, options.arch)?;
    let out_dir = options
        .out
        .clone()
        .unwrap_or_else(|| package.root.join("target"));

    let names: Vec<&str> = options.devs.iter().map(|d| d.name()).collect();
    println!(
        "{} Generating {} for {} v{} ({}-{}, {})",
        "→".dimmed(),
        names.join(", ").bold(),
        package.name.bold().cyan(),
        package.version,
        toolchain.os.name(),
        toolchain.arch.name(),
        toolchain.compiler
    );
    diag.note(&format!("Output directory: {}", out_dir.display()));

    let written = generate::generate(&package, toolchain, &options.devs, &out_dir, &diag)?;

    let mut changed = 0;
    for (path, status) in &written {
        let shown = path.display().to_string();
        match status {
            WriteStatus::Created => {
                changed += 1;
                println!("   {} Created {}", "+".green(), shown);
            }
            WriteStatus::Updated => {
                changed += 1;
                println!("   {} Updated {}", "~".yellow(), shown);
            }
            WriteStatus::Unchanged => diag.note(&format!("Unchanged {}", shown)),
            WriteStatus::Skipped => {
                println!("   {} Skipping existing {}", "!".yellow(), shown)
            }
        }
    }

    println!(
        "{} {} files written, {} up to date",
        "✓".green(),
        changed,
        written.len() - changed
    );
    Ok(())
}
