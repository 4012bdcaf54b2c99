//! # ccode CLI Entry Point
//!
//! This is the main executable for the `ccode` command-line tool.
//! It parses CLI arguments using clap and routes commands to the appropriate handlers.
//!
//! ## Command Structure
//!
//! - `generate` - write build descriptions for a package
//! - `expand` - resolve a single template
//! - `tree` - show the project graph

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;

use ccode::commands;
use ccode::config::CONFIG_FILE;
use ccode::generate::Dev;
use ccode::toolchain::{Arch, Compiler, Os};
use ccode::tree;

#[derive(Parser)]
#[command(name = "ccode")]
#[command(about = "Generate C/C++ build descriptions", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write build descriptions for the package
    Generate {
        /// Output formats (repeatable)
        #[arg(long, value_enum, default_value = "all")]
        dev: Vec<DevArg>,
        /// Target operating system [default: host]
        #[arg(long, value_enum)]
        os: Option<Os>,
        /// Target architecture [default: host]
        #[arg(long, value_enum)]
        arch: Option<Arch>,
        /// Compiler family, overrides [build] compiler
        #[arg(long, value_enum)]
        compiler: Option<Compiler>,
        /// Output directory [default: <package>/target]
        #[arg(long)]
        out: Option<PathBuf>,
        /// Package description
        #[arg(long, default_value = CONFIG_FILE)]
        file: PathBuf,
        /// Show notes as well as warnings
        #[arg(short, long)]
        verbose: bool,
    },
    /// Resolve a template and print each result on its own line
    Expand {
        /// Template, e.g. '$(SOURCES:B:s.o)'
        template: String,
        /// Variable definition KEY=VALUE; repeat a key for a list
        #[arg(short = 'D', value_name = "KEY=VALUE")]
        define: Vec<String>,
        /// Also read [vars] from this package description
        #[arg(long)]
        file: Option<PathBuf>,
        /// Show notes as well as warnings
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show projects in build order with their dependencies
    Tree {
        /// Package description
        #[arg(long, default_value = CONFIG_FILE)]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DevArg {
    Make,
    Cmake,
    Tundra,
    Vscode,
    All,
}

fn selected_devs(args: &[DevArg]) -> Vec<Dev> {
    let mut devs = Vec::new();
    for arg in args {
        let chosen: &[Dev] = match arg {
            DevArg::Make => &[Dev::Make],
            DevArg::Cmake => &[Dev::Cmake],
            DevArg::Tundra => &[Dev::Tundra],
            DevArg::Vscode => &[Dev::Vscode],
            DevArg::All => &Dev::ALL,
        };
        for dev in chosen {
            if !devs.contains(dev) {
                devs.push(*dev);
            }
        }
    }
    devs
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            dev,
            os,
            arch,
            compiler,
            out,
            file,
            verbose,
        } => commands::generate::handle_generate(&commands::generate::GenerateOptions {
            devs: selected_devs(&dev),
            file,
            out,
            compiler,
            os,
            arch,
            verbose,
        }),
        Commands::Expand {
            template,
            define,
            file,
            verbose,
        } => commands::expand::handle_expand(&commands::expand::ExpandOptions {
            template,
            defines: define,
            file,
            verbose,
        }),
        Commands::Tree { file } => tree::print_tree(&file),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}
