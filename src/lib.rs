//! # ccode - C/C++ build description generator
//!
//! ccode reads a package description (`ccode.toml`) listing libraries and
//! executables, and writes native build descriptions for it: Makefiles,
//! CMake, Tundra and VSCode settings.
//!
//! Every generator is driven by one small template language. A
//! [`vars::VariableStore`] maps names to value lists, and an
//! [`vars::Interpolator`] expands `$(NAME:opt:opt)` sites against it, fanning
//! out one result per value.
//!
//! ## Quick Start
//!
//! ```bash
//! # Everything, for the host toolchain
//! ccode generate
//!
//! # Try a template
//! ccode expand '$(OS)-$(ARCH)' -D OS=linux -D ARCH=x64 -D ARCH=arm64
//! ```
//!
//! ## Module Organization
//!
//! - [`vars`] - Variable store and template expansion
//! - [`project`] - Package model, source globs, dependency graph
//! - [`generate`] - Make, CMake, Tundra and VSCode generators
//! - [`toolchain`] - Compiler flag tables and artifact naming
//! - [`commands`] - CLI command handlers

/// CLI command handlers extracted from main.
pub mod commands;

/// Configuration file parsing (`ccode.toml`).
pub mod config;

/// Diagnostics sink for soft failures.
pub mod diag;

/// Build description generators.
pub mod generate;

/// Package model and project graph.
pub mod project;

/// Compiler flag tables and target naming.
pub mod toolchain;

/// Project graph visualization.
pub mod tree;

/// Variable store and `$(...)` interpolation.
pub mod vars;

/// Change-aware output file writing.
pub mod writer;
