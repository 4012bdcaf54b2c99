//! CLI Command handlers
//!
//! Implementations of the `ccode` subcommands, kept out of main.rs so they
//! can be tested through the library.

pub mod expand;
pub mod generate;
