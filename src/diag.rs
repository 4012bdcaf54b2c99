//! Diagnostic output.
//!
//! Anything that wants to tell the user about a soft failure (an unknown
//! template option, a missing variable, a skipped file) takes a
//! `&dyn Diagnostics` instead of printing directly, so the caller decides
//! where messages go.
//!
//! ## Implementations
//!
//! - `Console` - colored messages on stderr, notes only when verbose
//! - `Silent` - drops everything
//! - `Collect` - keeps messages in memory for inspection

use colored::*;
use std::sync::Mutex;

pub trait Diagnostics: Sync {
    /// Low-importance detail, e.g. a variable lookup that found nothing.
    fn note(&self, msg: &str);

    /// Something the user should probably fix.
    fn warn(&self, msg: &str);
}

/// Prints to stderr using the same symbols as the rest of the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    pub verbose: bool,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Diagnostics for Console {
    fn note(&self, msg: &str) {
        if self.verbose {
            eprintln!("   {} {}", "→".dimmed(), msg.dimmed());
        }
    }

    fn warn(&self, msg: &str) {
        eprintln!("   {} {}", "!".yellow(), msg);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Diagnostics for Silent {
    fn note(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
}

#[derive(Debug, Default)]
pub struct Collect {
    notes: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl Collect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Diagnostics for Collect {
    fn note(&self, msg: &str) {
        self.notes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg.to_string());
    }

    fn warn(&self, msg: &str) {
        self.warnings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg.to_string());
    }
}
