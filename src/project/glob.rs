//! Source glob expansion.
//!
//! Patterns are relative to the package root and use `/` on every platform:
//! `*` matches within one path component, `?` one character, `[abc]` and
//! `[!abc]` one character from a set, and `**/` any number of directories
//! (including none). There is no `{a,b}` alternation; list both patterns
//! instead.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;
use walkdir::WalkDir;

/// Directories that never contain sources worth generating for.
const SKIP_DIRS: &[&str] = &[".git", "target", "build", ".vscode", "node_modules"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compile one source pattern.
pub fn compile(pattern: &str) -> Result<Pattern> {
    let mut normalized = pattern.replace('\\', "/");
    if let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    if normalized.ends_with("/**") || normalized == "**" {
        normalized.push_str("/*");
    }
    Pattern::new(&normalized).with_context(|| format!("Invalid source glob '{}'", pattern))
}

/// Expand `patterns` under `root` into sorted, `/`-separated relative paths.
pub fn expand(root: &Path, patterns: &[String]) -> Result<Vec<String>> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let matchers = patterns
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|e| {
        let name = e.file_name().to_string_lossy();
        !(e.depth() > 0 && e.file_type().is_dir() && SKIP_DIRS.iter().any(|d| *d == name))
    });

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        if matchers.iter().any(|m| m.matches_with(&rel, MATCH_OPTIONS)) {
            files.push(rel);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
