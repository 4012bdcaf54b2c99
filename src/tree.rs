//! Project graph visualization.
//!
//! This module provides the `ccode tree` command which displays the projects
//! of a package in build order, each with its direct dependencies.
//!
//! ## Example Output
//!
//! ```text
//! netkit v0.3.0
//! ├── base (library, 2 sources)
//! ├── net (library, 1 source)
//! │   └── base
//! └── app (executable, 1 source)
//!     └── net
//! ```

use crate::diag::Console;
use crate::project::{Package, ProjectGraph};
use anyhow::Result;
use colored::*;
use std::path::Path;

/// One printed row: tree drawing, project name, optional detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub prefix: String,
    pub name: String,
    pub info: Option<String>,
}

impl std::fmt::Display for TreeRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.info {
            Some(info) => write!(f, "{} {} ({})", self.prefix, self.name, info),
            None => write!(f, "{} {}", self.prefix, self.name),
        }
    }
}

pub fn tree_rows(graph: &ProjectGraph) -> Vec<TreeRow> {
    let projects = graph.build_order();
    let count = projects.len();
    let mut rows = Vec::new();

    for (i, project) in projects.iter().enumerate() {
        let is_last = i == count - 1;
        let sources = match project.sources.len() {
            1 => "1 source".to_string(),
            n => format!("{} sources", n),
        };
        rows.push(TreeRow {
            prefix: if is_last { "└──" } else { "├──" }.to_string(),
            name: project.name.clone(),
            info: Some(format!("{}, {}", project.kind, sources)),
        });

        let indent = if is_last { "    " } else { "│   " };
        let deps = &project.dependencies;
        for (j, dep) in deps.iter().enumerate() {
            let branch = if j == deps.len() - 1 { "└──" } else { "├──" };
            rows.push(TreeRow {
                prefix: format!("{}{}", indent, branch),
                name: dep.clone(),
                info: None,
            });
        }
    }

    rows
}

pub fn print_tree(file: &Path) -> Result<()> {
    let package = Package::load(file, &Console::new(false))?;
    let graph = package.graph()?;

    // Root
    println!("{} v{}", package.name.bold().cyan(), package.version);

    if graph.is_empty() {
        println!("└── (no projects)");
        return Ok(());
    }

    for row in tree_rows(&graph) {
        match &row.info {
            Some(info) => println!("{} {} ({})", row.prefix, row.name.bold(), info.dimmed()),
            None => println!("{} {}", row.prefix.dimmed(), row.name),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::tests::sample_package;

    #[test]
    fn test_tree_rows() {
        let package = sample_package();
        let graph = package.graph().unwrap();
        let lines: Vec<String> = tree_rows(&graph).iter().map(|r| r.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "├── base (library, 2 sources)",
                "├── net (library, 1 source)",
                "│   └── base",
                "└── app (executable, 1 source)",
                "    └── net",
            ]
        );
    }

    #[test]
    fn test_several_dependencies() {
        let mut package = sample_package();
        package.projects[2].dependencies.push("base".to_string());
        let graph = package.graph().unwrap();
        let rows = tree_rows(&graph);

        let tail: Vec<String> = rows[rows.len() - 2..].iter().map(|r| r.to_string()).collect();
        assert_eq!(tail, vec!["    ├── net", "    └── base"]);
    }
}
