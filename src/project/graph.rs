//! Dependency ordering between the projects of a package.

use super::Project;
use std::collections::{HashMap, HashSet};

/// Error type for project graph operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two projects share a name
    Duplicate(String),
    /// A project depends on a name no project has
    UnknownDependency { project: String, dependency: String },
    /// Projects that depend on each other, in dependency order
    Cycle(Vec<String>),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::Duplicate(name) => write!(f, "Project '{}' is defined twice", name),
            GraphError::UnknownDependency {
                project,
                dependency,
            } => write!(
                f,
                "Project '{}' depends on '{}', which is not defined",
                project, dependency
            ),
            GraphError::Cycle(names) => {
                write!(f, "Dependency cycle: {}", names.join(" -> "))
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Projects of a package, checked and ordered so that every project comes
/// after its dependencies.
#[derive(Debug)]
pub struct ProjectGraph<'a> {
    projects: &'a [Project],
    index: HashMap<&'a str, usize>,
    order: Vec<usize>,
}

impl<'a> ProjectGraph<'a> {
    pub fn new(projects: &'a [Project]) -> Result<Self, GraphError> {
        let mut index = HashMap::new();
        for (i, project) in projects.iter().enumerate() {
            if index.insert(project.name.as_str(), i).is_some() {
                return Err(GraphError::Duplicate(project.name.clone()));
            }
        }

        for project in projects {
            for dep in &project.dependencies {
                if !index.contains_key(dep.as_str()) {
                    return Err(GraphError::UnknownDependency {
                        project: project.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let mut graph = Self {
            projects,
            index,
            order: Vec::with_capacity(projects.len()),
        };

        let mut marks: HashMap<usize, Mark> = HashMap::new();
        let mut path = Vec::new();
        for i in 0..projects.len() {
            graph.visit(i, &mut marks, &mut path)?;
        }

        Ok(graph)
    }

    /// Depth-first post-order. Ties follow declaration order.
    fn visit(
        &mut self,
        i: usize,
        marks: &mut HashMap<usize, Mark>,
        path: &mut Vec<usize>,
    ) -> Result<(), GraphError> {
        match marks.get(&i) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let from = path.iter().position(|&p| p == i).unwrap_or(0);
                let mut names: Vec<String> = path[from..]
                    .iter()
                    .map(|&p| self.projects[p].name.clone())
                    .collect();
                names.push(self.projects[i].name.clone());
                return Err(GraphError::Cycle(names));
            }
            None => {}
        }

        marks.insert(i, Mark::Visiting);
        path.push(i);
        let projects = self.projects;
        for dep in &projects[i].dependencies {
            let d = self.index[dep.as_str()];
            self.visit(d, marks, path)?;
        }
        path.pop();
        marks.insert(i, Mark::Done);
        self.order.push(i);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&'a Project> {
        self.index.get(name).map(|&i| &self.projects[i])
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// All projects, dependencies first.
    pub fn build_order(&self) -> Vec<&'a Project> {
        self.order.iter().map(|&i| &self.projects[i]).collect()
    }

    /// Transitive dependencies of `name`, dependencies first.
    pub fn dependencies_of(&self, name: &str) -> Vec<&'a Project> {
        let Some(&start) = self.index.get(name) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut stack: Vec<usize> = self.deps_of(start).collect();
        while let Some(i) = stack.pop() {
            if seen.insert(i) {
                stack.extend(self.deps_of(i));
            }
        }

        self.order
            .iter()
            .filter(|i| seen.contains(i))
            .map(|&i| &self.projects[i])
            .collect()
    }

    /// Transitive dependencies in the order a linker wants them: every
    /// library before the libraries it uses.
    pub fn link_order(&self, name: &str) -> Vec<&'a Project> {
        let mut deps = self.dependencies_of(name);
        deps.reverse();
        deps
    }

    fn deps_of(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.projects[i]
            .dependencies
            .iter()
            .map(|d| self.index[d.as_str()])
    }
}
