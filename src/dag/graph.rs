// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::task::TaskName;
use crate::errors::{BuildError, Result};

/// Explicit prerequisite graph keyed by task name.
///
/// Each entry maps a task to its prerequisites in declaration order. Edges
/// may point at names that are not (yet) registered; [`TaskGraph::validate`]
/// and [`TaskGraph::execution_plan`] report those.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: BTreeMap<TaskName, Vec<TaskName>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task with its prerequisites.
    pub fn insert(&mut self, name: TaskName, prerequisites: Vec<TaskName>) -> Result<()> {
        if self.nodes.contains_key(&name) {
            return Err(BuildError::DuplicateTask(name));
        }
        self.nodes.insert(name, prerequisites);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All task names, sorted.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate prerequisites of a task, in declaration order.
    pub fn prerequisites_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|deps| deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list it as a prerequisite).
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d == name))
            .map(|(task, _)| task.as_str())
            .collect()
    }

    /// Check the whole graph: every prerequisite is registered and there is
    /// no cycle.
    pub fn validate(&self) -> Result<()> {
        for (name, deps) in self.nodes.iter() {
            for dep in deps.iter() {
                if !self.nodes.contains_key(dep) {
                    return Err(BuildError::UnknownPrerequisite {
                        task: name.clone(),
                        prerequisite: dep.clone(),
                    });
                }
            }
        }

        // Edge direction: prerequisite -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.nodes.keys() {
            graph.add_node(name.as_str());
        }
        for (name, deps) in self.nodes.iter() {
            for dep in deps.iter() {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => {
                let node = cycle.node_id();
                // Re-resolve from the offending node to report the full path.
                match self.execution_plan(node) {
                    Err(err @ BuildError::CyclicDependency(_)) => Err(err),
                    _ => Err(BuildError::CyclicDependency(format!(
                        "cycle involving task '{node}'"
                    ))),
                }
            }
        }
    }

    /// Resolve the ordered list of tasks a run of `root` executes.
    ///
    /// Prerequisites are visited depth-first in declaration order and each
    /// task appears once, after all of its prerequisites. `root` is last.
    pub fn execution_plan(&self, root: &str) -> Result<Vec<TaskName>> {
        if !self.nodes.contains_key(root) {
            return Err(BuildError::TaskNotFound(root.to_string()));
        }

        let mut visits: HashMap<&str, Visit> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();
        let mut plan = Vec::new();
        self.visit(root, &mut visits, &mut path, &mut plan)?;
        Ok(plan)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        visits: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<&'a str>,
        plan: &mut Vec<TaskName>,
    ) -> Result<()> {
        match visits.get(name) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..].to_vec();
                cycle.push(name);
                return Err(BuildError::CyclicDependency(cycle.join(" -> ")));
            }
            None => {}
        }

        visits.insert(name, Visit::InProgress);
        path.push(name);

        for dep in self.prerequisites_of(name) {
            if !self.nodes.contains_key(dep) {
                return Err(BuildError::UnresolvedDependency {
                    task: name.to_string(),
                    prerequisite: dep.clone(),
                });
            }
            self.visit(dep, visits, path, plan)?;
        }

        path.pop();
        visits.insert(name, Visit::Done);
        plan.push(name.to_string());
        Ok(())
    }
}
