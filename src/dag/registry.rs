// src/dag/registry.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::dag::graph::TaskGraph;
use crate::dag::task::{TaskAction, TaskName};
use crate::errors::{BuildError, Result};

/// Named tasks: their prerequisite graph plus the action each one runs.
///
/// Tasks are registered once at startup and never mutated afterwards.
/// Prerequisites may name tasks registered later; call
/// [`TaskRegistry::validate`] once everything is registered.
#[derive(Default)]
pub struct TaskRegistry {
    graph: TaskGraph,
    actions: HashMap<TaskName, Arc<dyn TaskAction>>,
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with its prerequisites (in run order) and action.
    ///
    /// Fails with [`BuildError::DuplicateTask`] if the name is taken.
    pub fn register<N, P, A>(&mut self, name: N, prerequisites: P, action: A) -> Result<()>
    where
        N: Into<TaskName>,
        P: IntoIterator,
        P::Item: Into<TaskName>,
        A: TaskAction + 'static,
    {
        let name = name.into();
        let prerequisites: Vec<TaskName> = prerequisites.into_iter().map(Into::into).collect();

        debug!(task = %name, ?prerequisites, "registering task");

        self.graph.insert(name.clone(), prerequisites)?;
        self.actions.insert(name, Arc::new(action));
        Ok(())
    }

    /// Check that every prerequisite is registered and the graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        self.graph.validate()
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graph.contains(name)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub(crate) fn action(&self, name: &str) -> Result<Arc<dyn TaskAction>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::TaskNotFound(name.to_string()))
    }
}
