// src/dag/runner.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::dag::registry::TaskRegistry;
use crate::dag::task::TaskName;
use crate::errors::{BuildError, Result};

/// Result of a successful [`TaskRunner::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The task that was requested.
    pub root: TaskName,
    /// Every task whose action ran, in execution order (`root` last).
    pub executed: Vec<TaskName>,
    pub elapsed: Duration,
}

/// Executes tasks of a shared [`TaskRegistry`] in dependency order.
///
/// Cheap to clone; the engine loop and the orchestrator share one.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    registry: Arc<TaskRegistry>,
}

impl TaskRunner {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Tasks a run of `name` would execute, in order.
    pub fn plan(&self, name: &str) -> Result<Vec<TaskName>> {
        self.registry.graph().execution_plan(name)
    }

    /// Run `name` after all of its transitive prerequisites.
    ///
    /// The whole plan is resolved before the first action starts, so an
    /// unknown task, an unresolved prerequisite or a cycle fails without
    /// running anything. Each action is awaited before the next one starts.
    /// The first failing action stops the run.
    pub async fn run(&self, name: &str) -> Result<RunReport> {
        let plan = self.plan(name)?;
        let started = Instant::now();

        debug!(task = %name, ?plan, "resolved execution plan");

        let mut executed = Vec::with_capacity(plan.len());
        for task in plan {
            let action = self.registry.action(&task)?;
            let task_started = Instant::now();

            info!(task = %task, "starting");
            if let Err(source) = action.invoke().await {
                warn!(
                    task = %task,
                    root = %name,
                    completed = executed.len(),
                    "task failed; stopping run"
                );
                return Err(BuildError::TaskExecution { task, source });
            }
            info!(
                task = %task,
                elapsed_ms = task_started.elapsed().as_millis() as u64,
                "finished"
            );

            executed.push(task);
        }

        Ok(RunReport {
            root: name.to_string(),
            executed,
            elapsed: started.elapsed(),
        })
    }
}
