// src/dag/mod.rs

//! Task registry and dependency-ordered execution.
//!
//! - [`task`] defines the action trait a task runs.
//! - [`graph`] holds the explicit prerequisite graph and resolves plans.
//! - [`registry`] pairs the graph with the registered actions.
//! - [`runner`] executes a task after its transitive prerequisites.

pub mod graph;
pub mod registry;
pub mod runner;
pub mod task;

pub use graph::TaskGraph;
pub use registry::TaskRegistry;
pub use runner::{RunReport, TaskRunner};
pub use task::{action_fn, ActionFuture, FnAction, Noop, TaskAction, TaskName};
