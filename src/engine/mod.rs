// src/engine/mod.rs

//! Long-lived rebuild loop.
//!
//! The watcher (and Ctrl-C handler) feed [`RuntimeEvent`]s into a channel;
//! [`Runtime`] consumes them one at a time and runs the requested task
//! through the [`TaskRunner`](crate::dag::TaskRunner). A failed run is
//! logged and the loop keeps going.

pub use crate::dag::TaskName;

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (e.g. the initial build at startup).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Outcome of one triggered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be run.
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod runtime;

pub use runtime::{Runtime, RuntimeSummary};
