// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::TaskRunner;

use super::{RuntimeEvent, TaskName, TaskOutcome, TriggerReason};

/// What the loop did before it stopped.
///
/// Counters only, so a long watch session does not accumulate history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSummary {
    /// Triggered runs handled.
    pub runs: usize,
    /// Runs among `runs` that failed.
    pub failures: usize,
    /// The most recent run and its outcome.
    pub last: Option<(TaskName, TaskOutcome)>,
}

impl RuntimeSummary {
    fn record(&mut self, task: TaskName, outcome: TaskOutcome) {
        self.runs += 1;
        if outcome == TaskOutcome::Failed {
            self.failures += 1;
        }
        self.last = Some((task, outcome));
    }
}

/// Runs triggered tasks through a [`TaskRunner`] until shutdown.
///
/// Triggers are handled strictly in arrival order, one run at a time.
pub struct Runtime {
    runner: TaskRunner,
    event_rx: mpsc::Receiver<RuntimeEvent>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(runner: TaskRunner, event_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self { runner, event_rx }
    }

    /// Main event loop.
    ///
    /// Returns when `ShutdownRequested` arrives or every sender is dropped.
    /// Task failures never end the loop.
    pub async fn run(mut self) -> RuntimeSummary {
        info!("buildwatch runtime started");
        let mut summary = RuntimeSummary::default();

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    let outcome = self.run_triggered(&task, reason).await;
                    summary.record(task, outcome);
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    break;
                }
            }
        }

        info!(
            runs = summary.runs,
            failures = summary.failures,
            "runtime exiting"
        );
        summary
    }

    async fn run_triggered(&self, task: &str, reason: TriggerReason) -> TaskOutcome {
        match self.runner.run(task).await {
            Ok(report) => {
                info!(
                    task = %task,
                    ?reason,
                    executed = ?report.executed,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "rebuild succeeded"
                );
                TaskOutcome::Success
            }
            Err(err) => {
                error!(task = %task, ?reason, error = %err, "rebuild failed; still watching");
                TaskOutcome::Failed
            }
        }
    }
}
