// src/watch/event_handler.rs

//! Turns filesystem events into task triggers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dag::TaskName;
use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::CompiledBinding;

/// Maps each filesystem event to zero or one trigger per bound task.
#[derive(Debug)]
pub struct EventDispatcher {
    root: PathBuf,
    bindings: Vec<CompiledBinding>,
    /// Zero disables debouncing.
    debounce: Duration,
    last_triggered: HashMap<TaskName, Instant>,
}

impl EventDispatcher {
    /// `root` is the directory all binding patterns are relative to.
    pub fn new(root: impl Into<PathBuf>, bindings: Vec<CompiledBinding>, debounce: Duration) -> Self {
        Self {
            root: root.into(),
            bindings,
            debounce,
            last_triggered: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bindings(&self) -> &[CompiledBinding] {
        &self.bindings
    }

    /// Tasks that `event` should trigger, each at most once, in binding order.
    ///
    /// Read-only (access) events trigger nothing. With a debounce window, a
    /// task triggered less than the window ago is left out.
    pub fn tasks_for_event(&mut self, event: &Event) -> Vec<TaskName> {
        if matches!(event.kind, EventKind::Access(_)) {
            return Vec::new();
        }

        let mut matched: Vec<TaskName> = Vec::new();
        for path in event.paths.iter() {
            let Some(rel) = relative_str(&self.root, path) else {
                warn!(
                    "could not relativize path {:?} against root {:?}",
                    path, self.root
                );
                continue;
            };

            for binding in self.bindings.iter() {
                if binding.matches(&rel) && !matched.iter().any(|t| t == binding.task()) {
                    debug!(task = %binding.task(), path = %rel, "watch match");
                    matched.push(binding.task().to_string());
                }
            }
        }

        let now = Instant::now();
        let mut tasks = Vec::with_capacity(matched.len());
        for task in matched {
            if self.within_debounce(&task, now) {
                debug!(task = %task, "debounced trigger dropped");
                continue;
            }
            self.last_triggered.insert(task.clone(), now);
            tasks.push(task);
        }
        tasks
    }

    fn within_debounce(&self, task: &str, now: Instant) -> bool {
        if self.debounce.is_zero() {
            return false;
        }
        self.last_triggered
            .get(task)
            .is_some_and(|last| now.duration_since(*last) < self.debounce)
    }

    /// Send a `TaskTriggered` event for every task `event` maps to.
    ///
    /// Returns `false` once the runtime channel is closed.
    pub async fn dispatch(
        &mut self,
        event: &Event,
        runtime_tx: &mpsc::Sender<RuntimeEvent>,
    ) -> bool {
        for task in self.tasks_for_event(event) {
            debug!(task = %task, "watch match -> triggering task");
            if let Err(err) = runtime_tx
                .send(RuntimeEvent::TaskTriggered {
                    task,
                    reason: TriggerReason::FileWatch,
                })
                .await
            {
                warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
                return false;
            }
        }
        true
    }
}

/// Consume filesystem events until the source or the runtime goes away.
pub async fn run_event_loop(
    mut dispatcher: EventDispatcher,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    while let Some(event) = event_rx.recv().await {
        debug!(?event, "received notify event");
        if !dispatcher.dispatch(&event, &runtime_tx).await {
            // No point keeping the watcher loop alive without a runtime.
            break;
        }
    }
    debug!("watcher event loop finished");
}
