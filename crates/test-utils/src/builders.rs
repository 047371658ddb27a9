#![allow(dead_code)]

use buildwatch::dag::{TaskRegistry, TaskRunner};

use crate::recorder::Recorder;

/// Builder for `TaskRegistry` with recording actions, to simplify test setup.
pub struct RegistryBuilder {
    registry: TaskRegistry,
    recorder: Recorder,
}

impl RegistryBuilder {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            registry: TaskRegistry::new(),
            recorder: recorder.clone(),
        }
    }

    /// Add a task that records its name and succeeds.
    pub fn task(mut self, name: &str, prerequisites: &[&str]) -> Self {
        let action = self.recorder.action(name);
        self.registry
            .register(name, prerequisites.iter().copied(), action)
            .expect("Failed to register task in builder");
        self
    }

    /// Add a task that records its name and fails with `message`.
    pub fn failing_task(mut self, name: &str, prerequisites: &[&str], message: &str) -> Self {
        let action = self.recorder.failing(name, message);
        self.registry
            .register(name, prerequisites.iter().copied(), action)
            .expect("Failed to register task in builder");
        self
    }

    pub fn build(self) -> TaskRegistry {
        self.registry
    }

    pub fn runner(self) -> TaskRunner {
        TaskRunner::new(self.registry)
    }
}

/// The front-end pipeline shape with recording actions:
/// `static`, `elm-init`, `elm` (after `elm-init`), `build` (after `elm`, `static`).
pub fn pipeline_shape(recorder: &Recorder) -> TaskRunner {
    RegistryBuilder::new(recorder)
        .task("static", &[])
        .task("elm-init", &[])
        .task("elm", &["elm-init"])
        .task("build", &["elm", "static"])
        .runner()
}
