use std::sync::{Arc, Mutex};

use buildwatch::dag::{ActionFuture, TaskAction};

/// Shared, ordered log of task actions that ran.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action that appends `name` to the log and succeeds.
    pub fn action(&self, name: &str) -> RecordingAction {
        RecordingAction {
            name: name.to_string(),
            log: Arc::clone(&self.log),
            fail_with: None,
        }
    }

    /// Action that appends `name` to the log and then fails with `message`.
    pub fn failing(&self, name: &str, message: &str) -> RecordingAction {
        RecordingAction {
            name: name.to_string(),
            log: Arc::clone(&self.log),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|n| *n == name).count()
    }

    /// Position of `name` in the log, if it ran.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.log.lock().unwrap().iter().position(|n| n == name)
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

/// A task action created by [`Recorder`].
///
/// Yields to the scheduler before completing so that ordering bugs in the
/// runner (not awaiting an action) would show up.
#[derive(Debug, Clone)]
pub struct RecordingAction {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail_with: Option<String>,
}

impl TaskAction for RecordingAction {
    fn invoke(&self) -> ActionFuture<'_> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.log.lock().unwrap().push(self.name.clone());
            match &self.fail_with {
                Some(message) => Err(anyhow::anyhow!("{message}")),
                None => Ok(()),
            }
        })
    }
}
