// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

use crate::engine::RuntimeEvent;
use crate::watch::event_handler::{run_event_loop, EventDispatcher};
use crate::watch::patterns::CompiledBinding;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    root: PathBuf,
}

impl WatcherHandle {
    /// The (canonicalized) directory being watched.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Watch `root` recursively and send `RuntimeEvent::TaskTriggered` for every
/// binding whose patterns match a changed path.
///
/// Must be called from within a Tokio runtime. Watching lasts until the
/// returned handle is dropped.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<CompiledBinding>,
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root
        .canonicalize()
        .with_context(|| format!("source root {:?} is not accessible", root))?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // Called from notify's thread; tracing may not be set up there.
                    eprintln!("buildwatch: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("buildwatch: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", root))?;

    let tasks: Vec<&str> = bindings.iter().map(|b| b.task()).collect();
    info!(?root, ?tasks, "file watcher started");

    let dispatcher = EventDispatcher::new(root.clone(), bindings, debounce);
    tokio::spawn(run_event_loop(dispatcher, event_rx, runtime_tx));

    Ok(WatcherHandle {
        _inner: watcher,
        root,
    })
}
