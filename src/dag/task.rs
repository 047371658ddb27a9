// src/dag/task.rs

//! Task actions: the unit of work a registered task performs.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Completion signal of a task action.
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Something a task does when it runs.
///
/// The runner awaits the returned future before any dependent task starts,
/// so asynchronous work must finish inside it.
pub trait TaskAction: Send + Sync {
    fn invoke(&self) -> ActionFuture<'_>;
}

/// Adapter turning an async closure into a [`TaskAction`].
pub struct FnAction<F> {
    f: F,
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").finish_non_exhaustive()
    }
}

impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn invoke(&self) -> ActionFuture<'_> {
        Box::pin((self.f)())
    }
}

/// Wrap an async closure as a task action.
pub fn action_fn<F, Fut>(f: F) -> FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnAction { f }
}

/// Action that completes immediately; used by aggregate tasks such as `build`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl TaskAction for Noop {
    fn invoke(&self) -> ActionFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}
