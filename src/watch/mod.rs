// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling watch bindings (glob patterns → task) relative to the source root.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Dispatching each change event to the tasks whose bindings match it.
//!
//! It does **not** run tasks itself; it only turns filesystem changes into
//! `RuntimeEvent::TaskTriggered` messages for the engine.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event_handler::{run_event_loop, EventDispatcher};
pub use patterns::{
    build_globset, collect_matching_files, compile_bindings, CompiledBinding, WatchBinding,
};
pub use watcher::{spawn_watcher, WatcherHandle};
