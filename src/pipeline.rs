// src/pipeline.rs

//! The fixed task set of a front-end project:
//!
//! ```text
//! build ──► elm ──► elm-init
//!   └─────► static
//! ```
//!
//! `elm` compiles sources, `static` copies assets, `elm-init` prepares the
//! compiler, and `build` aggregates both branches.

use std::sync::Arc;

use crate::config::ConfigFile;
use crate::dag::{Noop, TaskRegistry};
use crate::errors::Result;
use crate::exec::{CompileSources, CompilerInit, CopyAssets};
use crate::fs::FileSystem;
use crate::watch::WatchBinding;

pub const ELM_INIT: &str = "elm-init";
pub const ELM: &str = "elm";
pub const STATIC: &str = "static";
pub const BUILD: &str = "build";

/// Register the standard tasks against `cfg` and validate the graph.
pub fn build_registry(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<TaskRegistry> {
    let paths = cfg.paths();
    let mut registry = TaskRegistry::new();

    registry.register(STATIC, Vec::<String>::new(), CopyAssets::new(Arc::clone(&fs), paths)?)?;
    registry.register(
        ELM_INIT,
        Vec::<String>::new(),
        CompilerInit::new(cfg.compiler().init.clone()),
    )?;
    registry.register(
        ELM,
        [ELM_INIT],
        CompileSources::new(Arc::clone(&fs), paths, cfg.compiler())?,
    )?;
    registry.register(BUILD, [ELM, STATIC], Noop)?;

    registry.validate()?;
    Ok(registry)
}

/// Which task each kind of source change rebuilds.
pub fn watch_bindings(cfg: &ConfigFile) -> Vec<WatchBinding> {
    let paths = cfg.paths();
    vec![
        WatchBinding::new(ELM, paths.compiled.iter().cloned()),
        WatchBinding::new(STATIC, paths.static_assets.iter().cloned()),
    ]
}
