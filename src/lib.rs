// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{check_output_layout, load_or_default, ConfigFile};
use crate::dag::TaskRunner;
use crate::engine::{Runtime, RuntimeEvent, RuntimeSummary};
use crate::fs::{FileSystem, RealFileSystem};
use crate::server::StaticServer;
use crate::watch::compile_bindings;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the task registry / runner
/// - static server, initial build and file watcher (see [`serve_build_watch`])
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?.rebased(&config_root_dir(&config_path));
    check_output_layout(cfg.paths())?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let registry = pipeline::build_registry(&cfg, fs)?;
    let runner = TaskRunner::new(registry);

    if args.dry_run {
        print_dry_run(&cfg, &runner)?;
        return Ok(());
    }

    if args.once {
        let report = runner.run(pipeline::BUILD).await?;
        info!(
            executed = ?report.executed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "build finished"
        );
        return Ok(());
    }

    serve_build_watch(&cfg, runner).await
}

/// Default mode: serve, build once, then rebuild on every change until Ctrl-C.
///
/// A busy port is fatal.
pub async fn serve_build_watch(cfg: &ConfigFile, runner: TaskRunner) -> Result<()> {
    let server = StaticServer::bind(cfg.server()).await?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C: {e}");
                return;
            }
            request_shutdown(&tx).await;
        });
    }

    let summary = build_and_watch(cfg, server, runner, rt_tx, rt_rx).await?;
    debug!(?summary, "runtime summary");
    Ok(())
}

/// The serve → build → watch sequence on an already bound server.
///
/// 1. Start serving `server` in the background.
/// 2. Run `build` to completion. Failure is logged and we carry on, so
///    the next saved fix is picked up by the watcher.
/// 3. Watch the source root and run the engine loop until a
///    `ShutdownRequested` arrives on `runtime_tx` (or every sender is gone).
///
/// The server stops when this returns.
pub async fn build_and_watch(
    cfg: &ConfigFile,
    server: StaticServer,
    runner: TaskRunner,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    runtime_rx: mpsc::Receiver<RuntimeEvent>,
) -> Result<RuntimeSummary> {
    let bindings = compile_bindings(&pipeline::watch_bindings(cfg))?;

    let server = server.spawn();
    info!(
        "serving {:?} at http://{}/",
        server.root(),
        server.local_addr()
    );

    run_initial_build(&runner).await;

    let watcher = watch::spawn_watcher(
        &cfg.paths().source_root,
        bindings,
        Duration::from_millis(cfg.watch().debounce_ms),
        runtime_tx,
    );
    let _watcher = match watcher {
        Ok(handle) => handle,
        Err(err) => {
            server.abort();
            return Err(err);
        }
    };

    let summary = Runtime::new(runner, runtime_rx).run().await;

    server.abort();
    Ok(summary)
}

/// Ask the engine loop to stop. Returns `false` if it is already gone.
pub async fn request_shutdown(runtime_tx: &mpsc::Sender<RuntimeEvent>) -> bool {
    match runtime_tx.send(RuntimeEvent::ShutdownRequested).await {
        Ok(()) => true,
        Err(_) => {
            debug!("shutdown requested but the runtime has already stopped");
            false
        }
    }
}

/// Run the initial `build`. Never fails: a broken build still leads to
/// watching.
pub async fn run_initial_build(runner: &TaskRunner) -> bool {
    match runner.run(pipeline::BUILD).await {
        Ok(report) => {
            info!(
                executed = ?report.executed,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "initial build finished"
            );
            true
        }
        Err(err) => {
            error!(error = %err, "initial build failed; watching for changes anyway");
            false
        }
    }
}

/// Figure out the project root that relative config paths hang off.
///
/// - If the config path has a non-empty parent (e.g. "web/Buildwatch.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Buildwatch.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Dry-run output: resolved paths, build plan and watch bindings.
fn print_dry_run(cfg: &ConfigFile, runner: &TaskRunner) -> Result<()> {
    let paths = cfg.paths();
    println!("buildwatch dry-run");
    println!("  source_root = {}", paths.source_root.display());
    println!("  dest        = {}", paths.dest.display());
    println!(
        "  server      = http://{}/ serving {}",
        cfg.server().addr(),
        cfg.server().root.display()
    );
    println!();

    let graph = runner.registry().graph();
    println!("tasks ({}):", graph.len());
    for name in graph.tasks() {
        let deps = graph.prerequisites_of(name);
        if deps.is_empty() {
            println!("  - {name}");
        } else {
            println!("  - {name} (after {})", deps.join(", "));
        }
    }
    println!();

    let plan = runner.plan(pipeline::BUILD)?;
    println!("plan for '{}': {}", pipeline::BUILD, plan.join(" -> "));
    println!();

    println!("watch:");
    for binding in pipeline::watch_bindings(cfg) {
        println!("  {:?} -> {}", binding.patterns, binding.task);
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
