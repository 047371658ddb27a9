// src/exec/compile.rs

//! Compiler collaborator: the `elm-init` and `elm` task actions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use globset::GlobSet;
use tracing::{debug, info};

use crate::config::model::{CompilerConfig, PathConfig, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::dag::{ActionFuture, TaskAction};
use crate::exec::process::run_process;
use crate::fs::FileSystem;
use crate::watch::patterns::{build_globset, collect_matching_files};

/// Compiles every source matching the configured globs, one compiler
/// invocation per file, into the output directory.
pub struct CompileSources {
    fs: Arc<dyn FileSystem>,
    source_root: PathBuf,
    dest: PathBuf,
    sources: GlobSet,
    compiler: CompilerConfig,
}

impl fmt::Debug for CompileSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileSources")
            .field("source_root", &self.source_root)
            .field("dest", &self.dest)
            .field("compiler", &self.compiler)
            .finish_non_exhaustive()
    }
}

impl CompileSources {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        paths: &PathConfig,
        compiler: &CompilerConfig,
    ) -> Result<Self> {
        let sources = build_globset(&paths.compiled).context("compiled source patterns")?;
        Ok(Self {
            fs,
            source_root: paths.source_root.clone(),
            dest: paths.dest.clone(),
            sources,
            compiler: compiler.clone(),
        })
    }

    /// Where the compiled artifact for `input` goes: its path relative to the
    /// source root, under `dest`, with the output extension.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        output_path_for(
            &self.source_root,
            &self.dest,
            &self.compiler.output_extension,
            input,
        )
    }

    /// Compiler arguments for one file, placeholders substituted.
    pub fn command_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.compiler
            .args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    async fn compile_all(&self) -> Result<()> {
        let fs = Arc::clone(&self.fs);
        let root = self.source_root.clone();
        let dest = self.dest.clone();
        let extension = self.compiler.output_extension.clone();
        let set = self.sources.clone();

        // Scan and create output directories off the async workers.
        let inputs = tokio::task::spawn_blocking(move || -> Result<Vec<(PathBuf, PathBuf)>> {
            let mut pairs = Vec::new();
            for input in collect_matching_files(fs.as_ref(), &root, &set)? {
                let output = output_path_for(&root, &dest, &extension, &input);
                if let Some(parent) = output.parent() {
                    fs.create_dir_all(parent)?;
                }
                pairs.push((input, output));
            }
            Ok(pairs)
        })
        .await
        .context("source scan task panicked")??;

        if inputs.is_empty() {
            info!(root = ?self.source_root, "no sources to compile");
            return Ok(());
        }

        let mut failures = Vec::new();
        for (input, output) in inputs.iter() {
            let args = self.command_args(input, output);
            match run_process(&self.compiler.program, &args).await {
                Ok(_) => debug!(?input, ?output, "compiled"),
                Err(err) => failures.push(format!("{}: {err:#}", input.display())),
            }
        }

        if !failures.is_empty() {
            bail!(
                "{} of {} sources failed to compile:\n{}",
                failures.len(),
                inputs.len(),
                failures.join("\n")
            );
        }

        info!(count = inputs.len(), dest = ?self.dest, "compiled sources");
        Ok(())
    }
}

fn output_path_for(source_root: &Path, dest: &Path, extension: &str, input: &Path) -> PathBuf {
    let rel = input.strip_prefix(source_root).unwrap_or(input);
    dest.join(rel).with_extension(extension)
}

impl TaskAction for CompileSources {
    fn invoke(&self) -> ActionFuture<'_> {
        Box::pin(self.compile_all())
    }
}

/// One-off compiler setup (e.g. fetching packages). An empty command is a no-op.
#[derive(Debug, Clone, Default)]
pub struct CompilerInit {
    command: Vec<String>,
}

impl CompilerInit {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    async fn init(&self) -> Result<()> {
        match self.command.split_first() {
            None => {
                debug!("no compiler init command configured");
                Ok(())
            }
            Some((program, args)) => {
                run_process(program, args).await?;
                Ok(())
            }
        }
    }
}

impl TaskAction for CompilerInit {
    fn invoke(&self) -> ActionFuture<'_> {
        Box::pin(self.init())
    }
}
