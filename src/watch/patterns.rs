// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::dag::TaskName;
use crate::fs::FileSystem;

/// A set of glob patterns and the task to run when a matching path changes.
///
/// Patterns are relative to the watched source root, e.g. `"*.elm"` or
/// `"assets/**/*.css"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub patterns: Vec<String>,
    pub task: TaskName,
}

impl WatchBinding {
    pub fn new<T, I>(task: T, patterns: I) -> Self
    where
        T: Into<TaskName>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            task: task.into(),
        }
    }
}

/// A [`WatchBinding`] with its patterns compiled.
#[derive(Clone)]
pub struct CompiledBinding {
    task: TaskName,
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for CompiledBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBinding")
            .field("task", &self.task)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl CompiledBinding {
    /// Name of the task this binding triggers.
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the given path (relative to the source root, forward
    /// slashes) matches any of the binding's patterns.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Compile every binding's patterns.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<CompiledBinding>> {
    bindings
        .iter()
        .map(|b| -> Result<CompiledBinding> {
            let set = build_globset(&b.patterns)
                .with_context(|| format!("building watch globset for task {}", b.task))?;
            Ok(CompiledBinding {
                task: b.task.clone(),
                patterns: b.patterns.clone(),
                set,
            })
        })
        .collect()
}

/// Build a GlobSet from simple string patterns.
///
/// `*` does not cross directory separators, so `*.elm` only matches files
/// directly under the root; use `**/*.elm` to recurse.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `root` whose root-relative path matches `set`.
///
/// The result is sorted so that builds process files in a stable order.
/// A missing root matches nothing.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    set: &GlobSet,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !fs.is_dir(root) {
        return Ok(files);
    }

    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if set.is_match(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
