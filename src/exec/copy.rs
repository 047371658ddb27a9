// src/exec/copy.rs

//! Static asset collaborator: the `static` task action.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::GlobSet;
use tracing::{debug, info};

use crate::config::model::PathConfig;
use crate::dag::{ActionFuture, TaskAction};
use crate::fs::FileSystem;
use crate::watch::patterns::{build_globset, collect_matching_files};

/// Copies every file under `source_root` matching `set` into `dest`,
/// byte for byte, keeping its path relative to `source_root`.
///
/// Returns the destination paths in copy order.
pub fn copy_matching(
    fs: &dyn FileSystem,
    source_root: &Path,
    dest: &Path,
    set: &GlobSet,
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for src in collect_matching_files(fs, source_root, set)? {
        let rel = src
            .strip_prefix(source_root)
            .with_context(|| format!("{:?} is outside {:?}", src, source_root))?;
        let target = dest.join(rel);

        let bytes = fs.read(&src)?;
        fs.write(&target, &bytes)?;
        debug!(?src, ?target, bytes = bytes.len(), "copied asset");

        copied.push(target);
    }
    Ok(copied)
}

pub struct CopyAssets {
    fs: Arc<dyn FileSystem>,
    source_root: PathBuf,
    dest: PathBuf,
    assets: GlobSet,
}

impl fmt::Debug for CopyAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyAssets")
            .field("source_root", &self.source_root)
            .field("dest", &self.dest)
            .finish_non_exhaustive()
    }
}

impl CopyAssets {
    pub fn new(fs: Arc<dyn FileSystem>, paths: &PathConfig) -> Result<Self> {
        let assets = build_globset(&paths.static_assets).context("static asset patterns")?;
        Ok(Self {
            fs,
            source_root: paths.source_root.clone(),
            dest: paths.dest.clone(),
            assets,
        })
    }

    async fn copy_all(&self) -> Result<()> {
        let fs = Arc::clone(&self.fs);
        let root = self.source_root.clone();
        let dest = self.dest.clone();
        let set = self.assets.clone();

        let copied = tokio::task::spawn_blocking(move || {
            copy_matching(fs.as_ref(), &root, &dest, &set)
        })
        .await
        .context("asset copy task panicked")??;

        info!(count = copied.len(), dest = ?self.dest, "copied static assets");
        Ok(())
    }
}

impl TaskAction for CopyAssets {
    fn invoke(&self) -> ActionFuture<'_> {
        Box::pin(self.copy_all())
    }
}
