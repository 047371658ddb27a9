// src/config/validate.rs

use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};

use crate::config::model::{
    CompilerConfig, ConfigFile, PathConfig, RawConfigFile, ServerConfig, ServerSection,
    INPUT_PLACEHOLDER,
};
use crate::errors::{BuildError, Result};
use crate::watch::patterns::build_globset;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_paths(&raw.paths)?;
        validate_compiler(&raw.compiler)?;
        let server = resolve_server(&raw.server, &raw.paths)?;
        Ok(ConfigFile::new_unchecked(
            raw.paths,
            raw.compiler,
            server,
            raw.watch,
        ))
    }
}

fn validate_paths(paths: &PathConfig) -> Result<()> {
    check_output_layout(paths)?;

    build_globset(&paths.compiled).map_err(|e| {
        BuildError::ConfigError(format!("[paths].compiled: {e:#}"))
    })?;
    build_globset(&paths.static_assets).map_err(|e| {
        BuildError::ConfigError(format!("[paths].static: {e:#}"))
    })?;

    Ok(())
}

fn validate_compiler(compiler: &CompilerConfig) -> Result<()> {
    if compiler.program.trim().is_empty() {
        return Err(BuildError::ConfigError(
            "[compiler].program must not be empty".to_string(),
        ));
    }

    if !compiler.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
        return Err(BuildError::ConfigError(format!(
            "[compiler].args must mention {INPUT_PLACEHOLDER} (got {:?})",
            compiler.args
        )));
    }

    if compiler.output_extension.starts_with('.') {
        return Err(BuildError::ConfigError(format!(
            "[compiler].output_extension is given without the dot (got {:?})",
            compiler.output_extension
        )));
    }

    Ok(())
}

fn resolve_server(server: &ServerSection, paths: &PathConfig) -> Result<ServerConfig> {
    if server.port == 0 {
        return Err(BuildError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }

    let host: IpAddr = server.host.trim().parse().map_err(|e| {
        BuildError::ConfigError(format!(
            "[server].host is not an IP address ({:?}): {e}",
            server.host
        ))
    })?;

    Ok(ServerConfig {
        root: server.root.clone().unwrap_or_else(|| paths.dest.clone()),
        host,
        port: server.port,
    })
}

/// Reject an output directory equal to or nested inside the source root.
///
/// Outputs under the source root are picked up again by the asset globs and
/// by the recursive watcher, so every build would trigger the next one.
/// Paths are compared lexically; a relative path is only comparable with
/// another relative path, so this is re-checked once both are rebased.
pub fn check_output_layout(paths: &PathConfig) -> Result<()> {
    let source = normalize(&paths.source_root);
    let dest = normalize(&paths.dest);
    if source.is_absolute() != dest.is_absolute() {
        return Ok(());
    }

    if dest.starts_with(&source) {
        return Err(BuildError::ConfigError(format!(
            "[paths].dest ({:?}) must not be [paths].source_root ({:?}) or lie inside it",
            paths.dest, paths.source_root
        )));
    }
    Ok(())
}

/// Drop `.` components and fold `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
