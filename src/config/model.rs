// src/config/model.rs

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// Every section is optional; the defaults reproduce the classic layout of
/// an Elm front-end project:
///
/// ```toml
/// [paths]
/// source_root = "src"
/// dest = "dist"
/// compiled = ["*.elm"]
/// static = ["*.{html,css}"]
///
/// [compiler]
/// program = "elm"
/// args = ["make", "{input}", "--output={output}"]
/// output_extension = "js"
/// init = []
///
/// [server]
/// host = "127.0.0.1"
/// port = 5050
///
/// [watch]
/// debounce_ms = 0
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchConfig,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// [`ConfigFile::default`], so holders can rely on globs compiling and the
/// server address being well formed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    paths: PathConfig,
    compiler: CompilerConfig,
    server: ServerConfig,
    watch: WatchConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        paths: PathConfig,
        compiler: CompilerConfig,
        server: ServerConfig,
        watch: WatchConfig,
    ) -> Self {
        Self {
            paths,
            compiler,
            server,
            watch,
        }
    }

    pub fn paths(&self) -> &PathConfig {
        &self.paths
    }

    pub fn compiler(&self) -> &CompilerConfig {
        &self.compiler
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn watch(&self) -> &WatchConfig {
        &self.watch
    }

    /// Resolve every relative directory against `root` (the directory the
    /// config file lives in).
    pub fn rebased(mut self, root: &Path) -> Self {
        self.paths.source_root = rebase(root, &self.paths.source_root);
        self.paths.dest = rebase(root, &self.paths.dest);
        self.server.root = rebase(root, &self.server.root);
        self
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let paths = PathConfig::default();
        let server = ServerConfig {
            root: paths.dest.clone(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: default_port(),
        };
        Self::new_unchecked(paths, CompilerConfig::default(), server, WatchConfig::default())
    }
}

fn rebase(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// `[paths]` section.
///
/// Glob patterns are relative to `source_root`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Output directory populated by the build tasks.
    #[serde(default = "default_dest")]
    pub dest: PathBuf,

    /// Sources handed to the compiler.
    #[serde(default = "default_compiled")]
    pub compiled: Vec<String>,

    /// Assets copied verbatim into `dest`.
    #[serde(default = "default_static", rename = "static")]
    pub static_assets: Vec<String>,
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_dest() -> PathBuf {
    PathBuf::from("dist")
}

fn default_compiled() -> Vec<String> {
    vec!["*.elm".to_string()]
}

fn default_static() -> Vec<String> {
    vec!["*.{html,css}".to_string()]
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            dest: default_dest(),
            compiled: default_compiled(),
            static_assets: default_static(),
        }
    }
}

/// `[compiler]` section: how the external compiler is invoked for each
/// source file.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_program")]
    pub program: String,

    /// Argument template. `{input}` is replaced by the source path and
    /// `{output}` by the destination path.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Extension given to compiled outputs (without the dot).
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Optional setup command run by the `elm-init` task. Empty means no-op.
    #[serde(default)]
    pub init: Vec<String>,
}

pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

fn default_program() -> String {
    "elm".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        "make".to_string(),
        INPUT_PLACEHOLDER.to_string(),
        format!("--output={OUTPUT_PLACEHOLDER}"),
    ]
}

fn default_output_extension() -> String {
    "js".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            output_extension: default_output_extension(),
            init: Vec::new(),
        }
    }
}

/// `[server]` section as written in TOML.
///
/// `root` defaults to `[paths].dest`, which is resolved during validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5050
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            root: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Resolved static server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            root: root.into(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub struct WatchConfig {
    /// Drop repeated triggers of the same task arriving within this many
    /// milliseconds of the previous one. `0` disables debouncing.
    #[serde(default)]
    pub debounce_ms: u64,
}
