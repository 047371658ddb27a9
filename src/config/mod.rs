// src/config/mod.rs

//! Configuration loading and validation for buildwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate globs, compiler template and server address (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default, DEFAULT_CONFIG_FILE};
pub use validate::check_output_layout;
pub use model::{
    CompilerConfig, ConfigFile, PathConfig, RawConfigFile, ServerConfig, ServerSection,
    WatchConfig,
};
