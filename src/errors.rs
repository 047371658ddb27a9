// src/errors.rs

//! Crate-wide error type and result alias.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    #[error("Task '{task}' lists unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite { task: String, prerequisite: String },

    #[error("Cyclic task dependency: {0}")]
    CyclicDependency(String),

    #[error("Task '{task}' depends on '{prerequisite}', which is not registered")]
    UnresolvedDependency { task: String, prerequisite: String },

    #[error("Task '{task}' failed: {source:#}")]
    TaskExecution {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot listen on {addr}: {source}")]
    PortUnavailable {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildError>;
