// src/exec/mod.rs

//! Build actions.
//!
//! - [`process`] runs an external program and turns a non-zero exit into an
//!   error carrying the program's diagnostic.
//! - [`compile`] hosts the compiler collaborator (`elm-init`, `elm`).
//! - [`copy`] hosts the static asset collaborator (`static`).

pub mod compile;
pub mod copy;
pub mod process;

pub use compile::{CompileSources, CompilerInit};
pub use copy::{copy_matching, CopyAssets};
pub use process::{run_process, ProcessOutput};
