//! A declarative collection runner.
//!
//! A [`Collection`](models::Collection) is a tree of named actions. Each leaf
//! becomes an [`Item`](core::item::Item) whose keyword arguments are inherited
//! from its ancestors, and whose expansion axes multiply it into one
//! [`Expansion`](core::expansion::Expansion) per combination. The
//! [`Runner`](core::runner::Runner) runs expansions, stores their artifacts
//! under a results directory, serves them back from disk, and cleans up files
//! no expansion accounts for.

/// Command-line front end: dispatcher and handlers.
pub mod cli;
/// Names, separators and defaults shared across the crate.
pub mod constants;
/// The engine: merging, items, expansions, storage and the runner.
pub mod core;
/// The collection builder and runner options.
pub mod models;

pub use crate::core::artifact::{Artifact, Figure};
pub use crate::core::runner::{CleanReport, RunRequest, RunSummary, Runner, RunnerError};
pub use crate::core::table::{Cell, Table};
pub use crate::models::{Action, ArtifactKind, Collection, Configure, Kwargs, Leaf, RunnerOptions};
