// src/cli/handlers/mod.rs

// One module per command.

/// `clean`
pub mod clean;
/// Helpers shared by the handlers.
pub mod commons;
/// `get`
pub mod get;
/// `info`
pub mod info;
/// `path`
pub mod path;
/// `run` and `run-all`
pub mod run;
/// `tree` / `ls`
pub mod tree;
