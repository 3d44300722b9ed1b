// src/core/mod.rs

/// Artifact values and their on-disk formats.
pub mod artifact;
/// Metadata about stored artifacts.
pub mod cache;
/// Runner options from `crun.toml` and the environment.
pub mod config_loader;
/// Configuration merging and collection flattening.
pub mod config_resolver;
/// Single parameterizations of an item.
pub mod expansion;
/// Tree rendering of item locations.
pub mod graph_display;
/// Items, their axes and query matching.
pub mod item;
/// Results directory helpers.
pub mod paths;
/// The runner.
pub mod runner;
/// Tables and CSV.
pub mod table;
