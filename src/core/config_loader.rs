//! # Config Loader
//!
//! Loads [`RunnerOptions`] from `crun.toml` and applies environment overrides.
//! A missing file is not an error: every option has a default.

use crate::constants::{OPTIONS_FILENAME, RESULTS_DIR_ENV};
use crate::models::RunnerOptions;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading the options file.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// The file exists but could not be read.
    #[error("I/O error while reading options: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML content is invalid.
    #[error("Failed to parse TOML file at '{path}': {source}")]
    TomlParse {
        /// The path to the file that failed to parse.
        path: PathBuf,
        /// The underlying parsing error from the `toml` crate.
        #[source]
        source: toml::de::Error,
    },
}

/// Reads `crun.toml` from `dir`, falling back to defaults when it is absent.
pub fn load_options_file(dir: &Path) -> Result<RunnerOptions, OptionsError> {
    let path = dir.join(OPTIONS_FILENAME);
    if !path.exists() {
        log::debug!("No options file at '{}', using defaults.", path.display());
        return Ok(RunnerOptions::default());
    }

    let content = fs::read_to_string(&path)?;
    let options = toml::from_str(&content).map_err(|e| OptionsError::TomlParse {
        path: path.clone(),
        source: e,
    })?;
    log::debug!("Loaded options from '{}'.", path.display());
    Ok(options)
}

/// Overrides options from environment variables, read through `lookup`.
pub fn apply_env_overrides<F>(options: &mut RunnerOptions, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(RESULTS_DIR_ENV).filter(|value| !value.trim().is_empty()) {
        log::debug!("{} overrides results_dir with '{}'.", RESULTS_DIR_ENV, dir);
        options.results_dir = dir;
    }
}

/// Loads the options for a run started in `dir`, with the process environment
/// taking precedence over the file.
pub fn load_options(dir: &Path) -> Result<RunnerOptions, OptionsError> {
    let mut options = load_options_file(dir)?;
    apply_env_overrides(&mut options, |key| std::env::var(key).ok());
    Ok(options)
}
