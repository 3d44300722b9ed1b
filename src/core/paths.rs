// src/core/paths.rs

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving the results directory.
#[derive(Error, Debug)]
pub enum PathError {
    /// `~` or a variable in the template could not be expanded.
    #[error("Failed to expand path template '{template}': {message}")]
    Expansion {
        /// The template as configured.
        template: String,
        /// Why expansion failed.
        message: String,
    },
    /// The directory could not be created or canonicalized.
    #[error("Could not create results directory at '{path}': {source}")]
    ResultsDirCreation {
        /// The directory, as given.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Expands a path template string, resolving the home directory (`~`) and
/// environment variables (`$VAR`).
pub fn expand_path_template(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        message: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Creates the results directory (and its parents) if needed and returns its
/// canonical form.
///
/// Canonicalizing up front means expansion paths and the paths found while
/// walking the directory in `clean` compare equal.
pub fn prepare_results_dir(dir: &Path) -> Result<PathBuf, PathError> {
    let creation_error = |source| PathError::ResultsDirCreation {
        path: dir.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(creation_error)?;
    dunce::canonicalize(dir).map_err(creation_error)
}
