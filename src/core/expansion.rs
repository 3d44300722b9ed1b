// src/core/expansion.rs

//! A single parameterization of an item: fixed keyword arguments, and the file
//! their result is stored in.

use crate::constants::{NEGATED_FLAG_PREFIX, STEM_SEPARATOR, VALUE_SEPARATOR};
use crate::core::artifact::{self, Artifact, ArtifactError};
use crate::models::{Action, ArtifactKind, Kwargs};
use log::{debug, info};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while running an expansion or reading its artifact.
#[derive(Error, Debug)]
pub enum ExpansionError {
    /// The action returned an error.
    #[error("Action for '{location}' failed: {source}")]
    Action {
        /// The owning item's location.
        location: String,
        /// What the action reported.
        source: anyhow::Error,
    },
    /// The artifact could not be stored or read.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

type ExpansionResult<T> = Result<T, ExpansionError>;

/// One element of an item's cartesian product.
#[derive(Debug, Clone)]
pub struct Expansion {
    location: String,
    kwargs: Kwargs,
    action: Action,
    kind: ArtifactKind,
    /// Full path without the file suffix.
    base: PathBuf,
    suffix: String,
}

impl Expansion {
    pub(crate) fn new(
        location: String,
        kwargs: Kwargs,
        action: Action,
        kind: ArtifactKind,
        base: PathBuf,
        suffix: String,
    ) -> Self {
        Self {
            location,
            kwargs,
            action,
            kind,
            base,
            suffix,
        }
    }

    /// The owning item's location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The keyword arguments this expansion calls its action with.
    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    /// How the artifact is stored.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Where the artifact is stored.
    pub fn path(&self) -> PathBuf {
        with_suffix(&self.base, &self.suffix)
    }

    /// The path under every suffix of the kind, plus the configured one.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .kind
            .suffixes()
            .iter()
            .map(|suffix| with_suffix(&self.base, suffix))
            .collect();
        let configured = self.path();
        if !paths.contains(&configured) {
            paths.push(configured);
        }
        paths
    }

    /// Returns `true` if an artifact is stored at [`Expansion::path`].
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Calls the action and persists what it returns.
    ///
    /// `overrides` replace the stored keyword arguments for this call only.
    /// Keys the action does not accept are dropped.
    pub fn run(&self, overrides: &Kwargs) -> ExpansionResult<Artifact> {
        let mut kwargs = self.kwargs.clone();
        for (key, value) in overrides {
            if self.action.accepts(key) {
                kwargs.insert(key.clone(), value.clone());
            } else {
                debug!("'{}' does not accept '{}', ignoring it", self.location, key);
            }
        }

        info!("running: {}", self.location);
        let result = self
            .action
            .call(&kwargs)
            .map_err(|source| ExpansionError::Action {
                location: self.location.clone(),
                source,
            })?;

        artifact::save(self.kind, &result, &self.path())?;
        Ok(result)
    }

    /// Reads the stored artifact back.
    pub fn result(&self) -> ExpansionResult<Artifact> {
        Ok(artifact::load(self.kind, &self.path())?)
    }

    /// Deletes the stored artifact. A missing file is not an error.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// --- PATH COMPOSITION ---

/// Appends `suffix` to the file name, leaving any dots already in it alone.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Builds the extension-less path of an expansion.
///
/// `directories`, `prefixes` and `suffixes` are the `(key, value)` pairs of each
/// axis family, in axis order.
pub(crate) fn compose_base(
    item_directory: &Path,
    directories: &[(&str, &Value)],
    subdirs: &[String],
    prefixes: &[(&str, &Value)],
    name: &str,
    suffixes: &[(&str, &Value)],
) -> PathBuf {
    let mut path = item_directory.to_path_buf();
    for (key, value) in directories {
        path.push(stringify(key, value));
    }
    for subdir in subdirs {
        path.push(subdir);
    }

    let stem: Vec<String> = prefixes
        .iter()
        .map(|(key, value)| stringify(key, value))
        .chain(std::iter::once(name.to_string()))
        .chain(suffixes.iter().map(|(key, value)| stringify(key, value)))
        .collect();
    path.push(stem.join(STEM_SEPARATOR));
    path
}

/// Renders an axis value as a path component.
pub(crate) fn stringify(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => key.to_string(),
        Value::Bool(false) => format!("{NEGATED_FLAG_PREFIX}{key}"),
        Value::Null => "none".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| stringify(key, item))
            .collect::<Vec<_>>()
            .join(VALUE_SEPARATOR),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, stringify(k, v)))
            .collect::<Vec<_>>()
            .join(VALUE_SEPARATOR),
    }
}
