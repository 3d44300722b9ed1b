// src/core/artifact.rs

//! Artifact values and their on-disk formats.
//!
//! Every write goes to a temporary file in the destination directory and is
//! then renamed over the final path, so an interrupted save never leaves a
//! truncated artifact that a later cache check would accept.

use crate::core::table::{Table, TableError};
use crate::models::ArtifactKind;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Suffix marking an LZ4-compressed table.
const COMPRESSED_SUFFIX: &str = ".lz4";

/// Errors raised while storing or reading an artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Reading or writing the file failed.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// The temporary file could not be renamed over the destination.
    #[error("Could not move artifact into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    /// The JSON could not be encoded or decoded.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// The stored CSV is malformed.
    #[error("Table Error: {0}")]
    Table(#[from] TableError),
    /// The `.csv.lz4` payload is corrupt.
    #[error("Could not decompress table: {0}")]
    Compression(#[from] lz4_flex::block::DecompressError),
    /// The action returned an artifact its item's kind cannot store.
    #[error("A '{kind}' item cannot store a {found} artifact.")]
    Mismatch {
        /// The item's kind.
        kind: ArtifactKind,
        /// What the action returned.
        found: &'static str,
    },
}

type ArtifactResult<T> = Result<T, ArtifactError>;

/// An already-rendered figure.
///
/// The producing action owns the rendering and hands back the encoded bytes.
/// The runner keeps no figure state between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Figure {
    bytes: Vec<u8>,
}

impl Figure {
    /// Wraps encoded image bytes (PNG, PDF, ...).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Wraps an SVG document.
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self {
            bytes: svg.into().into_bytes(),
        }
    }

    /// The encoded image.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the figure, returning the encoded image.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// The value an action produces, and what reading an expansion back yields.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Stored by `dataframe` items.
    Table(Table),
    /// Stored by `json` items.
    Json(Value),
    /// Stored by `plot` items.
    Figure(Figure),
    /// Stored by `generic` items.
    Text(String),
    /// Nothing to store; a generic item records an empty marker file.
    Empty,
}

impl Artifact {
    /// A short name for the variant, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Json(_) => "json",
            Self::Figure(_) => "figure",
            Self::Text(_) => "text",
            Self::Empty => "empty",
        }
    }

    /// The table, if this is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// The JSON value, if this is one.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Table> for Artifact {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Value> for Artifact {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Figure> for Artifact {
    fn from(figure: Figure) -> Self {
        Self::Figure(figure)
    }
}

impl From<String> for Artifact {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// --- SAVE ---

/// Persists `artifact` at `path` in the format of `kind`, creating parent directories.
pub fn save(kind: ArtifactKind, artifact: &Artifact, path: &Path) -> ArtifactResult<()> {
    let bytes = encode(kind, artifact, path)?;
    write_atomic(path, &bytes)?;
    debug!("Saved {} artifact to '{}'", kind, path.display());
    Ok(())
}

fn encode(kind: ArtifactKind, artifact: &Artifact, path: &Path) -> ArtifactResult<Vec<u8>> {
    let mismatch = || ArtifactError::Mismatch {
        kind,
        found: artifact.describe(),
    };

    match (kind, artifact) {
        (ArtifactKind::DataFrame, Artifact::Table(table)) => {
            let csv = table.to_csv().into_bytes();
            if is_compressed(path) {
                Ok(lz4_flex::compress_prepend_size(&csv))
            } else {
                Ok(csv)
            }
        }
        (ArtifactKind::Json, Artifact::Json(value)) => to_sorted_json(value),
        (ArtifactKind::Plot, Artifact::Figure(figure)) => Ok(figure.bytes().to_vec()),
        (ArtifactKind::Generic, Artifact::Text(text)) => Ok(text.clone().into_bytes()),
        (ArtifactKind::Generic, Artifact::Empty) => Ok(Vec::new()),
        _ => Err(mismatch()),
    }
}

/// Serializes with a 4-space indent and sorted keys, for stable diffs.
fn to_sorted_json(value: &Value) -> ArtifactResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    sort_keys(value).serialize(&mut serializer)?;
    Ok(buf)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sort_keys(v))).collect();
            let mut out = Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn is_compressed(path: &Path) -> bool {
    path.to_string_lossy().ends_with(COMPRESSED_SUFFIX)
}

/// Writes through a temporary sibling file and renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> ArtifactResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    temp_file.persist(path)?;
    Ok(())
}

// --- LOAD ---

/// Reads the artifact stored at `path` back according to `kind`.
pub fn load(kind: ArtifactKind, path: &Path) -> ArtifactResult<Artifact> {
    let bytes = fs::read(path)?;
    match kind {
        ArtifactKind::DataFrame => {
            let raw = if is_compressed(path) {
                lz4_flex::decompress_size_prepended(&bytes)?
            } else {
                bytes
            };
            let text = String::from_utf8(raw).map_err(TableError::from)?;
            Ok(Artifact::Table(Table::from_csv(&text)?))
        }
        ArtifactKind::Json => Ok(Artifact::Json(serde_json::from_slice(&bytes)?)),
        ArtifactKind::Plot => Ok(Artifact::Figure(Figure::from_bytes(bytes))),
        ArtifactKind::Generic => Ok(Artifact::Text(
            String::from_utf8(bytes).map_err(TableError::from)?,
        )),
    }
}
