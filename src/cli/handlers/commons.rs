// src/cli/handlers/commons.rs

// Shared helpers for the command handlers.

use anyhow::{Result, anyhow};
use serde_json::Value;
use std::path::Path;

use crate::core::artifact::Artifact;
use crate::models::Kwargs;

/// Parses `key=value` arguments into keyword arguments.
///
/// Values are read as JSON when they parse (`3`, `true`, `[1,2]`, `"quoted"`)
/// and kept as plain strings otherwise.
pub fn parse_params(params: &[String]) -> Result<Kwargs> {
    let mut kwargs = Kwargs::new();
    for param in params {
        let (key, raw) = param
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected 'key=value', got '{}'.", param))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("Missing key in '{}'.", param));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        kwargs.insert(key.to_string(), value);
    }
    Ok(kwargs)
}

/// Renders an artifact for the terminal.
pub fn render_artifact(artifact: &Artifact, path: &Path) -> String {
    match artifact {
        Artifact::Table(table) => table.to_csv(),
        Artifact::Json(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Artifact::Figure(figure) => format!(
            "figure, {} bytes at {}",
            figure.bytes().len(),
            path.display()
        ),
        Artifact::Text(text) => text.clone(),
        Artifact::Empty => String::new(),
    }
}

/// Shows `path` relative to `root` when it lies below it.
pub fn relative_to<'a>(path: &'a Path, root: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_params_reads_json_values() {
        let kwargs = parse_params(&params(&["n=3", "flag=false", "xs=[1,2]", "name=plain"])).unwrap();
        assert_eq!(kwargs.get("n"), Some(&json!(3)));
        assert_eq!(kwargs.get("flag"), Some(&json!(false)));
        assert_eq!(kwargs.get("xs"), Some(&json!([1, 2])));
        assert_eq!(kwargs.get("name"), Some(&json!("plain")));
    }

    #[test]
    fn test_parse_params_keeps_equals_in_value() {
        let kwargs = parse_params(&params(&["expr=a=b"])).unwrap();
        assert_eq!(kwargs.get("expr"), Some(&json!("a=b")));
    }

    #[test]
    fn test_parse_params_rejects_malformed() {
        assert!(parse_params(&params(&["novalue"])).is_err());
        assert!(parse_params(&params(&["=1"])).is_err());
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to(Path::new("/r/a/b.txt"), Path::new("/r")), "a/b.txt");
        assert_eq!(relative_to(Path::new("/x/b.txt"), Path::new("/r")), "/x/b.txt");
    }
}
