// src/models.rs

use crate::constants::DEFAULT_RESULTS_DIR;
use crate::core::artifact::Artifact;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// --- ARGUMENT MODELS ---

/// Keyword arguments handed to an action, keyed by parameter name.
pub type Kwargs = BTreeMap<String, Value>;

/// One family of expansion axes: parameter name -> candidate values.
/// Key order is significant, it fixes how values are composed into paths.
pub type AxisMap = IndexMap<String, Vec<Value>>;

// --- ARTIFACT KINDS ---

/// How an item persists the value its action returns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// A rendered figure, written as-is.
    Plot,
    /// A table, written as CSV without an index column.
    DataFrame,
    /// Any JSON value, written pretty-printed with sorted keys.
    Json,
    /// Plain text (or an empty marker file).
    #[default]
    Generic,
}

impl ArtifactKind {
    /// Every file suffix this kind may be stored under. The first one is the default.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            Self::Plot => &[".pdf", ".png", ".eps", ".svg"],
            Self::DataFrame => &[".csv", ".csv.lz4"],
            Self::Json => &[".json"],
            Self::Generic => &[".txt"],
        }
    }

    /// The suffix used when an item does not override it.
    pub fn default_suffix(self) -> &'static str {
        self.suffixes().first().copied().unwrap_or(".txt")
    }

    /// The lowercase name used in configuration files and messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            Self::DataFrame => "dataframe",
            Self::Json => "json",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- RUNNER OPTIONS ---

/// Runner-wide options, read from `crun.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerOptions {
    /// Where artifacts are stored. `~` and environment variables are expanded.
    pub results_dir: String,
    /// The artifact kind of items that do not set one.
    pub expansion_type: ArtifactKind,
    /// Run every matching expansion instead of only the first.
    pub run_all_expansions: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            results_dir: DEFAULT_RESULTS_DIR.to_string(),
            expansion_type: ArtifactKind::default(),
            run_all_expansions: false,
        }
    }
}

// --- ACTIONS ---

/// Signature of the function wrapped by an [`Action`].
pub type ActionFn = dyn Fn(&Kwargs) -> anyhow::Result<Artifact> + Send + Sync;

/// The callable at a leaf of a collection, together with the names of the
/// keyword arguments it accepts.
///
/// Parameters are declared up front: inherited configuration is filtered down to
/// them before the action is ever called. A variadic action accepts everything.
#[derive(Clone)]
pub struct Action {
    params: Option<Vec<String>>,
    func: Arc<ActionFn>,
}

impl Action {
    /// Wraps `func`, which accepts exactly the keyword arguments named in `params`.
    pub fn new<I, S, F>(params: I, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Kwargs) -> anyhow::Result<Artifact> + Send + Sync + 'static,
    {
        Self {
            params: Some(params.into_iter().map(Into::into).collect()),
            func: Arc::new(func),
        }
    }

    /// Wraps `func`, which accepts arbitrary keyword arguments.
    pub fn variadic<F>(func: F) -> Self
    where
        F: Fn(&Kwargs) -> anyhow::Result<Artifact> + Send + Sync + 'static,
    {
        Self {
            params: None,
            func: Arc::new(func),
        }
    }

    /// The declared parameter names, or `None` for a variadic action.
    pub fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    /// Returns `true` if the action takes a catch-all set of keyword arguments.
    pub fn is_variadic(&self) -> bool {
        self.params.is_none()
    }

    /// Returns `true` if `key` may be passed to this action.
    pub fn accepts(&self, key: &str) -> bool {
        match &self.params {
            Some(params) => params.iter().any(|p| p == key),
            None => true,
        }
    }

    /// Invokes the wrapped function.
    pub fn call(&self, kwargs: &Kwargs) -> anyhow::Result<Artifact> {
        (self.func)(kwargs)
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
            && self.params == other.params
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(params) => write!(f, "Action({})", params.join(", ")),
            None => f.write_str("Action(**kwargs)"),
        }
    }
}

// --- COLLECTION MODELS ---
// What callers build in code and hand to the runner.

/// The inheritable part of a node's configuration.
///
/// Every map is shallow-merged into the configuration of the node's
/// descendants: a descendant's key replaces the inherited one entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Fixed keyword arguments.
    pub kwargs: Kwargs,
    /// Axes whose values become directories.
    pub directory_expansions: AxisMap,
    /// Axes whose values precede the name in the file stem.
    pub prefix_expansions: AxisMap,
    /// Axes whose values follow the name in the file stem.
    pub suffix_expansions: AxisMap,
    /// Values used for unconstrained axes when a single expansion is requested.
    pub expansion_defaults: Kwargs,
    /// The artifact kind, if this node sets one.
    pub expansion_type: Option<ArtifactKind>,
}

/// Builder methods shared by branches and leaves.
pub trait Configure: Sized {
    /// Mutable access to the node's inheritable settings.
    fn settings_mut(&mut self) -> &mut Settings;

    /// Sets a fixed keyword argument.
    fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings_mut().kwargs.insert(key.into(), value.into());
        self
    }

    /// Sets several fixed keyword arguments at once.
    fn kwargs(mut self, kwargs: Kwargs) -> Self {
        self.settings_mut().kwargs.extend(kwargs);
        self
    }

    /// Expands `key` over `values`, one output directory per value.
    fn directory_expansion<V: Into<Value>>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.settings_mut().directory_expansions.insert(key.into(), values);
        self
    }

    /// Expands `key` over `values`, placed before the item name in the file stem.
    fn prefix_expansion<V: Into<Value>>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.settings_mut().prefix_expansions.insert(key.into(), values);
        self
    }

    /// Expands `key` over `values`, placed after the item name in the file stem.
    fn suffix_expansion<V: Into<Value>>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.settings_mut().suffix_expansions.insert(key.into(), values);
        self
    }

    /// Sets the value an axis takes when a lookup leaves it unconstrained.
    fn expansion_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings_mut()
            .expansion_defaults
            .insert(key.into(), value.into());
        self
    }

    /// Sets the artifact kind for this node and its descendants.
    fn expansion_type(mut self, kind: ArtifactKind) -> Self {
        self.settings_mut().expansion_type = Some(kind);
        self
    }
}

/// A runnable node: an action plus leaf-only options.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub(crate) action: Action,
    pub(crate) settings: Settings,
    pub(crate) subdirs: Vec<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) suffix: Option<String>,
}

impl Leaf {
    /// Creates a leaf that runs `action`.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            settings: Settings::default(),
            subdirs: Vec::new(),
            aliases: Vec::new(),
            suffix: None,
        }
    }

    /// Adds a static directory below the directory expansions.
    pub fn subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdirs.push(subdir.into());
        self
    }

    /// Adds an alternative name that resolves to this leaf exactly.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Overrides the file suffix (e.g. `".png"` for a plot).
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl Configure for Leaf {
    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

/// A branch of the tree. Its keys become path segments of its descendants.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub(crate) settings: Settings,
    pub(crate) children: IndexMap<String, Node>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child under `name`. A name containing `/` is split into nested segments.
    pub fn child(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.children.insert(name.into(), node.into());
        self
    }

    /// Returns `true` if the collection has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Configure for Collection {
    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

/// A node of a collection tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A runnable action.
    Leaf(Leaf),
    /// A nested collection.
    Branch(Collection),
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<Collection> for Node {
    fn from(collection: Collection) -> Self {
        Self::Branch(collection)
    }
}

impl From<Action> for Node {
    fn from(action: Action) -> Self {
        Self::Leaf(Leaf::new(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Action {
        Action::new(["a"], |_| Ok(Artifact::Empty))
    }

    #[test]
    fn test_action_accepts_declared_params_only() {
        let action = noop();
        assert!(action.accepts("a"));
        assert!(!action.accepts("b"));
        assert!(Action::variadic(|_| Ok(Artifact::Empty)).accepts("anything"));
    }

    #[test]
    fn test_action_equality_is_identity() {
        let action = noop();
        let clone = action.clone();
        assert_eq!(action, clone);
        assert_ne!(action, noop());
    }

    #[test]
    fn test_builder_collects_settings() {
        let leaf = Leaf::new(noop())
            .kwarg("a", 1)
            .prefix_expansion("p", [1, 2])
            .expansion_type(ArtifactKind::Json)
            .alias("short");

        assert_eq!(leaf.settings.kwargs.get("a"), Some(&Value::from(1)));
        assert_eq!(
            leaf.settings.prefix_expansions.get("p"),
            Some(&vec![Value::from(1), Value::from(2)])
        );
        assert_eq!(leaf.settings.expansion_type, Some(ArtifactKind::Json));
        assert_eq!(leaf.aliases, vec!["short".to_string()]);
    }

    #[test]
    fn test_artifact_kind_default_suffixes() {
        assert_eq!(ArtifactKind::Plot.default_suffix(), ".pdf");
        assert_eq!(ArtifactKind::DataFrame.default_suffix(), ".csv");
        assert_eq!(ArtifactKind::Json.default_suffix(), ".json");
        assert_eq!(ArtifactKind::Generic.default_suffix(), ".txt");
    }

    #[test]
    fn test_artifact_kind_parses_from_toml_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: ArtifactKind,
        }
        let parsed: Wrapper = toml::from_str("kind = \"dataframe\"").unwrap();
        assert_eq!(parsed.kind, ArtifactKind::DataFrame);
    }
}
