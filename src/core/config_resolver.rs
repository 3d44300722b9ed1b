// src/core/config_resolver.rs

//! Flattens a collection tree into items.
//!
//! Configuration flows top-down: every node starts from a copy of its parent's
//! configuration and overlays its own settings, key by key. Leaves turn the
//! resulting configuration into an [`Item`].

use crate::constants::QUERY_SEPARATOR;
use crate::core::item::{Item, ItemError};
use crate::models::{ArtifactKind, AxisMap, Collection, Kwargs, Leaf, Node, Settings};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while flattening a collection.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Two leaves share a location.
    #[error("Two leaves resolve to the same location '{location}'.")]
    DuplicateItem {
        /// The shared location.
        location: String,
    },
    /// A child key has no path segment (e.g. `""` or `"/"`).
    #[error("Invalid empty path segment '{segment}' below '{parent}'.")]
    EmptySegment {
        /// The offending key.
        segment: String,
        /// The location of the collection holding it.
        parent: String,
    },
    /// A leaf could not become an item.
    #[error(transparent)]
    Item(#[from] ItemError),
}

type ResolverResult<T> = Result<T, ResolverError>;

/// The merged configuration of one node of the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    /// Path segments from the root to this node.
    pub path_components: Vec<String>,
    /// Fixed keyword arguments.
    pub kwargs: Kwargs,
    /// Directory axes.
    pub directory_expansions: AxisMap,
    /// Prefix axes.
    pub prefix_expansions: AxisMap,
    /// Suffix axes.
    pub suffix_expansions: AxisMap,
    /// Values for unconstrained axes in single lookups.
    pub expansion_defaults: Kwargs,
    /// How artifacts are stored.
    pub expansion_type: ArtifactKind,
}

impl Configuration {
    /// The configuration every collection root starts from.
    pub fn root(expansion_type: ArtifactKind) -> Self {
        Self {
            expansion_type,
            ..Default::default()
        }
    }

    /// The path from the root, joined with `/`.
    pub fn location(&self) -> String {
        self.path_components.join("/")
    }
}

// --- PUBLIC API ---

/// Derives a child configuration from `parent`, the child's own `settings` and
/// its key in the parent (`segment`). An empty segment adds no path component.
///
/// The parent is never modified, so configurations already handed to siblings
/// are unaffected by later merges.
pub fn merge(parent: &Configuration, settings: &Settings, segment: &str) -> Configuration {
    let mut config = parent.clone();

    config.path_components.extend(split_segment(segment));

    overlay_kwargs(&mut config.kwargs, &settings.kwargs);
    overlay_axes(&mut config.directory_expansions, &settings.directory_expansions);
    overlay_axes(&mut config.prefix_expansions, &settings.prefix_expansions);
    overlay_axes(&mut config.suffix_expansions, &settings.suffix_expansions);
    overlay_kwargs(&mut config.expansion_defaults, &settings.expansion_defaults);

    if let Some(kind) = settings.expansion_type {
        config.expansion_type = kind;
    }

    config
}

/// Walks `collection` depth-first, in insertion order, and builds one item per leaf.
pub fn parse_collection(
    collection: &Collection,
    root: &Configuration,
    results_dir: &Path,
) -> ResolverResult<Vec<Item>> {
    let mut items = Vec::new();
    let config = merge(root, &collection.settings, "");
    collect_children(collection, &config, results_dir, &mut items)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        let location = item.location();
        if !seen.insert(location.clone()) {
            return Err(ResolverError::DuplicateItem { location });
        }
    }

    log::debug!("Parsed collection into {} item(s).", items.len());
    Ok(items)
}

// --- TREE WALK ---

fn collect_children(
    collection: &Collection,
    config: &Configuration,
    results_dir: &Path,
    items: &mut Vec<Item>,
) -> ResolverResult<()> {
    for (key, node) in &collection.children {
        if split_segment(key).next().is_none() {
            return Err(ResolverError::EmptySegment {
                segment: key.clone(),
                parent: config.location(),
            });
        }

        match node {
            Node::Leaf(leaf) => items.push(build_leaf(leaf, config, key, results_dir)?),
            Node::Branch(branch) => {
                let child_config = merge(config, &branch.settings, key);
                collect_children(branch, &child_config, results_dir, items)?;
            }
        }
    }
    Ok(())
}

fn build_leaf(
    leaf: &Leaf,
    parent: &Configuration,
    key: &str,
    results_dir: &Path,
) -> ResolverResult<Item> {
    let config = merge(parent, &leaf.settings, key);
    Ok(Item::new(config, leaf, results_dir)?)
}

fn split_segment(segment: &str) -> impl Iterator<Item = String> + '_ {
    segment
        .split(QUERY_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

fn overlay_kwargs(target: &mut Kwargs, source: &Kwargs) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

fn overlay_axes(target: &mut AxisMap, source: &AxisMap) {
    for (key, values) in source {
        // `insert` keeps an existing key at its inherited position.
        target.insert(key.clone(), values.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;
    use crate::models::{Action, Configure};
    use serde_json::{Value, json};

    fn variadic() -> Action {
        Action::variadic(|_| Ok(Artifact::Empty))
    }

    fn parse(collection: &Collection) -> Vec<Item> {
        parse_collection(
            collection,
            &Configuration::root(ArtifactKind::Generic),
            Path::new("results"),
        )
        .unwrap()
    }

    #[test]
    fn test_bare_action_becomes_leaf() {
        let collection = Collection::new().child("test", variadic());
        let items = parse(&collection);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path_components(), &["test".to_string()]);
    }

    #[test]
    fn test_nested_items_in_declaration_order() {
        let collection = Collection::new().child(
            "test",
            Collection::new()
                .child("subtest", variadic())
                .child("subtest2", variadic()),
        );
        let locations: Vec<String> = parse(&collection).iter().map(Item::location).collect();

        assert_eq!(locations, vec!["test/subtest", "test/subtest2"]);
    }

    #[test]
    fn test_inherited_kwargs_are_applied() {
        let collection = Collection::new().child(
            "test",
            Collection::new()
                .kwarg("a", 1)
                .child("leaf", Leaf::new(variadic()).kwarg("b", 2))
                .child(
                    "sub",
                    Collection::new().child("override", Leaf::new(variadic()).kwarg("a", 3).kwarg("b", 2)),
                ),
        );
        let items = parse(&collection);

        let expected_first: Kwargs = [("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
            .into_iter()
            .collect();
        let expected_second: Kwargs = [("a".to_string(), json!(3)), ("b".to_string(), json!(2))]
            .into_iter()
            .collect();
        assert_eq!(items[0].kwargs(), &expected_first);
        assert_eq!(items[1].kwargs(), &expected_second);
    }

    #[test]
    fn test_child_axis_replaces_parent_axis_entirely() {
        let parent = Configuration::root(ArtifactKind::Generic);
        let branch = Collection::new()
            .prefix_expansion("p", [1, 2])
            .prefix_expansion("q", [5]);
        let branch_config = merge(&parent, &branch.settings, "branch");

        let leaf = Leaf::new(variadic()).prefix_expansion("p", [3]);
        let leaf_config = merge(&branch_config, &leaf.settings, "leaf");

        let keys: Vec<&String> = leaf_config.prefix_expansions.keys().collect();
        assert_eq!(keys, vec!["p", "q"]);
        assert_eq!(leaf_config.prefix_expansions.get("p"), Some(&vec![Value::from(3)]));
        // The branch configuration is untouched by the leaf merge.
        assert_eq!(
            branch_config.prefix_expansions.get("p"),
            Some(&vec![Value::from(1), Value::from(2)])
        );
        assert_eq!(leaf_config.path_components, vec!["branch", "leaf"]);
    }

    #[test]
    fn test_expansion_type_is_inherited_and_overridable() {
        let collection = Collection::new()
            .expansion_type(ArtifactKind::Json)
            .child("inherits", variadic())
            .child(
                "overrides",
                Leaf::new(variadic()).expansion_type(ArtifactKind::DataFrame),
            );
        let items = parse(&collection);

        assert_eq!(items[0].expansion_type(), ArtifactKind::Json);
        assert_eq!(items[1].expansion_type(), ArtifactKind::DataFrame);
    }

    #[test]
    fn test_slash_keys_split_into_segments() {
        let collection = Collection::new().child("questions/1-winners/across", variadic());
        let items = parse(&collection);

        assert_eq!(items[0].path_components().len(), 3);
        assert_eq!(items[0].name(), "across");
    }

    #[test]
    fn test_duplicate_locations_are_rejected() {
        let collection = Collection::new()
            .child("a/b", variadic())
            .child("a", Collection::new().child("b", variadic()));

        let err = parse_collection(
            &collection,
            &Configuration::root(ArtifactKind::Generic),
            Path::new("results"),
        )
        .unwrap_err();
        assert!(matches!(err, ResolverError::DuplicateItem { location } if location == "a/b"));
    }

    #[test]
    fn test_empty_segment_is_rejected() {
        let collection = Collection::new().child("/", variadic());
        let err = parse_collection(
            &collection,
            &Configuration::root(ArtifactKind::Generic),
            Path::new("results"),
        )
        .unwrap_err();
        assert!(matches!(err, ResolverError::EmptySegment { .. }));
    }
}
