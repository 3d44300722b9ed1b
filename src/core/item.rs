// src/core/item.rs

//! Runnable leaves of a collection and their expansions.
//!
//! An item's expansions are the cartesian product of its axes. They are built
//! lazily: the item keeps only the expansions requested so far, keyed by
//! combination index, so a lookup touching a handful of combinations never
//! builds (or allocates room for) the rest, and repeated lookups return the
//! same expansion.

use crate::constants::QUERY_SEPARATOR;
use crate::core::config_resolver::Configuration;
use crate::core::expansion::{self, Expansion};
use crate::models::{Action, ArtifactKind, AxisMap, Kwargs, Leaf};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building an item or looking up its expansions.
#[derive(Error, Debug)]
pub enum ItemError {
    /// No expansion agrees with the constraints.
    #[error("No expansion of '{location}' matches {constraints}.")]
    ExpansionNotFound {
        /// The item's location.
        location: String,
        /// The constraints, rendered for display.
        constraints: String,
    },
    /// A single expansion was requested but several match.
    #[error("{count} expansions of '{location}' match {constraints}; expected exactly one.")]
    AmbiguousExpansionQuery {
        /// The item's location.
        location: String,
        /// The constraints after defaults were filled in.
        constraints: String,
        /// How many expansions matched.
        count: usize,
    },
    /// The product of the axis lengths does not fit in a `usize`.
    #[error("The axes of '{location}' have more combinations than can be indexed.")]
    TooManyExpansions {
        /// The item's location.
        location: String,
    },
}

type ItemResult<T> = Result<T, ItemError>;

// --- QUERY MATCHING ---

/// How the last segment of a query relates to an item's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// The segment equals the name.
    Complete,
    /// The name starts with the segment.
    Start,
    /// Neither.
    Mismatch,
}

/// How the leading segments of a query relate to an item's collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMatch {
    /// Segment-for-segment equal.
    Complete,
    /// Equal to a strict positional prefix of the collection.
    Start,
    /// Every query segment is a prefix of a collection segment, in order.
    Partial,
    /// None of the above.
    Mismatch,
}

/// The result of comparing a query against one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryMatch {
    /// The query is the item's location.
    pub full: bool,
    /// The last query segment against the item's name.
    pub name: NameMatch,
    /// The other query segments against the item's collection path.
    pub collection: CollectionMatch,
}

/// Splits a query into its path segments, ignoring empty ones.
pub fn parse_query(query: &str) -> Vec<&str> {
    query
        .split(QUERY_SEPARATOR)
        .filter(|part| !part.is_empty())
        .collect()
}

// --- AXES ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisFamily {
    Directory,
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq)]
struct Axis {
    family: AxisFamily,
    key: String,
    values: Vec<Value>,
}

/// Iterates over index tuples of a cartesian product, last position fastest.
///
/// Each position walks its own list of allowed indices, so a constrained lookup
/// only visits the combinations it can match.
#[derive(Debug, Clone)]
pub struct Combinations {
    choices: Vec<Vec<usize>>,
    cursor: Option<Vec<usize>>,
}

impl Combinations {
    /// Product over `choices`; position `i` takes the indices in `choices[i]`.
    pub fn new(choices: Vec<Vec<usize>>) -> Self {
        let cursor = if choices.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; choices.len()])
        };
        Self { choices, cursor }
    }

    /// The full product of axes with the given lengths.
    pub fn full(lengths: impl IntoIterator<Item = usize>) -> Self {
        Self::new(lengths.into_iter().map(|len| (0..len).collect()).collect())
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        let current = cursor
            .iter()
            .zip(&self.choices)
            .filter_map(|(&pos, options)| options.get(pos).copied())
            .collect();

        let mut exhausted = true;
        for (pos, options) in cursor.iter_mut().zip(&self.choices).rev() {
            *pos += 1;
            if *pos < options.len() {
                exhausted = false;
                break;
            }
            *pos = 0;
        }
        if exhausted {
            self.cursor = None;
        }

        Some(current)
    }
}

// --- ITEM ---

/// A leaf of the collection with its fully merged configuration.
#[derive(Debug)]
pub struct Item {
    config: Configuration,
    action: Action,
    subdirs: Vec<String>,
    aliases: Vec<String>,
    suffix: Option<String>,
    directory: PathBuf,
    axes: Vec<Axis>,
    total: usize,
    /// Expansions built so far, by combination index.
    built: RwLock<HashMap<usize, Arc<Expansion>>>,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.action == other.action
            && self.subdirs == other.subdirs
            && self.aliases == other.aliases
            && self.suffix == other.suffix
            && self.directory == other.directory
    }
}

impl Item {
    /// Builds an item from its merged configuration.
    ///
    /// Unless the action is variadic, keys it does not declare are dropped from
    /// the keyword arguments, axes and defaults. A fixed keyword argument then
    /// pins any axis with the same key to that single value.
    ///
    /// Fails if the number of combinations overflows a `usize`.
    pub fn new(mut config: Configuration, leaf: &Leaf, results_dir: &Path) -> ItemResult<Self> {
        if !leaf.action.is_variadic() {
            let action = &leaf.action;
            config.kwargs.retain(|key, _| action.accepts(key));
            config.expansion_defaults.retain(|key, _| action.accepts(key));
            for axes in axis_maps_mut(&mut config) {
                axes.retain(|key, _| action.accepts(key));
            }
        }

        let fixed = config.kwargs.clone();
        for axes in axis_maps_mut(&mut config) {
            for (key, value) in &fixed {
                if let Some(values) = axes.get_mut(key) {
                    *values = vec![value.clone()];
                }
            }
        }

        let axes = collect_axes(&mut config);
        let total = axes
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
            .ok_or_else(|| ItemError::TooManyExpansions {
                location: config.location(),
            })?;

        let collection = config
            .path_components
            .split_last()
            .map_or(&[][..], |(_, rest)| rest);
        let directory = collection
            .iter()
            .fold(results_dir.to_path_buf(), |path, part| path.join(part));

        Ok(Self {
            config,
            action: leaf.action.clone(),
            subdirs: leaf.subdirs.clone(),
            aliases: leaf.aliases.clone(),
            suffix: leaf.suffix.clone(),
            directory,
            axes,
            total,
            built: RwLock::new(HashMap::new()),
        })
    }

    /// Every segment of the item's location.
    pub fn path_components(&self) -> &[String] {
        &self.config.path_components
    }

    /// The path from the collection root, joined with `/`.
    pub fn location(&self) -> String {
        self.config.location()
    }

    /// The last path component.
    pub fn name(&self) -> &str {
        self.config
            .path_components
            .last()
            .map_or("", String::as_str)
    }

    /// Every path component but the last.
    pub fn collection(&self) -> &[String] {
        self.config
            .path_components
            .split_last()
            .map_or(&[][..], |(_, rest)| rest)
    }

    /// The fixed keyword arguments, after sanitization.
    pub fn kwargs(&self) -> &Kwargs {
        &self.config.kwargs
    }

    /// Axes whose values become directories.
    pub fn directory_expansions(&self) -> &AxisMap {
        &self.config.directory_expansions
    }

    /// Axes whose values precede the name in the file stem.
    pub fn prefix_expansions(&self) -> &AxisMap {
        &self.config.prefix_expansions
    }

    /// Axes whose values follow the name in the file stem.
    pub fn suffix_expansions(&self) -> &AxisMap {
        &self.config.suffix_expansions
    }

    /// Values used for unconstrained axes by [`Item::get_expansion`].
    pub fn expansion_defaults(&self) -> &Kwargs {
        &self.config.expansion_defaults
    }

    /// How the item's artifacts are stored.
    pub fn expansion_type(&self) -> ArtifactKind {
        self.config.expansion_type
    }

    /// The callable every expansion runs.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Static directories below the directory axes.
    pub fn subdirs(&self) -> &[String] {
        &self.subdirs
    }

    /// Alternative names that resolve to this item.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The file suffix expansions are stored under.
    pub fn suffix(&self) -> &str {
        self.suffix
            .as_deref()
            .unwrap_or_else(|| self.config.expansion_type.default_suffix())
    }

    /// The results directory joined with the collection path.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The number of expansions, built or not.
    pub fn expansion_count(&self) -> usize {
        self.total
    }

    /// The number of expansions built so far.
    pub fn built_count(&self) -> usize {
        self.built.read().len()
    }

    // --- EXPANSIONS ---

    /// Every expansion, in product order.
    pub fn expansions(&self) -> impl Iterator<Item = Arc<Expansion>> + '_ {
        Combinations::full(self.axes.iter().map(|axis| axis.values.len()))
            .filter_map(move |digits| self.expansion_at(&digits))
    }

    /// The expansions whose keyword arguments agree with every constraint they contain.
    pub fn get_expansions(&self, constraints: &Kwargs) -> ItemResult<Vec<Arc<Expansion>>> {
        let found: Vec<Arc<Expansion>> = match self.constrained_choices(constraints) {
            Some(choices) => Combinations::new(choices)
                .filter_map(|digits| self.expansion_at(&digits))
                .collect(),
            None => Vec::new(),
        };

        if found.is_empty() {
            return Err(ItemError::ExpansionNotFound {
                location: self.location(),
                constraints: describe_kwargs(constraints),
            });
        }
        Ok(found)
    }

    /// The single expansion matching `constraints`.
    ///
    /// Axes left unconstrained fall back to their configured default, if any.
    pub fn get_expansion(&self, constraints: &Kwargs) -> ItemResult<Arc<Expansion>> {
        let mut filled = constraints.clone();
        for axis in &self.axes {
            if filled.contains_key(&axis.key) {
                continue;
            }
            if let Some(default) = self.config.expansion_defaults.get(&axis.key) {
                filled.insert(axis.key.clone(), default.clone());
            }
        }

        let mut found = self.get_expansions(&filled)?;
        let count = found.len();
        match found.pop() {
            Some(single) if count == 1 => Ok(single),
            _ => Err(ItemError::AmbiguousExpansionQuery {
                location: self.location(),
                constraints: describe_kwargs(&filled),
                count,
            }),
        }
    }

    /// Allowed value indices per axis, or `None` if a constraint on a fixed
    /// keyword argument already rules every expansion out.
    fn constrained_choices(&self, constraints: &Kwargs) -> Option<Vec<Vec<usize>>> {
        for (key, wanted) in constraints {
            let is_axis = self.axes.iter().any(|axis| &axis.key == key);
            if is_axis {
                continue;
            }
            if let Some(fixed) = self.config.kwargs.get(key) {
                if fixed != wanted {
                    return None;
                }
            }
        }

        let choices = self
            .axes
            .iter()
            .map(|axis| match constraints.get(&axis.key) {
                Some(wanted) => axis
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| *value == wanted)
                    .map(|(i, _)| i)
                    .collect(),
                None => (0..axis.values.len()).collect(),
            })
            .collect();
        Some(choices)
    }

    /// Returns the expansion for one combination, building it on first access.
    fn expansion_at(&self, digits: &[usize]) -> Option<Arc<Expansion>> {
        let index = digits
            .iter()
            .zip(&self.axes)
            .try_fold(0usize, |acc, (&digit, axis)| {
                acc.checked_mul(axis.values.len())?.checked_add(digit)
            })?;
        if index >= self.total {
            return None;
        }

        if let Some(expansion) = self.built.read().get(&index) {
            return Some(Arc::clone(expansion));
        }
        let mut built = self.built.write();
        let expansion = built
            .entry(index)
            .or_insert_with(|| Arc::new(self.build_expansion(digits)));
        Some(Arc::clone(expansion))
    }

    fn build_expansion(&self, digits: &[usize]) -> Expansion {
        let mut kwargs = self.config.kwargs.clone();
        let mut directories = Vec::new();
        let mut prefixes = Vec::new();
        let mut suffixes = Vec::new();

        for (axis, &digit) in self.axes.iter().zip(digits) {
            let Some(value) = axis.values.get(digit) else {
                continue;
            };
            kwargs.insert(axis.key.clone(), value.clone());
            let family = match axis.family {
                AxisFamily::Directory => &mut directories,
                AxisFamily::Prefix => &mut prefixes,
                AxisFamily::Suffix => &mut suffixes,
            };
            family.push((axis.key.as_str(), value));
        }

        let base = expansion::compose_base(
            &self.directory,
            &directories,
            &self.subdirs,
            &prefixes,
            self.name(),
            &suffixes,
        );

        Expansion::new(
            self.location(),
            kwargs,
            self.action.clone(),
            self.config.expansion_type,
            base,
            self.suffix().to_string(),
        )
    }

    // --- QUERIES ---

    /// Compares `query` with this item's location.
    ///
    /// The last query segment is matched against the name, the others against
    /// the collection path.
    pub fn query_matches(&self, query: &str) -> QueryMatch {
        let parts = parse_query(query);
        let (name, collection) = match parts.split_last() {
            Some((name, collection)) => (*name, collection),
            None => ("", &[][..]),
        };

        QueryMatch {
            full: query == self.location(),
            name: self.name_matches(name),
            collection: self.collection_status(collection),
        }
    }

    /// Compares `query`, read entirely as a collection path, with this item's collection.
    pub fn collection_matches(&self, query: &str) -> CollectionMatch {
        self.collection_status(&parse_query(query))
    }

    /// Returns `true` if `query` is one of the item's aliases.
    pub fn has_alias(&self, query: &str) -> bool {
        self.aliases.iter().any(|alias| alias == query)
    }

    fn name_matches(&self, query: &str) -> NameMatch {
        let name = self.name();
        if name == query {
            NameMatch::Complete
        } else if name.starts_with(query) {
            NameMatch::Start
        } else {
            NameMatch::Mismatch
        }
    }

    fn collection_status(&self, query: &[&str]) -> CollectionMatch {
        let collection = self.collection();

        let positional = query.len() <= collection.len()
            && query.iter().zip(collection).all(|(q, c)| q == c);
        if positional {
            return if query.len() == collection.len() {
                CollectionMatch::Complete
            } else {
                CollectionMatch::Start
            };
        }

        let mut remaining = collection.iter();
        let partial = query
            .iter()
            .all(|q| remaining.any(|segment| segment.starts_with(q)));
        if partial {
            CollectionMatch::Partial
        } else {
            CollectionMatch::Mismatch
        }
    }
}

fn axis_maps_mut(config: &mut Configuration) -> [&mut AxisMap; 3] {
    [
        &mut config.directory_expansions,
        &mut config.prefix_expansions,
        &mut config.suffix_expansions,
    ]
}

/// Flattens the axis maps into one ordered list: directories, prefixes, then
/// suffixes. A key already claimed by an earlier family is removed from the
/// later map.
fn collect_axes(config: &mut Configuration) -> Vec<Axis> {
    let families = [AxisFamily::Directory, AxisFamily::Prefix, AxisFamily::Suffix];

    let mut seen = HashSet::new();
    let mut axes = Vec::new();
    for (family, map) in families.into_iter().zip(axis_maps_mut(config)) {
        map.retain(|key, _| {
            let first = seen.insert(key.clone());
            if !first {
                log::warn!("Axis '{}' is declared more than once; keeping the first.", key);
            }
            first
        });
        axes.extend(map.iter().map(|(key, values)| Axis {
            family,
            key: key.clone(),
            values: values.clone(),
        }));
    }
    axes
}

/// Renders keyword arguments as `{k=v, ...}` for messages.
pub(crate) fn describe_kwargs(kwargs: &Kwargs) -> String {
    let pairs: Vec<String> = kwargs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{{{}}}", pairs.join(", "))
}
