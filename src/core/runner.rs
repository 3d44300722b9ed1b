// src/core/runner.rs

//! The runner owns the items of a collection and the results directory they
//! write to. It resolves queries to items, runs expansions, serves stored
//! artifacts, and sweeps files no expansion accounts for.
//!
//! An artifact on disk is the only record that an expansion has run: `get`
//! returns the stored file whenever it exists, even if the action has changed
//! since. Pass `rerun` to recompute.

use crate::core::artifact::Artifact;
use crate::core::config_resolver::{self, Configuration, ResolverError};
use crate::core::expansion::{Expansion, ExpansionError};
use crate::core::item::{CollectionMatch, Item, ItemError, NameMatch, QueryMatch};
use crate::core::paths::{self, PathError};
use crate::models::{Collection, Kwargs, RunnerOptions};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

/// Everything the runner can fail with.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Several items fit the query equally well.
    #[error("Query '{query}' is ambiguous. Candidates: {}", .candidates.join(", "))]
    AmbiguousQuery {
        /// The query as given.
        query: String,
        /// Locations of the items that fit.
        candidates: Vec<String>,
    },
    /// No item fits the query.
    #[error("No item matches '{query}'.")]
    ItemNotFound {
        /// The query as given.
        query: String,
    },
    /// An expansion lookup failed.
    #[error(transparent)]
    Item(#[from] ItemError),
    /// The collection could not be flattened into items.
    #[error(transparent)]
    Resolve(#[from] ResolverError),
    /// An action failed, or its artifact could not be stored or read.
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    /// The results directory could not be resolved or created.
    #[error(transparent)]
    Path(#[from] PathError),
    /// A filesystem operation failed.
    #[error("Filesystem Error: {0}")]
    Io(#[from] io::Error),
    /// The results directory could not be traversed.
    #[error("Could not walk the results directory: {0}")]
    Walk(#[from] walkdir::Error),
}

type RunnerResult<T> = Result<T, RunnerError>;

/// What to run, and with which arguments.
///
/// `constraints` select expansions and are also passed to the action, so a key
/// that is not an axis acts as a plain override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRequest {
    /// Expansion filters, also passed to the action.
    pub constraints: Kwargs,
    /// Run every matching expansion rather than only the first.
    pub all_expansions: bool,
}

impl RunRequest {
    /// A request with no constraints that runs the first expansion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint.
    pub fn constraint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    /// Requests every matching expansion.
    pub fn all_expansions(mut self) -> Self {
        self.all_expansions = true;
        self
    }
}

/// The outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Artifact paths written, in run order.
    pub written: Vec<PathBuf>,
    /// Locations of items skipped because no expansion matched.
    pub skipped: Vec<String>,
    /// The artifact produced last.
    pub last: Option<Artifact>,
}

/// The outcome of a clean.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Files deleted, sorted.
    pub removed_files: Vec<PathBuf>,
    /// Directories deleted because they became empty.
    pub removed_dirs: Vec<PathBuf>,
}

/// Runs the items of a collection against a results directory.
#[derive(Debug)]
pub struct Runner {
    directory: PathBuf,
    items: Vec<Item>,
    options: RunnerOptions,
}

impl Runner {
    /// Builds a runner writing to `directory`, which is created if missing.
    pub fn new(collection: &Collection, directory: impl AsRef<Path>) -> RunnerResult<Self> {
        Self::build(collection, directory.as_ref(), RunnerOptions::default())
    }

    /// Builds a runner from options; `results_dir` is expanded first.
    pub fn with_options(collection: &Collection, options: RunnerOptions) -> RunnerResult<Self> {
        let directory = paths::expand_path_template(&options.results_dir)?;
        Self::build(collection, &directory, options)
    }

    fn build(collection: &Collection, directory: &Path, options: RunnerOptions) -> RunnerResult<Self> {
        let directory = paths::prepare_results_dir(directory)?;
        let root = Configuration::root(options.expansion_type);
        let items = config_resolver::parse_collection(collection, &root, &directory)?;
        debug!(
            "Runner ready with {} item(s) in '{}'",
            items.len(),
            directory.display()
        );
        Ok(Self {
            directory,
            items,
            options,
        })
    }

    /// The canonical results directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Every item, in depth-first declaration order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    // --- QUERY RESOLUTION ---

    /// Resolves `query` to a single item.
    ///
    /// Tried in order: the exact location, an exact alias, a unique complete
    /// name. Otherwise the items whose name matches completely (or, failing
    /// that, whose name starts with the query's last segment) are ranked by how
    /// well their collection matches, and the first rank holding a single item
    /// wins.
    pub fn get_item(&self, query: &str) -> RunnerResult<&Item> {
        let results: Vec<(&Item, QueryMatch)> = self
            .items
            .iter()
            .map(|item| (item, item.query_matches(query)))
            .collect();

        if let [(item, _)] = select(&results, |m| m.full).as_slice() {
            return Ok(*item);
        }

        let aliased: Vec<&Item> = self.items.iter().filter(|i| i.has_alias(query)).collect();
        if let [item] = aliased.as_slice() {
            return Ok(*item);
        }

        let complete = select(&results, |m| m.name == NameMatch::Complete);
        if let [(item, _)] = complete.as_slice() {
            return Ok(*item);
        }

        let candidates = if complete.is_empty() {
            select(&results, |m| m.name == NameMatch::Start)
        } else {
            complete
        };

        for tier in [
            CollectionMatch::Complete,
            CollectionMatch::Start,
            CollectionMatch::Partial,
        ] {
            if let [(item, _)] = select(&candidates, |m| m.collection == tier).as_slice() {
                debug!("Resolved '{}' to '{}' ({:?})", query, item.location(), tier);
                return Ok(*item);
            }
        }

        let plausible: Vec<String> = candidates
            .iter()
            .filter(|(_, m)| m.collection != CollectionMatch::Mismatch)
            .map(|(item, _)| item.location())
            .collect();

        if plausible.is_empty() {
            Err(RunnerError::ItemNotFound {
                query: query.to_string(),
            })
        } else {
            Err(RunnerError::AmbiguousQuery {
                query: query.to_string(),
                candidates: plausible,
            })
        }
    }

    /// Every item whose collection starts with `query`, read as a collection path.
    pub fn get_items_in_collection(&self, query: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| {
                matches!(
                    item.collection_matches(query),
                    CollectionMatch::Complete | CollectionMatch::Start
                )
            })
            .collect()
    }

    // --- RUNNING ---

    /// Runs the item `query` resolves to.
    ///
    /// Fails if no expansion of the item matches the request's constraints.
    pub fn run(&self, query: &str, request: &RunRequest) -> RunnerResult<RunSummary> {
        let item = self.get_item(query)?;
        let mut summary = RunSummary::default();
        self.run_item(item, request, false, &mut summary)?;
        Ok(summary)
    }

    /// Runs every item.
    pub fn run_all(&self, request: &RunRequest) -> RunnerResult<RunSummary> {
        self.run_items(self.items.iter(), request)
    }

    /// Runs every item in the collection `query` names.
    pub fn run_subcollection(&self, query: &str, request: &RunRequest) -> RunnerResult<RunSummary> {
        self.run_items(self.get_items_in_collection(query).into_iter(), request)
    }

    fn run_items<'a>(
        &'a self,
        items: impl Iterator<Item = &'a Item>,
        request: &RunRequest,
    ) -> RunnerResult<RunSummary> {
        let mut summary = RunSummary::default();
        for item in items {
            self.run_item(item, request, true, &mut summary)?;
        }
        Ok(summary)
    }

    fn run_item(
        &self,
        item: &Item,
        request: &RunRequest,
        skip_unmatched: bool,
        summary: &mut RunSummary,
    ) -> RunnerResult<()> {
        let expansions = match item.get_expansions(&request.constraints) {
            Ok(expansions) => expansions,
            Err(ItemError::ExpansionNotFound { .. }) if skip_unmatched => {
                debug!("Skipping '{}': no expansion matches", item.location());
                summary.skipped.push(item.location());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let limit = if request.all_expansions || self.options.run_all_expansions {
            expansions.len()
        } else {
            1
        };

        for expansion in expansions.into_iter().take(limit) {
            let artifact = expansion.run(&request.constraints)?;
            summary.written.push(expansion.path());
            summary.last = Some(artifact);
        }
        Ok(())
    }

    // --- CACHED ACCESS ---

    /// Returns the stored artifact of a single expansion, running it first if
    /// nothing is stored yet. `rerun` discards the stored artifact.
    pub fn get(&self, query: &str, rerun: bool, constraints: &Kwargs) -> RunnerResult<Artifact> {
        let expansion = self.expansion(query, constraints)?;

        if rerun {
            expansion.remove()?;
        }

        if expansion.exists() {
            debug!("cache hit: {}", expansion.path().display());
        } else {
            debug!("cache miss: {}", expansion.path().display());
            expansion.run(constraints)?;
        }

        Ok(expansion.result()?)
    }

    /// Where the expansion `query` and `constraints` select is stored. Nothing is run.
    pub fn path(&self, query: &str, constraints: &Kwargs) -> RunnerResult<PathBuf> {
        Ok(self.expansion(query, constraints)?.path())
    }

    /// The single expansion `query` and `constraints` select.
    pub fn expansion(&self, query: &str, constraints: &Kwargs) -> RunnerResult<Arc<Expansion>> {
        Ok(self.get_item(query)?.get_expansion(constraints)?)
    }

    // --- CLEANING ---

    /// Every path an expansion may be stored under.
    fn live_paths(&self) -> HashSet<PathBuf> {
        self.items
            .iter()
            .flat_map(|item| item.expansions())
            .flat_map(|expansion| expansion.paths())
            .collect()
    }

    /// Files under the results directory that no expansion accounts for, sorted.
    pub fn clean_plan(&self) -> RunnerResult<Vec<PathBuf>> {
        let live = self.live_paths();
        let mut stale = Vec::new();

        for entry in WalkDir::new(&self.directory) {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            if !live.contains(entry.path()) {
                stale.push(entry.into_path());
            }
        }

        stale.sort();
        Ok(stale)
    }

    /// Deletes the files [`Runner::clean_plan`] lists, then every directory left
    /// empty by that. The results directory itself is kept.
    pub fn clean(&self) -> RunnerResult<CleanReport> {
        let mut report = CleanReport::default();

        for path in self.clean_plan()? {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("'{}' vanished before it could be removed", path.display());
                }
                Err(e) => return Err(e.into()),
            }
            self.prune_empty_parents(&path, &mut report)?;
            report.removed_files.push(path);
        }

        info!(
            "Removed {} file(s) and {} directory(ies) from '{}'",
            report.removed_files.len(),
            report.removed_dirs.len(),
            self.directory.display()
        );
        Ok(report)
    }

    fn prune_empty_parents(&self, path: &Path, report: &mut CleanReport) -> RunnerResult<()> {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.directory || !dir.starts_with(&self.directory) {
                break;
            }
            if fs::read_dir(dir)?.next().is_some() {
                break;
            }
            fs::remove_dir(dir)?;
            report.removed_dirs.push(dir.to_path_buf());
            current = dir.parent();
        }
        Ok(())
    }
}

fn select<'a, F>(results: &[(&'a Item, QueryMatch)], predicate: F) -> Vec<(&'a Item, QueryMatch)>
where
    F: Fn(&QueryMatch) -> bool,
{
    results
        .iter()
        .filter(|(_, m)| predicate(m))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{Cell, Table};
    use crate::models::{Action, ArtifactKind, Configure, Leaf};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn empty() -> Action {
        Action::variadic(|_| Ok(Artifact::Empty))
    }

    fn counting(calls: &Arc<AtomicUsize>) -> Action {
        let calls = Arc::clone(calls);
        Action::new(["p"], move |kwargs| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(Artifact::Json(json!({ "call": n, "p": kwargs.get("p").cloned() })))
        })
    }

    fn kwargs(pairs: &[(&str, Value)]) -> Kwargs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn locations(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.location()).collect()
    }

    #[test]
    fn test_new_creates_results_directory() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("deep").join("results");

        let runner = Runner::new(&Collection::new(), &target).unwrap();

        assert!(target.is_dir());
        assert!(runner.items().is_empty());
        // Idempotent.
        Runner::new(&Collection::new(), &target).unwrap();
    }

    #[test]
    fn test_with_options_uses_kind_and_dir() {
        let tmp = TempDir::new().unwrap();
        let options = RunnerOptions {
            results_dir: tmp.path().join("out").display().to_string(),
            expansion_type: ArtifactKind::Json,
            run_all_expansions: false,
        };
        let collection = Collection::new().child("x", empty());

        let runner = Runner::with_options(&collection, options).unwrap();

        assert!(tmp.path().join("out").is_dir());
        assert_eq!(runner.items()[0].expansion_type(), ArtifactKind::Json);
    }

    #[test]
    fn test_get_item_resolution_tiers() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::new()
            .child("a/b/c", empty())
            .child("a/d/c", empty())
            .child("c", empty())
            .child("x/unique", empty());
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        // A full location wins even though the name is shared.
        assert_eq!(runner.get_item("c").unwrap().location(), "c");
        assert_eq!(runner.get_item("b/c").unwrap().location(), "a/b/c");
        assert_eq!(runner.get_item("a/d/c").unwrap().location(), "a/d/c");
        assert_eq!(runner.get_item("unique").unwrap().location(), "x/unique");
        // Name prefix only, but unambiguous.
        assert_eq!(runner.get_item("uni").unwrap().location(), "x/unique");
    }

    #[test]
    fn test_get_item_ambiguous_and_missing() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::new()
            .child("a/b/c", empty())
            .child("a/d/c", empty());
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        match runner.get_item("c").unwrap_err() {
            RunnerError::AmbiguousQuery { candidates, .. } => {
                assert_eq!(candidates, vec!["a/b/c", "a/d/c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            runner.get_item("zzz").unwrap_err(),
            RunnerError::ItemNotFound { .. }
        ));
        assert!(matches!(
            runner.get_item("q/c").unwrap_err(),
            RunnerError::ItemNotFound { .. }
        ));
    }

    #[test]
    fn test_get_item_by_alias() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::new()
            .child("long/path/name", Leaf::new(empty()).alias("short"))
            .child("other", empty());
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        assert_eq!(runner.get_item("short").unwrap().location(), "long/path/name");
    }

    #[test]
    fn test_get_items_in_collection() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::new()
            .child("a/b/one", empty())
            .child("a/b/two", empty())
            .child("a/three", empty())
            .child("z/four", empty());
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        assert_eq!(
            locations(&runner.get_items_in_collection("a")),
            vec!["a/b/one", "a/b/two", "a/three"]
        );
        assert_eq!(
            locations(&runner.get_items_in_collection("a/b")),
            vec!["a/b/one", "a/b/two"]
        );
        assert_eq!(runner.get_items_in_collection("").len(), 4);
        assert!(runner.get_items_in_collection("b").is_empty());
    }

    #[test]
    fn test_run_first_expansion_by_default() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let collection = Collection::new().child(
            "item",
            Leaf::new(counting(&calls))
                .prefix_expansion("p", [1, 2, 3])
                .expansion_type(ArtifactKind::Json),
        );
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        let summary = runner.run("item", &RunRequest::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.written, vec![runner.directory().join("1-item.json")]);

        let summary = runner.run("item", &RunRequest::new().all_expansions()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(summary.written.len(), 3);
    }

    #[test]
    fn test_run_all_skips_unmatched_items() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let collection = Collection::new()
            .expansion_type(ArtifactKind::Json)
            .child("with", Leaf::new(counting(&calls)).prefix_expansion("p", [1, 2]))
            .child("fixed", Leaf::new(counting(&calls)).kwarg("p", 9));
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        let request = RunRequest::new().constraint("p", 2).all_expansions();
        let summary = runner.run_all(&request).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.skipped, vec!["fixed".to_string()]);
        assert_eq!(
            summary.last,
            Some(Artifact::Json(json!({"call": 0, "p": 2})))
        );

        // A single run propagates the miss.
        let err = runner.run("fixed", &request).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Item(ItemError::ExpansionNotFound { .. })
        ));
    }

    #[test]
    fn test_run_all_expansions_option() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let collection = Collection::new().child(
            "sub/item",
            Leaf::new(counting(&calls)).suffix_expansion("p", [1, 2]),
        );
        let options = RunnerOptions {
            results_dir: tmp.path().display().to_string(),
            expansion_type: ArtifactKind::Json,
            run_all_expansions: true,
        };
        let runner = Runner::with_options(&collection, options).unwrap();

        runner.run_subcollection("sub", &RunRequest::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_get_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let collection = Collection::new().child(
            "cached",
            Leaf::new(counting(&calls)).expansion_type(ArtifactKind::Json),
        );
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        let first = runner.get("cached", false, &Kwargs::new()).unwrap();
        let second = runner.get("cached", false, &Kwargs::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);

        let third = runner.get("cached", true, &Kwargs::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(third, Artifact::Json(json!({"call": 1, "p": null})));
    }

    #[test]
    fn test_get_requires_single_expansion() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let collection = Collection::new().child(
            "multi",
            Leaf::new(counting(&calls))
                .prefix_expansion("p", [1, 2])
                .expansion_type(ArtifactKind::Json),
        );
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        let err = runner.get("multi", false, &Kwargs::new()).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Item(ItemError::AmbiguousExpansionQuery { .. })
        ));

        let value = runner
            .get("multi", false, &kwargs(&[("p", json!(2))]))
            .unwrap();
        assert_eq!(value, Artifact::Json(json!({"call": 0, "p": 2})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_path_does_not_run() {
        let tmp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let collection = Collection::new().child(
            "a/item",
            Leaf::new(counting(&calls)).directory_expansion("p", ["x"]),
        );
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        let path = runner.path("item", &Kwargs::new()).unwrap();
        assert_eq!(path, runner.directory().join("a").join("x").join("item.txt"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_dataframe_round_trip() {
        let tmp = TempDir::new().unwrap();
        let table = Table::new(["X", "Y"])
            .with_row([Cell::from(1), Cell::from(2.5)])
            .unwrap()
            .with_row([Cell::from(3), Cell::from(4.0)])
            .unwrap();
        let produced = table.clone();
        let collection = Collection::new().child(
            "frame",
            Leaf::new(Action::new(Vec::<String>::new(), move |_| {
                Ok(Artifact::Table(produced.clone()))
            }))
            .expansion_type(ArtifactKind::DataFrame),
        );
        let runner = Runner::new(&collection, tmp.path()).unwrap();

        runner.run("frame", &RunRequest::new()).unwrap();
        let stored = runner.get("frame", false, &Kwargs::new()).unwrap();

        assert_eq!(stored.as_table(), Some(&table));
    }

    #[test]
    fn test_clean_keeps_exactly_the_live_set() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::new()
            .child(
                "plots/figure",
                Leaf::new(Action::variadic(|_| {
                    Ok(Artifact::Figure(crate::core::artifact::Figure::from_svg("<svg/>")))
                }))
                .expansion_type(ArtifactKind::Plot)
                .suffix(".svg")
                .prefix_expansion("p", [1, 2]),
            )
            .child("notes", empty());
        let runner = Runner::new(&collection, tmp.path()).unwrap();
        runner.run_all(&RunRequest::new().all_expansions()).unwrap();

        let root = runner.directory().to_path_buf();
        // Another suffix of a live expansion survives.
        fs::write(root.join("plots").join("1-figure.png"), b"png").unwrap();
        // Stale files.
        fs::write(root.join("stray.txt"), b"x").unwrap();
        fs::write(root.join("plots").join("3-figure.svg"), b"x").unwrap();
        fs::create_dir_all(root.join("gone").join("deeper")).unwrap();
        fs::write(root.join("gone").join("deeper").join("old.csv"), b"x").unwrap();

        let plan = runner.clean_plan().unwrap();
        assert_eq!(plan.len(), 3);
        assert!(root.join("stray.txt").exists(), "dry run must not delete");

        let report = runner.clean().unwrap();
        assert_eq!(report.removed_files, plan);
        assert_eq!(
            report.removed_dirs,
            vec![root.join("gone").join("deeper"), root.join("gone")]
        );

        let remaining: HashSet<PathBuf> = WalkDir::new(&root)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        let expected: HashSet<PathBuf> = [
            root.join("plots").join("1-figure.svg"),
            root.join("plots").join("2-figure.svg"),
            root.join("plots").join("1-figure.png"),
            root.join("notes.txt"),
        ]
        .into_iter()
        .collect();
        assert_eq!(remaining, expected);
        assert!(root.is_dir());
    }

    #[test]
    fn test_clean_on_empty_collection_keeps_root() {
        let tmp = TempDir::new().unwrap();
        let runner = Runner::new(&Collection::new(), tmp.path().join("r")).unwrap();
        fs::write(runner.directory().join("leftover.txt"), b"x").unwrap();

        let report = runner.clean().unwrap();

        assert_eq!(report.removed_files.len(), 1);
        assert!(report.removed_dirs.is_empty());
        assert!(runner.directory().is_dir());
    }

    #[test]
    fn test_duplicate_items_fail_construction() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::new()
            .child("a/b", empty())
            .child("a", Collection::new().child("b", empty()));

        let err = Runner::new(&collection, tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Resolve(ResolverError::DuplicateItem { .. })
        ));
    }
}
