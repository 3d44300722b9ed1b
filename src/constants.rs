// src/constants.rs

/// The default results directory, relative to the working directory.
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// The name of the optional runner configuration file (in the working directory).
pub const OPTIONS_FILENAME: &str = "crun.toml";

/// Environment variable that overrides the configured results directory.
pub const RESULTS_DIR_ENV: &str = "CRUN_RESULTS_DIR";

/// Joins the prefix values, the item name and the suffix values of a file stem.
pub const STEM_SEPARATOR: &str = "-";

/// Joins the elements of a list or map value inside a single stem component.
pub const VALUE_SEPARATOR: &str = "_";

/// Prefix for a `false` boolean flag in a stem (`x` / `not-x`).
pub const NEGATED_FLAG_PREFIX: &str = "not-";

/// Separator between path segments in queries and item locations.
pub const QUERY_SEPARATOR: char = '/';
