use anyhow::Result;
use clap::Parser;

use crate::cli::handlers::commons;
use crate::core::runner::Runner;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Prints where an expansion is stored.")]
struct PathArgs {
    /// The item to locate.
    query: String,

    /// Expansion constraints, as `key=value`.
    params: Vec<String>,
}

/// The handler for `path`.
pub fn handle(runner: &Runner, args: Vec<String>) -> Result<()> {
    let path_args = PathArgs::try_parse_from(&args)?;
    let constraints = commons::parse_params(&path_args.params)?;

    println!("{}", runner.path(&path_args.query, &constraints)?.display());
    Ok(())
}
