use anyhow::Result;
use clap::Parser;

use crate::cli::handlers::commons;
use crate::core::runner::Runner;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints an item's stored artifact, running the item first if nothing is stored."
)]
struct GetArgs {
    /// The item to read.
    query: String,

    /// Discard the stored artifact and run again.
    #[arg(long, short)]
    rerun: bool,

    /// Expansion constraints, as `key=value`.
    params: Vec<String>,
}

/// The handler for `get`.
pub fn handle(runner: &Runner, args: Vec<String>) -> Result<()> {
    let get_args = GetArgs::try_parse_from(&args)?;
    let constraints = commons::parse_params(&get_args.params)?;

    let artifact = runner.get(&get_args.query, get_args.rerun, &constraints)?;
    let path = runner.path(&get_args.query, &constraints)?;

    println!("{}", commons::render_artifact(&artifact, &path));
    Ok(())
}
