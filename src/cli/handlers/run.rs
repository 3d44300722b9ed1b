use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::cli::handlers::commons;
use crate::core::runner::{RunRequest, RunSummary, Runner};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Runs the item a query resolves to.")]
struct RunArgs {
    /// The item (or, with --collection, the collection) to run.
    query: String,

    /// Run every matching expansion instead of only the first.
    #[arg(long, short)]
    all: bool,

    /// Read the query as a collection and run every item in it.
    #[arg(long, short)]
    collection: bool,

    /// Constraints and overrides, as `key=value`.
    params: Vec<String>,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Runs every item.")]
struct RunAllArgs {
    /// Run every matching expansion instead of only the first.
    #[arg(long, short)]
    all: bool,

    /// Constraints and overrides, as `key=value`.
    params: Vec<String>,
}

/// The handler for `run`.
pub fn handle(runner: &Runner, args: Vec<String>) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;
    let request = RunRequest {
        constraints: commons::parse_params(&run_args.params)?,
        all_expansions: run_args.all,
    };

    let summary = if run_args.collection {
        runner.run_subcollection(&run_args.query, &request)?
    } else {
        runner.run(&run_args.query, &request)?
    };
    print_summary(runner, &summary);
    Ok(())
}

/// The handler for `run-all`.
pub fn handle_all(runner: &Runner, args: Vec<String>) -> Result<()> {
    let run_args = RunAllArgs::try_parse_from(&args)?;
    let request = RunRequest {
        constraints: commons::parse_params(&run_args.params)?,
        all_expansions: run_args.all,
    };

    let summary = runner.run_all(&request)?;
    print_summary(runner, &summary);
    Ok(())
}

fn print_summary(runner: &Runner, summary: &RunSummary) {
    for path in &summary.written {
        println!(
            "{} {}",
            "wrote".green(),
            commons::relative_to(path, runner.directory())
        );
    }
    for location in &summary.skipped {
        println!("{} {} (no matching expansion)", "skipped".yellow(), location);
    }
    if summary.written.is_empty() && summary.skipped.is_empty() {
        println!("Nothing to run.");
    }
}
