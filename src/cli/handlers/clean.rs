use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::cli::handlers::commons;
use crate::core::runner::Runner;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Deletes files under the results directory that no expansion accounts for."
)]
struct CleanArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,

    /// Only list what would be deleted.
    #[arg(long)]
    dry_run: bool,
}

/// The handler for `clean`.
pub fn handle(runner: &Runner, args: Vec<String>) -> Result<()> {
    let clean_args = CleanArgs::try_parse_from(&args)?;

    let plan = runner.clean_plan()?;
    if plan.is_empty() {
        println!("Nothing to clean in {}.", runner.directory().display());
        return Ok(());
    }

    println!("{}", "Files to delete:".yellow().bold());
    for path in &plan {
        println!("  {}", commons::relative_to(path, runner.directory()));
    }

    if clean_args.dry_run {
        return Ok(());
    }

    if !clean_args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {} file(s)?", plan.len()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let report = runner.clean()?;
    println!(
        "{} {} file(s) and {} empty directory(ies).",
        "Removed".green(),
        report.removed_files.len(),
        report.removed_dirs.len()
    );
    Ok(())
}
