// src/cli/handlers/info.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::time::SystemTime;

use crate::cli::handlers::commons;
use crate::core::{cache, item::Item, runner::Runner};
use crate::models::{AxisMap, Kwargs};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Displays an item's configuration and the state of its expansions."
)]
struct InfoArgs {
    /// The item to describe.
    query: String,

    /// Only list expansions matching these `key=value` constraints.
    params: Vec<String>,
}

/// The main handler for the `info` command.
pub fn handle(runner: &Runner, args: Vec<String>) -> Result<()> {
    let info_args = InfoArgs::try_parse_from(&args)?;
    let constraints = commons::parse_params(&info_args.params)?;
    let item = runner.get_item(&info_args.query)?;

    print_metadata(item);
    print_expansions(runner, item, &constraints)?;

    println!("\n---------------------------------");
    Ok(())
}

fn print_metadata(item: &Item) {
    println!("\n--- Item '{}' ---", item.location().yellow());
    println!("  {:<15} {}", "Kind:".blue(), item.expansion_type());
    println!("  {:<15} {}", "Suffix:".blue(), item.suffix());
    println!("  {:<15} {}", "Directory:".blue(), item.directory().display());
    if !item.aliases().is_empty() {
        println!("  {:<15} {}", "Aliases:".blue(), item.aliases().join(", "));
    }
    if !item.subdirs().is_empty() {
        println!("  {:<15} {}", "Subdirs:".blue(), item.subdirs().join("/"));
    }

    print_kwargs("Arguments", item.kwargs());
    print_axes("Directory axes", item.directory_expansions());
    print_axes("Prefix axes", item.prefix_expansions());
    print_axes("Suffix axes", item.suffix_expansions());
    print_kwargs("Axis defaults", item.expansion_defaults());
}

fn print_kwargs(label: &str, kwargs: &Kwargs) {
    if kwargs.is_empty() {
        return;
    }
    println!("\n  {}", label.green());
    for (key, value) in kwargs {
        println!("    {:<13} {}", key.cyan(), value);
    }
}

fn print_axes(label: &str, axes: &AxisMap) {
    if axes.is_empty() {
        return;
    }
    println!("\n  {}", label.green());
    for (key, values) in axes {
        let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
        println!("    {:<13} [{}]", key.cyan(), rendered.join(", "));
    }
}

fn print_expansions(runner: &Runner, item: &Item, constraints: &Kwargs) -> Result<()> {
    let expansions = item.get_expansions(constraints)?;
    println!(
        "\n  {} ({} of {})",
        "Expansions".green(),
        expansions.len(),
        item.expansion_count()
    );

    for expansion in expansions {
        let path = expansion.path();
        let shown = commons::relative_to(&path, runner.directory());
        if !expansion.exists() {
            println!("    {} {}", "·".dimmed(), shown.dimmed());
            continue;
        }
        let info = cache::artifact_info(&path)?;
        println!(
            "    {} {}  {} bytes, {}, {}",
            "✓".green(),
            shown,
            info.file_size,
            describe_age(info.modified),
            info.fingerprint.dimmed()
        );
    }
    Ok(())
}

fn describe_age(modified: SystemTime) -> String {
    match SystemTime::now().duration_since(modified) {
        Ok(age) => match age.as_secs() {
            s if s < 60 => format!("{}s ago", s),
            s if s < 3600 => format!("{}m ago", s / 60),
            s if s < 86_400 => format!("{}h ago", s / 3600),
            s => format!("{}d ago", s / 86_400),
        },
        Err(_) => "just now".to_string(),
    }
}
