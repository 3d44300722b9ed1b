use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::core::{graph_display, item::Item, runner::Runner};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Displays the items as a tree.")]
struct TreeArgs {
    /// Only show the items in this collection.
    query: Option<String>,
}

/// The handler for `tree`.
pub fn handle(runner: &Runner, args: Vec<String>) -> Result<()> {
    let tree_args = TreeArgs::try_parse_from(&args)?;

    let (items, header): (Vec<&Item>, String) = match &tree_args.query {
        Some(query) => (
            runner.get_items_in_collection(query),
            format!("Items in '{}':", query.cyan()),
        ),
        None => (runner.items().iter().collect(), "Items:".to_string()),
    };

    println!("\n{} ({})", header, runner.directory().display());
    if items.is_empty() {
        println!("  (none)");
    } else {
        print!("{}", graph_display::render_item_tree(&items));
    }
    Ok(())
}
