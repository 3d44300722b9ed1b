use anyhow::Result;
use clap::Parser;

use crate::core::{config_loader, runner::Runner};
use crate::models::Collection;

/// Routes arguments to command handlers.
pub mod dispatcher;
/// One handler per command.
pub mod handlers;

pub use dispatcher::dispatch;

/// crun: runs a collection of named actions and caches their artifacts.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command followed by its arguments. Handlers parse their own flags.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Builds a runner for `collection` from the options in the working directory
/// and dispatches `args` to it.
///
/// This is the entry point for binaries that ship their own collection.
pub fn run_with_collection(collection: &Collection, args: Vec<String>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let options = config_loader::load_options(&cwd)?;
    log::debug!("Runner options: {:?}", options);

    let runner = Runner::with_options(collection, options)?;
    dispatch(&runner, args)
}
