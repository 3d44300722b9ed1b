use anyhow::Result;
use colored::Colorize;

use crate::{cli::handlers, core::runner::Runner};

/// Defines a command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    summary: &'static str,
    handler: fn(&Runner, Vec<String>) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "run",
        aliases: &[],
        summary: "Run an item (or a collection with --collection).",
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "run-all",
        aliases: &["all"],
        summary: "Run every item.",
        handler: handlers::run::handle_all,
    },
    CommandDefinition {
        name: "get",
        aliases: &[],
        summary: "Print an item's stored artifact, running it if needed.",
        handler: handlers::get::handle,
    },
    CommandDefinition {
        name: "path",
        aliases: &[],
        summary: "Print where an expansion is stored.",
        handler: handlers::path::handle,
    },
    CommandDefinition {
        name: "tree",
        aliases: &["ls"],
        summary: "Show the items as a tree.",
        handler: handlers::tree::handle,
    },
    CommandDefinition {
        name: "info",
        aliases: &[],
        summary: "Show an item's configuration and stored expansions.",
        handler: handlers::info::handle,
    },
    CommandDefinition {
        name: "clean",
        aliases: &[],
        summary: "Delete files no expansion accounts for.",
        handler: handlers::clean::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn print_usage() {
    println!("{}", "Usage: crun <command> [args...]".yellow().bold());
    println!("       crun <query> [key=value...]   (shortcut for `run`)\n");
    for cmd in COMMAND_REGISTRY {
        let aliases = if cmd.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", cmd.aliases.join(", "))
        };
        println!("  {:<16} {}", format!("{}{}", cmd.name, aliases).cyan(), cmd.summary);
    }
}

/// Routes `all_args` to a command handler.
///
/// `crun <command> [args...]` runs the command. Anything else is read as
/// `crun <query> [args...]`, a shortcut for `run`.
pub fn dispatch(runner: &Runner, all_args: Vec<String>) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let Some((first, rest)) = all_args.split_first() else {
        print_usage();
        return Ok(());
    };

    if matches!(first.as_str(), "help" | "-h" | "--help") {
        print_usage();
        return Ok(());
    }

    match find_command(first) {
        Some(command) => (command.handler)(runner, rest.to_vec()),
        None => handlers::run::handle(runner, all_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_find_command_by_name_and_alias() {
        assert_eq!(find_command("tree").map(|c| c.name), Some("tree"));
        assert_eq!(find_command("ls").map(|c| c.name), Some("tree"));
        assert_eq!(find_command("all").map(|c| c.name), Some("run-all"));
        assert!(find_command("a/b/c").is_none());
    }

    #[test]
    fn test_registry_names_are_unique() {
        let mut seen = HashSet::new();
        for cmd in COMMAND_REGISTRY {
            assert!(seen.insert(cmd.name), "duplicate command {}", cmd.name);
            for alias in cmd.aliases {
                assert!(seen.insert(*alias), "duplicate alias {}", alias);
            }
        }
    }
}
