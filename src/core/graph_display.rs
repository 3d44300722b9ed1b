// src/core/graph_display.rs

use crate::core::item::Item;
use indexmap::IndexMap;
use std::fmt::Write;

#[derive(Default)]
struct TreeNode<'a> {
    item: Option<&'a Item>,
    children: IndexMap<&'a str, TreeNode<'a>>,
}

/// Renders items as an ASCII tree of their locations.
///
/// Each leaf shows its artifact kind and how many of its expansions are stored.
pub fn render_item_tree<'a>(items: &[&'a Item]) -> String {
    let mut root = TreeNode::default();
    for item in items {
        let mut node = &mut root;
        for part in item.path_components() {
            node = node.children.entry(part.as_str()).or_default();
        }
        node.item = Some(*item);
    }

    let mut out = String::new();
    let count = root.children.len();
    for (i, (name, child)) in root.children.iter().enumerate() {
        write_node(&mut out, name, child, "", i + 1 == count);
    }
    out
}

/// Recursive function to print a tree node and its descendants.
fn write_node(out: &mut String, name: &str, node: &TreeNode<'_>, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };

    let _ = match node.item {
        Some(item) => {
            let stored = item.expansions().filter(|e| e.exists()).count();
            writeln!(
                out,
                "{}{}{} [{}, {}/{} stored]",
                prefix,
                connector,
                name,
                item.expansion_type(),
                stored,
                item.expansion_count()
            )
        }
        None => writeln!(out, "{}{}{}", prefix, connector, name),
    };

    let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    let count = node.children.len();
    for (i, (child_name, child)) in node.children.iter().enumerate() {
        write_node(out, child_name, child, &child_prefix, i + 1 == count);
    }
}
