// src/bin/crun.rs

use anyhow::{Context, anyhow};
use clap::Parser;
use colored::*;
use crun::cli::{self, Cli};
use crun::{Action, Artifact, ArtifactKind, Cell, Collection, Configure, Figure, Kwargs, Leaf, Table};
use serde_json::json;

fn int_arg(kwargs: &Kwargs, key: &str) -> anyhow::Result<i64> {
    kwargs
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| anyhow!("'{}' must be an integer", key))
}

fn squares(kwargs: &Kwargs) -> anyhow::Result<Artifact> {
    let n = int_arg(kwargs, "n")?;
    let power = int_arg(kwargs, "power")?;
    let exponent = u32::try_from(power).context("'power' must be non-negative")?;

    let mut table = Table::new(["x", "y"]);
    for x in 0..n {
        table.push_row([Cell::Int(x), Cell::Int(x.pow(exponent))])?;
    }
    Ok(Artifact::Table(table))
}

fn summary(kwargs: &Kwargs) -> anyhow::Result<Artifact> {
    let n = int_arg(kwargs, "n")?;
    let total: i64 = (0..n).map(|x| x * x).sum();
    Ok(Artifact::Json(json!({ "n": n, "sum_of_squares": total })))
}

fn bars(kwargs: &Kwargs) -> anyhow::Result<Artifact> {
    let n = int_arg(kwargs, "n")?;
    let width = 20 * n + 20;
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"120\">"
    );
    for x in 0..n {
        let height = (x * 10).min(100);
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"16\" height=\"{}\"/>",
            10 + x * 20,
            110 - height,
            height
        ));
    }
    svg.push_str("</svg>");
    Ok(Artifact::Figure(Figure::from_svg(svg)))
}

/// A small collection showing inherited arguments, axes and every artifact kind.
fn demo_collection() -> Collection {
    Collection::new()
        .child(
            "tables",
            Collection::new()
                .kwarg("n", 5)
                .expansion_type(ArtifactKind::DataFrame)
                .child(
                    "powers",
                    Leaf::new(Action::new(["n", "power"], squares))
                        .suffix_expansion("power", [1, 2, 3])
                        .expansion_default("power", 2)
                        .alias("sq"),
                ),
        )
        .child(
            "stats/summary",
            Leaf::new(Action::new(["n"], summary))
                .kwarg("n", 10)
                .expansion_type(ArtifactKind::Json),
        )
        .child(
            "plots/bars",
            Leaf::new(Action::new(["n"], bars))
                .expansion_type(ArtifactKind::Plot)
                .suffix(".svg")
                .directory_expansion("n", [5, 10])
                .expansion_default("n", 5),
        )
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = cli::run_with_collection(&demo_collection(), cli.args) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
