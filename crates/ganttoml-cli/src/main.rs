//! ganttoml CLI - TOML-driven Gantt chart renderer
//!
//! Command-line interface for checking task files and rendering charts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ganttoml_core::{load_records, Table};
use ganttoml_render::GanttChart;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ganttoml")]
#[command(author, version, about = "Render Gantt charts from TOML task files", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a chart from `<SOURCE>.toml`
    Plot {
        /// Source file base name, without the .toml extension
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Output directory, created if missing
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Output file base name (.png is appended); without it nothing is
        /// written to disk
        #[arg(short, long)]
        name: Option<String>,

        /// Keep file order instead of sorting by start date
        #[arg(long)]
        no_sort: bool,

        /// Number of x-axis date ticks
        #[arg(long, default_value_t = 10)]
        ticks: usize,

        /// Figure width in chart units
        #[arg(long, default_value_t = 20.0)]
        width: f64,

        /// Figure height in chart units
        #[arg(long, default_value_t = 5.0)]
        height: f64,
    },

    /// Load and derive a task file without drawing anything
    Check {
        /// Source file base name, without the .toml extension
        #[arg(value_name = "SOURCE")]
        source: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Plot {
            source,
            dir,
            name,
            no_sort,
            ticks,
            width,
            height,
        } => plot(source, dir, name, no_sort, ticks, width, height),
        Commands::Check { source } => check(&source),
    }
}

fn plot(
    source: String,
    dir: Option<PathBuf>,
    name: Option<String>,
    no_sort: bool,
    ticks: usize,
    width: f64,
    height: f64,
) -> Result<()> {
    let mut chart = GanttChart::new(source)
        .sort_by_start(!no_sort)
        .x_tick_count(ticks)
        .figure_size(width, height);
    if let Some(dir) = dir {
        chart = chart.output_dir(dir);
    }
    if let Some(name) = name {
        chart = chart.output_name(name);
    }

    chart.plot()?;

    match chart.output_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "chart written");
            println!("Wrote {}", path.display());
        }
        None => println!("Rendered in memory; no output name given, nothing written"),
    }
    Ok(())
}

fn check(source: &str) -> Result<()> {
    let path = PathBuf::from(format!("{source}.toml"));
    let records = load_records(&path)?;
    tracing::debug!(records = records.len(), "loaded record set");

    let table = Table::build(
        records.into_iter().map(|(_, record)| record).collect(),
        true,
    )?;

    println!("{} task record(s) in {}", table.rows.len(), path.display());
    if let (Some(start), Some(end)) = (table.min_start(), table.max_end()) {
        println!("Span: {start} to {end} ({} days)", (end - start).num_days());
    }
    for row in &table.rows {
        println!(
            "  {:<24} {} -> {}  {:>4}%",
            row.task, row.start, row.end, row.complete
        );
    }
    Ok(())
}
