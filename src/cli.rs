//! Command-line surface: argument parsing and command execution.
//!
//! [`run`] writes to any [`Write`] so the harnesses can drive it with an
//! in-memory transport and capture the output.

use clap::{Args, Parser, Subcommand};
use psearch_core::config::{Config, SearchConfig};
use psearch_core::{PartialSearch, Projection, Transport};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "psearch",
    about = "Partial search over a configuration-management server's index"
)]
pub struct Cli {
    /// Config file to use instead of ~/.config/psearch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write debug logs to /tmp/psearch-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search one index and print each row as a JSON line (`null` for rows
    /// the server could not resolve).
    Search(SearchArgs),
    /// List the indexes the server exposes, one per line.
    Indexes,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Index to search: node, role, environment, client, …
    pub index: String,

    /// Solr-style query; defaults to `[search] query` from the config.
    pub query: Option<String>,

    /// Page size; defaults to `[search] rows` from the config.
    #[arg(long)]
    pub rows: Option<usize>,

    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Projected key as NAME=path.to.field; repeatable.
    #[arg(short, long = "key", value_name = "NAME=PATH", value_parser = parse_key)]
    pub keys: Vec<(String, Vec<String>)>,

    /// Print only the row of the object with this name.
    #[arg(long, conflicts_with = "total")]
    pub name: Option<String>,

    /// Print the total match count instead of rows.
    #[arg(long)]
    pub total: bool,
}

fn parse_key(input: &str) -> Result<(String, Vec<String>), String> {
    Projection::parse_pair(input).map_err(|e| e.to_string())
}

/// Execute the parsed command against `transport`, writing results to `out`.
pub fn run(
    cli: &Cli,
    config: &Config,
    transport: Arc<dyn Transport>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match &cli.command {
        Command::Search(args) => search(args, &config.search, transport, out),
        Command::Indexes => indexes(transport, out),
    }
}

fn search(
    args: &SearchArgs,
    defaults: &SearchConfig,
    transport: Arc<dyn Transport>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let projection: Projection = args.keys.iter().cloned().collect();
    let search = PartialSearch::new(&args.index, transport)
        .with_query(args.query.as_deref().unwrap_or(&defaults.query))
        .with_rows(args.rows.unwrap_or(defaults.rows))
        .with_start(args.start)
        .with_projection(projection);
    tracing::debug!(?search, "running search");

    if args.total {
        writeln!(out, "{}", search.total()?)?;
        return Ok(());
    }

    if let Some(name) = &args.name {
        serde_json::to_writer(&mut *out, &search.get_named(name)?)?;
        writeln!(out)?;
        return Ok(());
    }

    for row in search.iter()? {
        serde_json::to_writer(&mut *out, &row)?;
        writeln!(out)?;
    }
    Ok(())
}

fn indexes(transport: Arc<dyn Transport>, out: &mut impl Write) -> anyhow::Result<()> {
    let list = PartialSearch::list_indexes(transport)?;
    for name in list.iter() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
