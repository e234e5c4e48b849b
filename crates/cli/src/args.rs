use clap::{Args as ClapArgs, Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;

use crate::output::Format;

fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn parse_threads(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("threads must be greater than 0".into())
    } else {
        Ok(v)
    }
}

fn parse_iterations(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("max iterations must be greater than 0".into())
    } else {
        Ok(v)
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "progdep - control flow and program dependence graphs for Java sources",
    long_about = "progdep parses Java source files and builds, for every method, constructor and initializer block, its control flow graph (CFG) or its program dependence graph (PDG) with data dependences computed from def/use facts.

Examples:
  progdep cfg src/                     # DOT files next to each source
  progdep pdg Main.java --format json  # JSON PDGs
  progdep cfg . --outdir out --format mermaid
  progdep info Main.java               # Print the signature catalog",
    subcommand_required = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export control flow graphs
    Cfg(GraphArgs),
    /// Export program dependence graphs
    Pdg(GraphArgs),
    /// Print the classes, fields and method signatures found in each file
    Info(InfoArgs),
}

#[derive(ClapArgs, Clone)]
pub struct GraphArgs {
    /// Java files or directories to analyse
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Output format (defaults to the config file value, then dot)
    #[arg(long, value_enum)]
    pub format: Option<Format>,
    /// Directory for the generated files (defaults to next to each source)
    #[arg(long)]
    pub outdir: Option<PathBuf>,
    /// Exclude files matching these glob patterns
    #[arg(long, value_parser = crate::parse_exclude, value_delimiter = ',')]
    pub exclude: Vec<Regex>,
    /// Don't use default exclusion patterns
    #[arg(long)]
    pub no_default_exclude: bool,
    /// Number of files analysed in parallel
    #[arg(long, default_value_t = default_threads(), value_parser = parse_threads)]
    pub threads: usize,
    /// Passes allowed before the def/use analysis is abandoned
    #[arg(long = "max-iterations", value_parser = parse_iterations)]
    pub max_iterations: Option<usize>,
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
    /// Suppress non-essential output
    #[arg(long)]
    pub quiet: bool,
}

#[derive(ClapArgs, Clone)]
pub struct InfoArgs {
    /// Java files or directories to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Exclude files matching these glob patterns
    #[arg(long, value_parser = crate::parse_exclude, value_delimiter = ',')]
    pub exclude: Vec<Regex>,
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
    /// Suppress non-essential output
    #[arg(long)]
    pub quiet: bool,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
