//! Command implementations.

use anyhow::{bail, Context, Result};
use engine::{build_cfg, build_pdg_with_config, EngineConfig, DEFAULT_MAX_ITERATIONS};
use ir::ProgramDependenceGraph;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{GraphArgs, InfoArgs};
use crate::config::{load_config, Config};
use crate::output::{self, Format, GraphKind};
use crate::{collect_java_files, default_excludes, parse_exclude};

/// Installs the stderr subscriber. `--quiet` and `--debug` take precedence
/// over `RUST_LOG`.
pub fn init_tracing(debug: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if debug && !quiet {
        debug!("Debug mode enabled");
    }
}

/// Settings of one export run after merging flags and the config file.
#[derive(Debug)]
struct ExportPlan {
    kind: GraphKind,
    format: Format,
    outdir: Option<PathBuf>,
    engine: EngineConfig,
    dump_facts: bool,
}

fn exclude_patterns(cli: &[Regex], cfg: &Config, defaults: bool) -> Result<Vec<Regex>> {
    let mut patterns = cli.to_vec();
    for pat in &cfg.exclude {
        let re = parse_exclude(pat)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid exclude pattern in config: {pat}"))?;
        patterns.push(re);
    }
    if defaults {
        patterns.extend(default_excludes());
    }
    Ok(patterns)
}

pub fn run_graphs(kind: GraphKind, args: GraphArgs) -> Result<()> {
    init_tracing(args.debug, args.quiet);
    let cfg = load_config().context("failed to load configuration")?;
    let format = args.format.or(cfg.format).unwrap_or(Format::Dot);
    if kind == GraphKind::Pdg && format == Format::Mermaid {
        bail!("mermaid output is only available for control flow graphs");
    }
    let plan = ExportPlan {
        kind,
        format,
        outdir: args.outdir.clone().or_else(|| cfg.outdir.clone()),
        engine: EngineConfig {
            max_iterations: args
                .max_iterations
                .or(cfg.max_iterations)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
        },
        dump_facts: args.debug,
    };
    let patterns = exclude_patterns(&args.exclude, &cfg, !args.no_default_exclude)?;
    debug!(?plan, excludes = patterns.len(), "Export configured");

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
    {
        error!("Failed to build global thread pool: {e}");
    }

    let files = collect_java_files(&args.paths, &patterns)?;
    info!(files = files.len(), "Files queued");

    let results: Vec<(PathBuf, Result<usize>)> = files
        .par_iter()
        .map(|path| (path.clone(), export_file(path, &plan)))
        .collect();

    let mut graphs = 0;
    let mut failed = 0;
    for (path, res) in results {
        match res {
            Ok(n) => graphs += n,
            Err(e) => {
                failed += 1;
                error!(file = %path.display(), "{e:#}");
            }
        }
    }
    info!(files = files.len(), graphs, failed, kind = plan.kind.tag(), "Export completed");
    if failed > 0 {
        bail!("{failed} file(s) could not be analysed");
    }
    Ok(())
}

fn export_file(path: &Path, plan: &ExportPlan) -> Result<usize> {
    let unit = parsers::parse_file(path, None)?;
    let dir = output::target_dir(path, plan.outdir.as_deref());
    let mut written = 0;
    match plan.kind {
        GraphKind::Cfg => {
            for cfg in build_cfg(&unit) {
                let content = output::render_cfg(&cfg, plan.format)?;
                let name = output::file_name(path, plan.kind, &cfg.name, plan.format);
                let out = output::write_graph(&dir, &name, &content)?;
                debug!(graph = %cfg.name, nodes = cfg.nodes.len(), file = %out.display(), "CFG written");
                written += 1;
            }
        }
        GraphKind::Pdg => {
            let pdgs = build_pdg_with_config(&unit, &plan.engine)
                .with_context(|| format!("failed to analyse {}", path.display()))?;
            for pdg in pdgs {
                if plan.dump_facts {
                    dump_facts(&pdg);
                }
                let content = output::render_pdg(&pdg, plan.format)?;
                let name = output::file_name(path, plan.kind, &pdg.name, plan.format);
                let out = output::write_graph(&dir, &name, &content)?;
                debug!(graph = %pdg.name, nodes = pdg.nodes.len(), file = %out.display(), "PDG written");
                written += 1;
            }
        }
    }
    Ok(written)
}

fn dump_facts(pdg: &ProgramDependenceGraph) {
    for node in pdg.nodes.iter().filter(|n| !n.defs.is_empty() || !n.uses.is_empty()) {
        debug!(
            graph = %pdg.name,
            node = node.id,
            line = node.line,
            code = %node.code,
            normalized = node.normalized.as_deref().unwrap_or(""),
            defs = ?node.defs,
            uses = ?node.uses,
            "Def/use facts"
        );
    }
}

pub fn run_info(args: InfoArgs) -> Result<()> {
    init_tracing(args.debug, args.quiet);
    let mut patterns = args.exclude.clone();
    patterns.extend(default_excludes());
    let files = collect_java_files(&args.paths, &patterns)?;
    let mut failed = 0;
    for path in &files {
        match parsers::parse_file(path, None) {
            Ok(unit) => {
                let catalog = parsers::build_catalog(&unit);
                let doc = serde_json::json!({
                    "file": path.display().to_string(),
                    "catalog": catalog,
                });
                let text = serde_json::to_string_pretty(&doc).context("failed to serialize catalog")?;
                println!("{text}");
            }
            Err(e) => {
                failed += 1;
                error!(file = %path.display(), "{e:#}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} file(s) could not be read");
    }
    Ok(())
}
