use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use ir::{ControlFlowGraph, ProgramDependenceGraph};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supported output formats for exported graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Dot,
    Json,
    Mermaid,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Dot => "dot",
            Format::Json => "json",
            Format::Mermaid => "mmd",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" => Ok(Format::Dot),
            "json" => Ok(Format::Json),
            "mermaid" => Ok(Format::Mermaid),
            _ => Err("invalid format".into()),
        }
    }
}

/// Which graph a command exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Cfg,
    Pdg,
}

impl GraphKind {
    pub fn tag(self) -> &'static str {
        match self {
            GraphKind::Cfg => "CFG",
            GraphKind::Pdg => "PDG",
        }
    }
}

/// `<stem>-<KIND>-<hash>.<ext>`, where `stem` is the file stem of `source`
/// and `hash` the first 8 hex digits of the blake3 hash of the source path
/// and the graph name. Same-named files in different directories never
/// share an output name.
///
/// # Example
///
/// ```
/// use progdep::output::{file_name, Format, GraphKind};
/// use std::path::Path;
/// let a = file_name(Path::new("a/Main.java"), GraphKind::Cfg, "Main.run()", Format::Dot);
/// let b = file_name(Path::new("b/Main.java"), GraphKind::Cfg, "Main.run()", Format::Dot);
/// assert!(a.starts_with("Main-CFG-") && a.ends_with(".dot"));
/// assert_ne!(a, b);
/// ```
pub fn file_name(source: &Path, kind: GraphKind, graph: &str, format: Format) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string());
    let mut hasher = blake3::Hasher::new();
    hasher.update(source.to_string_lossy().replace('\\', "/").as_bytes());
    hasher.update(&[0]);
    hasher.update(graph.as_bytes());
    let hash = hasher.finalize().to_hex();
    format!(
        "{stem}-{}-{}.{}",
        kind.tag(),
        &hash.as_str()[..8],
        format.extension()
    )
}

pub fn render_cfg(cfg: &ControlFlowGraph, format: Format) -> Result<String> {
    match format {
        Format::Dot => Ok(cfg.to_dot()),
        Format::Json => cfg.to_json().context("failed to serialize CFG"),
        Format::Mermaid => Ok(cfg.to_mermaid()),
    }
}

pub fn render_pdg(pdg: &ProgramDependenceGraph, format: Format) -> Result<String> {
    match format {
        Format::Dot => Ok(pdg.to_dot()),
        Format::Json => pdg.to_json().context("failed to serialize PDG"),
        Format::Mermaid => bail!("mermaid output is only available for control flow graphs"),
    }
}

/// Directory receiving the graphs of `source`.
pub fn target_dir(source: &Path, outdir: Option<&Path>) -> PathBuf {
    match outdir {
        Some(dir) => dir.to_path_buf(),
        None => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

pub fn write_graph(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
