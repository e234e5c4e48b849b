//! Analysis engine for Java units: control flow graphs per method, def/use
//! facts computed to a fixpoint, and program dependence graphs with data
//! edges derived from them.

use serde::{Deserialize, Serialize};

pub mod cfg;
pub mod defuse;
mod members;
pub mod pdg;

pub use cfg::build_cfg;
pub use defuse::{is_usable, Analyzer, MethodSignature};
pub use pdg::{assemble, build_pdg, build_pdg_with_config, PathTraversal};

/// Passes allowed before the def/use analysis is reported as diverging.
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
