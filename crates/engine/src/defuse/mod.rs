//! Def/use facts for every statement of a unit, computed by repeated passes
//! until nothing grows.

use anyhow::{bail, Result};
use ir::{StatementNode, SyntaxId};
use parsers::{build_catalog, JavaUnit, SignatureCatalog};
use std::collections::HashMap;
use tracing::{debug, warn};

mod scope;
mod signature;
mod visitor;

pub use signature::MethodSignature;
pub use visitor::is_usable;

use crate::members::members;
use crate::EngineConfig;
use signature::SignatureTable;
use visitor::Pass;

/// Owns the catalog, the signature table and the facts of one unit.
pub struct Analyzer<'u> {
    unit: &'u JavaUnit,
    catalog: SignatureCatalog,
    signatures: SignatureTable,
    max_iterations: usize,
    facts: HashMap<SyntaxId, StatementNode>,
    params: HashMap<SyntaxId, Vec<StatementNode>>,
    iterations: usize,
}

impl<'u> Analyzer<'u> {
    pub fn new(unit: &'u JavaUnit, config: &EngineConfig) -> Self {
        let catalog = build_catalog(unit);
        let signatures = SignatureTable::from_catalog(&catalog);
        debug!(
            file = unit.path(),
            classes = catalog.classes.len(),
            methods = catalog.method_count(),
            "Signature catalog built"
        );
        Self {
            unit,
            catalog,
            signatures,
            max_iterations: config.max_iterations.max(1),
            facts: HashMap::new(),
            params: HashMap::new(),
            iterations: 0,
        }
    }

    /// Runs passes until one of them changes nothing. Returns the number of
    /// passes performed, including the final quiet one. The iteration cap
    /// bounds the passes that change something; the confirming quiet pass
    /// is not counted against it.
    pub fn run_fixpoint(&mut self) -> Result<usize> {
        let members = members(self.unit);
        let mut passes = 0;
        loop {
            passes += 1;
            let mut pass = Pass::new(
                self.unit,
                &self.catalog,
                &mut self.signatures,
                &mut self.facts,
                &mut self.params,
            );
            for member in &members {
                pass.member(member);
            }
            let changed = pass.changed;
            debug!(file = self.unit.path(), pass = passes, changed, "Def/use pass done");
            if !changed {
                break;
            }
            if passes > self.max_iterations {
                warn!(
                    file = self.unit.path(),
                    max = self.max_iterations,
                    "Def/use facts still growing at the iteration cap"
                );
                bail!(
                    "analysis did not converge after {} iterations",
                    self.max_iterations
                );
            }
        }
        self.iterations = passes;
        Ok(passes)
    }

    pub fn facts(&self) -> &HashMap<SyntaxId, StatementNode> {
        &self.facts
    }

    pub fn fact(&self, key: SyntaxId) -> Option<&StatementNode> {
        self.facts.get(&key)
    }

    /// Parameter nodes of the member whose declaration has key `entry`.
    pub fn params(&self, entry: SyntaxId) -> &[StatementNode] {
        self.params.get(&entry).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn signatures(&self) -> &[MethodSignature] {
        self.signatures.all()
    }

    pub fn catalog(&self) -> &SignatureCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests;
