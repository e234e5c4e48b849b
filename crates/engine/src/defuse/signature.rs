use parsers::SignatureCatalog;
use serde::Serialize;
use std::collections::HashMap;

/// Method-name prefixes that suggest the receiver is modified.
const MUTATOR_PREFIXES: [&str; 6] = ["set", "put", "add", "insert", "push", "append"];

/// Declared shape of a method or constructor plus the mutation hints
/// inferred for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub package: String,
    pub class: String,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub param_types: Vec<String>,
    /// Calling this method modifies the receiver's state.
    pub mutates_state: bool,
    /// Calling this method modifies the argument at each flagged position.
    pub out_args: Vec<bool>,
}

impl MethodSignature {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// Initial mutation hint: constructors and setter-like names.
    pub fn guess_mutation(name: &str, return_type: Option<&str>) -> bool {
        if return_type.is_none() {
            return true;
        }
        let lower = name.to_lowercase();
        MUTATOR_PREFIXES.iter().any(|p| lower.starts_with(p))
    }
}

/// Every signature of the unit with a by-name index.
#[derive(Debug, Clone, Default)]
pub(crate) struct SignatureTable {
    sigs: Vec<MethodSignature>,
    by_name: HashMap<String, Vec<usize>>,
}

impl SignatureTable {
    pub fn from_catalog(catalog: &SignatureCatalog) -> Self {
        let mut table = Self::default();
        for class in &catalog.classes {
            for method in &class.methods {
                let id = table.sigs.len();
                table.sigs.push(MethodSignature {
                    name: method.name.clone(),
                    package: class.package.clone(),
                    class: class.name.clone(),
                    return_type: method.return_type.clone(),
                    param_types: method.param_types.clone(),
                    mutates_state: MethodSignature::guess_mutation(
                        &method.name,
                        method.return_type.as_deref(),
                    ),
                    out_args: vec![false; method.param_types.len()],
                });
                table.by_name.entry(method.name.clone()).or_default().push(id);
            }
        }
        table
    }

    pub fn candidates(&self, name: &str) -> &[usize] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: usize) -> &MethodSignature {
        &self.sigs[id]
    }

    pub fn all(&self) -> &[MethodSignature] {
        &self.sigs
    }

    /// The signature declared by `class` with this exact name and
    /// parameter list.
    pub fn find_declared(&self, class: &str, name: &str, param_types: &[String]) -> Option<usize> {
        self.candidates(name)
            .iter()
            .copied()
            .find(|&i| self.sigs[i].class == class && self.sigs[i].param_types == param_types)
    }

    /// Sets the state-mutation flag; returns `true` when it flipped.
    pub fn mark_mutates(&mut self, id: usize) -> bool {
        let sig = &mut self.sigs[id];
        let flipped = !sig.mutates_state;
        sig.mutates_state = true;
        flipped
    }

    /// Sets the out-argument flag of parameter `pos`; returns `true` when it
    /// flipped.
    pub fn mark_out_arg(&mut self, id: usize, pos: usize) -> bool {
        match self.sigs[id].out_args.get_mut(pos) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }
}
