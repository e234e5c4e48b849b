//! Java front-end backed by `tree-sitter-java`.

pub mod catalog;
mod parser;
mod unit;

pub use catalog::{build_catalog, param_types, type_text};
pub use parser::parse_java;
pub use unit::JavaUnit;

#[cfg(test)]
mod tests;
