//! Language front-ends. Java is the only one; it turns source text into a
//! [`JavaUnit`] the engine walks.

pub mod java;
pub use java::{build_catalog, param_types, parse_java, type_text, JavaUnit};
