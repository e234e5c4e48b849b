//! Java source front-end for the analysis engine: parsing into a
//! [`JavaUnit`] and extraction of its [`SignatureCatalog`].

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::debug;

#[derive(Debug, Default, Serialize)]
pub struct ParserMetrics {
    pub files_parsed: usize,
    pub parse_errors: usize,
}

pub mod catalog;
pub mod languages;
pub use catalog::{simple_type_name, ClassInfo, FieldInfo, MethodInfo, SignatureCatalog, TypeKind};
pub use languages::*;

/// Determines the supported file type from the name/extension.
///
/// # Example
/// ```
/// use parsers::detect_type;
/// assert_eq!(detect_type(std::path::Path::new("src/Main.java")), Some("java"));
/// assert_eq!(detect_type(std::path::Path::new("README.md")), None);
/// ```
pub fn detect_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
    let detected = match ext.as_deref() {
        Some("java") => Some("java"),
        _ => None,
    };
    if let Some(t) = detected {
        debug!(file = %path.display(), file_type = t, "File type detected");
    } else {
        debug!(file = %path.display(), "Unsupported file type");
    }
    detected
}

/// Reads a Java file and parses it into a [`JavaUnit`].
///
/// # Example
/// ```
/// use parsers::parse_file;
/// use std::fs;
/// let path = std::env::temp_dir().join("Example.java");
/// fs::write(&path, "class Example { void m() {} }").unwrap();
/// let unit = parse_file(&path, None).unwrap();
/// assert!(!unit.has_errors());
/// ```
pub fn parse_file(path: &Path, mut metrics: Option<&mut ParserMetrics>) -> Result<JavaUnit> {
    debug!(file = %path.display(), "Parsing file");
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let res = parse_java(&content, &path.to_string_lossy());
    match res {
        Ok(unit) => {
            if let Some(m) = metrics.as_deref_mut() {
                if unit.has_errors() {
                    m.parse_errors += 1;
                }
                m.files_parsed += 1;
            }
            Ok(unit)
        }
        Err(e) => {
            if let Some(m) = metrics {
                m.parse_errors += 1;
            }
            Err(e)
        }
    }
}
