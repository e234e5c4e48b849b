//! Signature catalog: the declared shape of every type in a compilation
//! unit (package, fields, methods and constructors).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// `None` for constructors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub param_types: Vec<String>,
    pub line: usize,
}

impl MethodInfo {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub package: String,
    pub kind: TypeKind,
    /// Simple name of the enclosing type for nested declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }
}

/// Every type declared in one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureCatalog {
    pub package: String,
    pub imports: Vec<String>,
    pub classes: Vec<ClassInfo>,
}

impl SignatureCatalog {
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Resolves a declared type such as `java.util.List<String>` or
    /// `Node[]` to a catalog entry by its simple name.
    pub fn class_for_type(&self, ty: &str) -> Option<&ClassInfo> {
        self.class(simple_type_name(ty))
    }

    /// Fields declared by `class` and by its superclasses known to the
    /// catalog, nearest declaration first.
    pub fn fields_of(&self, class: &str) -> Vec<&FieldInfo> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.class(class);
        while let Some(info) = current {
            if !seen.insert(info.name.as_str()) {
                break;
            }
            out.extend(info.fields.iter());
            current = info.extends.as_deref().and_then(|s| self.class_for_type(s));
        }
        out
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}

/// Strips generic arguments, array brackets, varargs and qualification
/// from a type name.
pub fn simple_type_name(ty: &str) -> &str {
    let base = ty.split('<').next().unwrap_or(ty);
    let base = base.trim_end_matches("...");
    let base = base.trim_end_matches(|c| c == '[' || c == ']' || c == ' ');
    base.rsplit('.').next().unwrap_or(base).trim()
}
