use tracing::debug;
use tree_sitter::Node;

use super::unit::JavaUnit;
use crate::catalog::{ClassInfo, FieldInfo, MethodInfo, SignatureCatalog, TypeKind};

/// Extracts the signature catalog of every type declared in `unit`,
/// nested declarations included.
pub fn build_catalog(unit: &JavaUnit) -> SignatureCatalog {
    let mut catalog = SignatureCatalog {
        package: unit.package().unwrap_or_default().to_string(),
        imports: unit.imports().to_vec(),
        classes: Vec::new(),
    };
    collect_types(unit, unit.root(), None, &mut catalog);
    debug!(
        file = unit.path(),
        classes = catalog.classes.len(),
        methods = catalog.method_count(),
        "Signature catalog built"
    );
    catalog
}

/// Whitespace-free rendering of a type node (`Map<String,Integer>`).
pub fn type_text(unit: &JavaUnit, node: Node<'_>) -> String {
    unit.text(node).split_whitespace().collect()
}

/// Declared types of a `formal_parameters` node, varargs without `...`.
pub fn param_types(unit: &JavaUnit, params: Node<'_>) -> Vec<String> {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "formal_parameter" => p.child_by_field_name("type").map(|t| type_text(unit, t)),
            "spread_parameter" => {
                let mut inner = p.walk();
                let ty = p
                    .named_children(&mut inner)
                    .find(|n| !matches!(n.kind(), "modifiers" | "variable_declarator"))
                    .map(|t| type_text(unit, t));
                ty
            }
            _ => None,
        })
        .collect()
}

fn type_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        _ => None,
    }
}

fn collect_types(unit: &JavaUnit, node: Node<'_>, outer: Option<&str>, out: &mut SignatureCatalog) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(kind) = type_kind(child.kind()) {
            let info = class_info(unit, child, kind, outer, &out.package);
            let name = info.name.clone();
            out.classes.push(info);
            if let Some(body) = child.child_by_field_name("body") {
                collect_types(unit, body, Some(&name), out);
            }
        } else if matches!(child.kind(), "enum_body" | "enum_body_declarations") {
            collect_types(unit, child, outer, out);
        }
    }
}

fn class_info(
    unit: &JavaUnit,
    node: Node<'_>,
    kind: TypeKind,
    outer: Option<&str>,
    package: &str,
) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| unit.text(n).to_string())
        .unwrap_or_default();
    let extends = node
        .child_by_field_name("superclass")
        .and_then(|s| s.named_child(0))
        .map(|t| type_text(unit, t));
    let mut info = ClassInfo {
        name,
        package: package.to_string(),
        kind,
        outer: outer.map(str::to_string),
        extends,
        fields: Vec::new(),
        methods: Vec::new(),
    };
    if kind == TypeKind::Record {
        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for p in params.named_children(&mut cursor) {
                if let (Some(ty), Some(n)) = (p.child_by_field_name("type"), p.child_by_field_name("name")) {
                    info.fields.push(FieldInfo {
                        name: unit.text(n).to_string(),
                        ty: type_text(unit, ty),
                    });
                }
            }
        }
    }
    if let Some(body) = node.child_by_field_name("body") {
        collect_members(unit, body, &mut info);
    }
    info
}

fn collect_members(unit: &JavaUnit, body: Node<'_>, info: &mut ClassInfo) {
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "field_declaration" | "constant_declaration" => {
                let Some(ty) = member.child_by_field_name("type") else {
                    continue;
                };
                let ty = type_text(unit, ty);
                let mut decls = member.walk();
                for decl in member.children_by_field_name("declarator", &mut decls) {
                    let Some(name) = decl.child_by_field_name("name") else {
                        continue;
                    };
                    let dims = decl
                        .child_by_field_name("dimensions")
                        .map(|d| type_text(unit, d))
                        .unwrap_or_default();
                    info.fields.push(FieldInfo {
                        name: unit.text(name).to_string(),
                        ty: format!("{ty}{dims}"),
                    });
                }
            }
            "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                let name = member
                    .child_by_field_name("name")
                    .map(|n| unit.text(n).to_string())
                    .unwrap_or_default();
                let return_type = if member.kind() == "method_declaration" {
                    member.child_by_field_name("type").map(|t| type_text(unit, t))
                } else {
                    None
                };
                let param_types = member
                    .child_by_field_name("parameters")
                    .map(|p| param_types(unit, p))
                    .unwrap_or_default();
                info.methods.push(MethodInfo {
                    name,
                    return_type,
                    param_types,
                    line: unit.line(member),
                });
            }
            "enum_body_declarations" => collect_members(unit, member, info),
            _ => {}
        }
    }
}
