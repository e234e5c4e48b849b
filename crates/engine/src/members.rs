//! Enumeration of the method-like members of every class in a unit.

use parsers::{type_text, JavaUnit};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Constructor,
    StaticInitializer,
    InstanceInitializer,
}

/// A method, constructor or initializer block with a body.
#[derive(Debug, Clone)]
pub struct Member<'t> {
    pub kind: MemberKind,
    /// The declaration node (also the key of the entry node).
    pub node: Node<'t>,
    pub body: Node<'t>,
    /// Enclosing classes, innermost first.
    pub classes: Vec<String>,
}

impl<'t> Member<'t> {
    pub fn class(&self) -> &str {
        self.classes.first().map(String::as_str).unwrap_or_default()
    }

    pub fn name(&self, unit: &JavaUnit) -> String {
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => self
                .node
                .child_by_field_name("name")
                .map(|n| unit.text(n).to_string())
                .unwrap_or_default(),
            MemberKind::StaticInitializer => "static".to_string(),
            MemberKind::InstanceInitializer => "block".to_string(),
        }
    }

    /// Declared return type; `None` for constructors and initializers.
    pub fn return_type(&self, unit: &JavaUnit) -> Option<String> {
        match self.kind {
            MemberKind::Method => self.node.child_by_field_name("type").map(|t| type_text(unit, t)),
            _ => None,
        }
    }

    pub fn parameters(&self) -> Option<Node<'t>> {
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => self.node.child_by_field_name("parameters"),
            _ => None,
        }
    }

    /// `(name, type)` of every formal parameter, in order.
    pub fn formal_params(&self, unit: &JavaUnit) -> Vec<FormalParam<'t>> {
        let Some(params) = self.parameters() else {
            return Vec::new();
        };
        let mut cursor = params.walk();
        let children: Vec<_> = params.named_children(&mut cursor).collect();
        children
            .into_iter()
            .filter_map(|p| match p.kind() {
                "formal_parameter" => {
                    let name = p.child_by_field_name("name")?;
                    let ty = p.child_by_field_name("type")?;
                    Some(FormalParam {
                        node: p,
                        name: unit.text(name).to_string(),
                        ty: type_text(unit, ty),
                    })
                }
                "spread_parameter" => {
                    let mut inner = p.walk();
                    let parts: Vec<_> = p.named_children(&mut inner).collect();
                    let ty = parts
                        .iter()
                        .find(|n| !matches!(n.kind(), "modifiers" | "variable_declarator"))?;
                    let decl = parts.iter().find(|n| n.kind() == "variable_declarator")?;
                    let name = decl.child_by_field_name("name")?;
                    Some(FormalParam {
                        node: p,
                        name: unit.text(name).to_string(),
                        ty: type_text(unit, *ty),
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Enclosing classes from the outermost one, joined with `.`.
    pub fn class_path(&self) -> String {
        let outermost_first: Vec<&str> = self.classes.iter().rev().map(String::as_str).collect();
        outermost_first.join(".")
    }

    /// Human readable name of the unit, `Outer.Class.method(types)`.
    pub fn qualified_name(&self, unit: &JavaUnit) -> String {
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => {
                let types: Vec<_> = self.formal_params(unit).into_iter().map(|p| p.ty).collect();
                format!("{}.{}({})", self.class_path(), self.name(unit), types.join(", "))
            }
            _ => format!("{}.{}@{}", self.class_path(), self.name(unit), unit.line(self.node)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormalParam<'t> {
    pub node: Node<'t>,
    pub name: String,
    pub ty: String,
}

/// Collects every member with a body, walking nested classes. Interfaces,
/// enums and records are skipped.
pub fn members(unit: &JavaUnit) -> Vec<Member<'_>> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    collect(unit, unit.root(), &mut stack, &mut out);
    out
}

fn collect<'t>(unit: &'t JavaUnit, node: Node<'t>, stack: &mut Vec<String>, out: &mut Vec<Member<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "class_declaration" {
            continue;
        }
        let name = child
            .child_by_field_name("name")
            .map(|n| unit.text(n).to_string())
            .unwrap_or_default();
        let Some(body) = child.child_by_field_name("body") else {
            continue;
        };
        stack.insert(0, name);
        let mut members = body.walk();
        for member in body.named_children(&mut members) {
            let (kind, member_body) = match member.kind() {
                "method_declaration" => (MemberKind::Method, member.child_by_field_name("body")),
                "constructor_declaration" => (MemberKind::Constructor, member.child_by_field_name("body")),
                "static_initializer" => (MemberKind::StaticInitializer, block_child(member)),
                "block" => (MemberKind::InstanceInitializer, Some(member)),
                _ => continue,
            };
            if let Some(member_body) = member_body {
                out.push(Member {
                    kind,
                    node: member,
                    body: member_body,
                    classes: stack.clone(),
                });
            }
        }
        collect(unit, body, stack, out);
        stack.remove(0);
    }
}

fn block_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let block = node.named_children(&mut cursor).find(|n| n.kind() == "block");
    block
}
