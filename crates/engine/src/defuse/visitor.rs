//! One def/use pass over the method-like members of a unit.

use ir::{NodeKind, StatementNode, SyntaxId};
use parsers::{simple_type_name, type_text, JavaUnit, SignatureCatalog};
use std::collections::HashMap;
use tracing::debug;
use tree_sitter::Node;

use super::scope::{Resolution, Scope};
use super::signature::SignatureTable;
use crate::members::{Member, MemberKind};

/// An expression is usable as a variable name unless it is a symbolic
/// marker, a call, an indexed or braced form, an increment, or a prefixed
/// operand.
pub fn is_usable(expr: &str) -> bool {
    !(expr.is_empty()
        || expr.starts_with(['$', '+', '-', '!', '~', '<'])
        || expr.ends_with([')', ']', '}'])
        || expr.ends_with("++")
        || expr.ends_with("--"))
}

fn binary_operator(op: &str) -> &str {
    match op {
        "*" => "$MUL",
        "/" => "$DIV",
        "%" => "$MOD",
        "+" => "$ADD",
        "-" => "$SUB",
        "<<" | ">>" | ">>>" => "$SHIFT",
        "<" | ">" | "<=" | ">=" => "$COMP",
        "==" | "!=" => "$EQL",
        other => other,
    }
}

fn literal_type(expr: &str) -> Option<&'static str> {
    match expr {
        "$INT" => Some("int"),
        "$DBL" => Some("double"),
        "$CHR" => Some("char"),
        "$STR" => Some("String"),
        "$BOL" => Some("boolean"),
        _ => None,
    }
}

fn is_comment(node: &Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|n| !is_comment(n))
        .collect();
    children
}

/// Raw names collected while normalizing one statement.
#[derive(Debug, Default)]
struct Pending {
    defs: Vec<String>,
    uses: Vec<String>,
}

pub(super) struct Pass<'a, 'u> {
    pub unit: &'u JavaUnit,
    pub catalog: &'a SignatureCatalog,
    pub signatures: &'a mut SignatureTable,
    pub facts: &'a mut HashMap<SyntaxId, StatementNode>,
    pub params: &'a mut HashMap<SyntaxId, Vec<StatementNode>>,
    pub scope: Scope,
    /// Signature of the member being visited.
    pub current: Option<usize>,
    pending: Pending,
    pub changed: bool,
}

impl<'a, 'u> Pass<'a, 'u> {
    pub fn new(
        unit: &'u JavaUnit,
        catalog: &'a SignatureCatalog,
        signatures: &'a mut SignatureTable,
        facts: &'a mut HashMap<SyntaxId, StatementNode>,
        params: &'a mut HashMap<SyntaxId, Vec<StatementNode>>,
    ) -> Self {
        Self {
            unit,
            catalog,
            signatures,
            facts,
            params,
            scope: Scope::default(),
            current: None,
            pending: Pending::default(),
            changed: false,
        }
    }

    pub fn member(&mut self, member: &Member<'u>) {
        let unit = self.unit;
        let formal = member.formal_params(unit);
        self.scope.enter(
            formal.iter().map(|p| (p.name.clone(), p.ty.clone())).collect(),
            member.classes.clone(),
        );
        self.current = match member.kind {
            MemberKind::Method | MemberKind::Constructor => {
                let types: Vec<String> = formal.iter().map(|p| p.ty.clone()).collect();
                self.signatures
                    .find_declared(member.class(), &member.name(unit), &types)
            }
            MemberKind::StaticInitializer | MemberKind::InstanceInitializer => None,
        };
        if let Some(key) = unit.id(member.node) {
            self.params.entry(key).or_insert_with(|| {
                formal
                    .iter()
                    .map(|p| {
                        let mut node =
                            StatementNode::new(NodeKind::Param, unit.line(p.node), unit.text(p.node))
                                .with_key(unit.id(p.node))
                                .with_prop("name", p.name.as_str())
                                .with_prop("type", p.ty.as_str());
                        node.add_def(p.name.as_str());
                        node
                    })
                    .collect()
            });
        }
        self.statement(member.body);
    }

    fn statement(&mut self, node: Node<'u>) {
        match node.kind() {
            "block" | "constructor_body" => {
                self.scope.push_frame();
                for child in named_children(node) {
                    self.statement(child);
                }
                self.scope.pop_frame();
            }
            "local_variable_declaration" => {
                let normalized = self.declaration(node);
                self.commit(node, normalized);
            }
            "expression_statement" | "yield_statement" | "return_statement" | "throw_statement" => {
                let normalized = match named_children(node).first() {
                    Some(&expr) => self.operand(expr),
                    None => String::new(),
                };
                self.commit(node, normalized);
            }
            "assert_statement" => {
                let parts: Vec<String> = named_children(node)
                    .into_iter()
                    .map(|e| self.operand(e))
                    .collect();
                self.commit(node, parts.join(" : "));
            }
            "explicit_constructor_invocation" => {
                let normalized = self.constructor_invocation(node);
                self.commit(node, normalized);
            }
            "if_statement" => {
                self.condition(node, node.child_by_field_name("condition"));
                for field in ["consequence", "alternative"] {
                    if let Some(branch) = node.child_by_field_name(field) {
                        self.statement(branch);
                    }
                }
            }
            "while_statement" => {
                self.condition(node, node.child_by_field_name("condition"));
                self.optional(node.child_by_field_name("body"));
            }
            "do_statement" => {
                self.optional(node.child_by_field_name("body"));
                self.condition(node, node.child_by_field_name("condition"));
            }
            "for_statement" => self.for_statement(node),
            "enhanced_for_statement" => self.enhanced_for(node),
            "switch_expression" | "switch_statement" => {
                self.condition(node, node.child_by_field_name("condition"));
                if let Some(body) = node.child_by_field_name("body") {
                    self.scope.push_frame();
                    self.switch_body(body);
                    self.scope.pop_frame();
                }
            }
            "synchronized_statement" => {
                let lock = named_children(node)
                    .into_iter()
                    .find(|n| n.kind() == "parenthesized_expression");
                self.condition(node, lock);
                self.optional(node.child_by_field_name("body"));
            }
            "labeled_statement" => {
                for child in named_children(node).into_iter().skip(1) {
                    self.statement(child);
                }
            }
            "try_statement" | "try_with_resources_statement" => self.try_statement(node),
            "break_statement" | "continue_statement" | "empty_statement" | "line_comment"
            | "block_comment" | "class_declaration" | "interface_declaration"
            | "enum_declaration" | "record_declaration" | "local_class_declaration" => {}
            other => debug!(kind = other, line = self.unit.line(node), "Statement kind not analysed"),
        }
    }

    fn optional(&mut self, node: Option<Node<'u>>) {
        if let Some(n) = node {
            self.statement(n);
        }
    }

    /// Analyses a branch or loop condition, keyed by the owning statement.
    fn condition(&mut self, key: Node<'u>, cond: Option<Node<'u>>) {
        let Some(cond) = cond else {
            return;
        };
        let normalized = self.operand(cond);
        self.commit(key, normalized);
    }

    fn switch_body(&mut self, body: Node<'u>) {
        for child in named_children(body) {
            match child.kind() {
                "switch_block_statement_group" | "switch_rule" => {
                    for stmt in named_children(child) {
                        if stmt.kind() != "switch_label" {
                            self.statement(stmt);
                        }
                    }
                }
                "switch_label" => {}
                _ => self.statement(child),
            }
        }
    }

    fn for_statement(&mut self, node: Node<'u>) {
        let mut cursor = node.walk();
        let inits: Vec<_> = node.children_by_field_name("init", &mut cursor).collect();
        let updates: Vec<_> = node.children_by_field_name("update", &mut cursor).collect();
        self.scope.push_frame();
        if let Some(&first) = inits.first() {
            let parts: Vec<String> = inits
                .iter()
                .map(|&init| {
                    if init.kind() == "local_variable_declaration" {
                        self.declaration(init)
                    } else {
                        self.operand(init)
                    }
                })
                .collect();
            self.commit(first, parts.join(", "));
        }
        if let Some(cond) = node.child_by_field_name("condition") {
            self.condition(cond, Some(cond));
        }
        self.optional(node.child_by_field_name("body"));
        if let Some(&first) = updates.first() {
            let parts: Vec<String> = updates.iter().map(|&u| self.operand(u)).collect();
            self.commit(first, parts.join(", "));
        }
        self.scope.pop_frame();
    }

    fn enhanced_for(&mut self, node: Node<'u>) {
        let unit = self.unit;
        self.scope.push_frame();
        let ty = node
            .child_by_field_name("type")
            .map(|t| type_text(unit, t))
            .unwrap_or_default();
        let name = node
            .child_by_field_name("name")
            .map(|n| unit.text(n))
            .unwrap_or_default();
        self.scope.declare(name, &ty);
        self.def(name);
        let value = match node.child_by_field_name("value") {
            Some(v) => self.operand(v),
            None => String::new(),
        };
        self.commit(node, format!("{ty} {name} : {value}"));
        self.optional(node.child_by_field_name("body"));
        self.scope.pop_frame();
    }

    fn try_statement(&mut self, node: Node<'u>) {
        let unit = self.unit;
        self.scope.push_frame();
        if let Some(list) = node.child_by_field_name("resources") {
            for resource in named_children(list) {
                if resource.kind() != "resource" {
                    continue;
                }
                let normalized = match (
                    resource.child_by_field_name("name"),
                    resource.child_by_field_name("value"),
                ) {
                    (Some(name), Some(value)) => {
                        let ty = resource
                            .child_by_field_name("type")
                            .map(|t| type_text(unit, t))
                            .unwrap_or_default();
                        let name = unit.text(name);
                        self.scope.declare(name, &ty);
                        let init = self.operand(value);
                        self.def(name);
                        format!("$VAR {name} $INIT {init}")
                    }
                    _ => match named_children(resource).first() {
                        Some(&expr) => self.operand(expr),
                        None => String::new(),
                    },
                };
                self.commit(resource, normalized);
            }
        }
        self.optional(node.child_by_field_name("body"));
        for child in named_children(node) {
            match child.kind() {
                "catch_clause" => self.catch_clause(child),
                "finally_clause" => {
                    for block in named_children(child) {
                        self.statement(block);
                    }
                }
                _ => {}
            }
        }
        self.scope.pop_frame();
    }

    fn catch_clause(&mut self, clause: Node<'u>) {
        let unit = self.unit;
        self.scope.push_frame();
        if let Some(param) = named_children(clause)
            .into_iter()
            .find(|n| n.kind() == "catch_formal_parameter")
        {
            let ty = named_children(param)
                .into_iter()
                .find(|n| n.kind() == "catch_type")
                .map(|t| type_text(unit, t))
                .unwrap_or_default();
            if let Some(name) = param.child_by_field_name("name") {
                let name = unit.text(name);
                self.scope.declare(name, &ty);
                self.def(name);
                self.commit(clause, format!("$VAR {name}"));
            }
        }
        self.optional(clause.child_by_field_name("body"));
        self.scope.pop_frame();
    }

    /// Declares the locals of a declaration, then analyses the
    /// initializers.
    fn declaration(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        let ty = node
            .child_by_field_name("type")
            .map(|t| type_text(unit, t))
            .unwrap_or_default();
        let mut cursor = node.walk();
        let declarators: Vec<_> = node.children_by_field_name("declarator", &mut cursor).collect();
        let mut names = Vec::with_capacity(declarators.len());
        for decl in &declarators {
            let name = decl
                .child_by_field_name("name")
                .map(|n| unit.text(n))
                .unwrap_or_default();
            let dims = decl
                .child_by_field_name("dimensions")
                .map(|d| type_text(unit, d))
                .unwrap_or_default();
            self.scope.declare(name, &format!("{ty}{dims}"));
            names.push(name);
        }
        let parts: Vec<String> = declarators
            .iter()
            .zip(names)
            .map(|(decl, name)| match decl.child_by_field_name("value") {
                Some(value) => {
                    let init = self.operand(value);
                    self.def(name);
                    format!("$VAR {name} $INIT {init}")
                }
                None => format!("$VAR {name}"),
            })
            .collect();
        parts.join(", ")
    }

    fn constructor_invocation(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        let keyword = node
            .child_by_field_name("constructor")
            .map(|n| unit.text(n))
            .unwrap_or("this");
        let args = self.arguments(node.child_by_field_name("arguments"));
        let class = match keyword {
            "super" => self
                .scope
                .class()
                .and_then(|c| self.catalog.class(c))
                .and_then(|c| c.extends.as_deref())
                .map(|s| simple_type_name(s).to_string()),
            _ => self.scope.class().map(str::to_string),
        };
        if let Some(class) = class {
            if let Some(ctor) = self.lookup_constructor(&class, &args) {
                self.define_out_args(ctor, &args);
            }
        }
        format!("{keyword}({})", args.join(", "))
    }

    /// Normalizes `node` and records it as a use when usable.
    fn operand(&mut self, node: Node<'u>) -> String {
        let expr = self.expr(node);
        self.use_if_usable(&expr);
        expr
    }

    fn use_if_usable(&mut self, expr: &str) {
        if is_usable(expr) {
            self.pending.uses.push(expr.to_string());
        }
    }

    fn def(&mut self, name: &str) {
        if is_usable(name) {
            self.pending.defs.push(name.to_string());
        }
    }

    /// Symbolic form of an expression; records the uses and definitions of
    /// its operands.
    fn expr(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        match node.kind() {
            "identifier" | "this" | "super" | "scoped_identifier" | "type_identifier" => {
                unit.text(node).to_string()
            }
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" => "$INT".to_string(),
            "decimal_floating_point_literal" | "hex_floating_point_literal" => "$DBL".to_string(),
            "character_literal" => "$CHR".to_string(),
            "string_literal" | "text_block" => "$STR".to_string(),
            "true" | "false" => "$BOL".to_string(),
            "null_literal" => "$NUL".to_string(),
            "class_literal" => "$CLS".to_string(),
            "lambda_expression" => "$LAMBDA".to_string(),
            "method_reference" => "$MREF".to_string(),
            "field_access" => {
                let object = node
                    .child_by_field_name("object")
                    .map(|o| self.expr(o))
                    .unwrap_or_default();
                let field = node
                    .child_by_field_name("field")
                    .map(|f| unit.text(f))
                    .unwrap_or_default();
                format!("{object}.{field}")
            }
            "array_access" => {
                let array = self.optional_operand(node.child_by_field_name("array"));
                let index = self.optional_operand(node.child_by_field_name("index"));
                format!("{array}[{index}]")
            }
            "parenthesized_expression" | "condition" => {
                let inner = match named_children(node).first() {
                    Some(&e) => self.operand(e),
                    None => String::new(),
                };
                format!("({inner})")
            }
            "cast_expression" => {
                let ty = node
                    .child_by_field_name("type")
                    .map(|t| type_text(unit, t))
                    .unwrap_or_default();
                let value = self.optional_operand(node.child_by_field_name("value"));
                format!("$CAST({ty}) {value}")
            }
            "binary_expression" => {
                let left = self.optional_operand(node.child_by_field_name("left"));
                let right = self.optional_operand(node.child_by_field_name("right"));
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| unit.text(o))
                    .unwrap_or_default();
                format!("({left} {} {right})", binary_operator(op))
            }
            "instanceof_expression" => self.instanceof(node),
            "assignment_expression" => {
                let left = node
                    .child_by_field_name("left")
                    .map(|l| self.expr(l))
                    .unwrap_or_default();
                let right = self.optional_operand(node.child_by_field_name("right"));
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| unit.text(o))
                    .unwrap_or("=");
                if is_usable(&left) {
                    self.def(&left);
                    if op != "=" {
                        self.pending.uses.push(left.clone());
                    }
                }
                format!("({left} $ASSIGN {right})")
            }
            "update_expression" => {
                let prefix = node
                    .child(0)
                    .map(|c| matches!(c.kind(), "++" | "--"))
                    .unwrap_or(false);
                let op = if unit.text(node).contains("++") { "++" } else { "--" };
                let operand = match named_children(node).first() {
                    Some(&e) => self.expr(e),
                    None => String::new(),
                };
                if is_usable(&operand) {
                    self.pending.uses.push(operand.clone());
                    self.def(&operand);
                }
                if prefix {
                    format!("{op}{operand}")
                } else {
                    format!("{operand}{op}")
                }
            }
            "unary_expression" => {
                let operand = self.optional_operand(node.child_by_field_name("operand"));
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| unit.text(o))
                    .unwrap_or_default();
                format!("{op}{operand}")
            }
            "ternary_expression" => {
                let cond = self.optional_operand(node.child_by_field_name("condition"));
                let then = self.optional_operand(node.child_by_field_name("consequence"));
                let other = self.optional_operand(node.child_by_field_name("alternative"));
                format!("{cond} ? {then} : {other}")
            }
            "method_invocation" => self.method_call(node),
            "object_creation_expression" => self.object_creation(node),
            "array_creation_expression" => self.array_creation(node),
            "array_initializer" => self.array_initializer(node),
            _ => unit.text(node).to_string(),
        }
    }

    fn optional_operand(&mut self, node: Option<Node<'u>>) -> String {
        match node {
            Some(n) => self.operand(n),
            None => String::new(),
        }
    }

    fn instanceof(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        let left = self.optional_operand(node.child_by_field_name("left"));
        let ty = node
            .child_by_field_name("right")
            .map(|t| type_text(unit, t))
            .unwrap_or_default();
        // Pattern binding: `x instanceof Foo f` declares `f`.
        if let Some(binding) = node.child_by_field_name("name") {
            let name = unit.text(binding);
            self.scope.declare(name, &ty);
            self.def(name);
        }
        format!("({left} $INSTANCE {ty})")
    }

    fn arguments(&mut self, node: Option<Node<'u>>) -> Vec<String> {
        let Some(node) = node else {
            return Vec::new();
        };
        named_children(node)
            .into_iter()
            .map(|arg| self.operand(arg))
            .collect()
    }

    fn method_call(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        let name = node
            .child_by_field_name("name")
            .map(|n| unit.text(n))
            .unwrap_or_default();
        let callee = node.child_by_field_name("object").map(|o| self.operand(o));
        let args = self.arguments(node.child_by_field_name("arguments"));
        if let Some(id) = self.lookup_call(callee.as_deref(), name, &args) {
            if self.signatures.get(id).mutates_state {
                if let Some(callee) = &callee {
                    self.def(callee);
                }
            }
            self.define_out_args(id, &args);
        }
        match callee {
            Some(callee) => format!("{callee}.{name}({})", args.join(", ")),
            None => format!("{name}({})", args.join(", ")),
        }
    }

    fn object_creation(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        let ty = node
            .child_by_field_name("type")
            .map(|t| type_text(unit, t))
            .unwrap_or_default();
        let creator = simple_type_name(&ty).to_string();
        let args = self.arguments(node.child_by_field_name("arguments"));
        if let Some(ctor) = self.lookup_constructor(&creator, &args) {
            self.define_out_args(ctor, &args);
        }
        format!("$NEW {creator}({})", args.join(", "))
    }

    fn array_creation(&mut self, node: Node<'u>) -> String {
        let unit = self.unit;
        let ty = node
            .child_by_field_name("type")
            .map(|t| simple_type_name(unit.text(t)).to_string())
            .unwrap_or_default();
        if let Some(init) = node.child_by_field_name("value") {
            let init = self.array_initializer(init);
            return format!("$NEW {ty}{init}");
        }
        let mut dims = String::new();
        for child in named_children(node) {
            if child.kind() == "dimensions_expr" {
                let size = match named_children(child).first() {
                    Some(&e) => self.operand(e),
                    None => String::new(),
                };
                dims.push_str(&format!("[{size}]"));
            }
        }
        format!("$NEW {ty}{dims}")
    }

    fn array_initializer(&mut self, node: Node<'u>) -> String {
        let mut out = String::from("{ ");
        for element in named_children(node) {
            let e = self.operand(element);
            out.push_str(&e);
            out.push_str(", ");
        }
        out.push_str(" }");
        out
    }

    fn define_out_args(&mut self, sig: usize, args: &[String]) {
        let flags = self.signatures.get(sig).out_args.clone();
        for (arg, out) in args.iter().zip(flags) {
            if out {
                self.def(arg);
            }
        }
    }

    /// Declared type of a normalized operand, if known.
    fn type_of(&self, expr: &str) -> Option<String> {
        if let Some(ty) = literal_type(expr) {
            return Some(ty.to_string());
        }
        self.scope.type_of(self.catalog, expr)
    }

    fn types_match(&self, sig: usize, args: &[String]) -> bool {
        let sig = self.signatures.get(sig);
        sig.param_types.len() == args.len()
            && sig
                .param_types
                .iter()
                .zip(args)
                .all(|(param, arg)| self.type_of(arg).map_or(true, |ty| &ty == param))
    }

    /// Resolves a call site to a signature of the unit.
    fn lookup_call(&self, callee: Option<&str>, name: &str, args: &[String]) -> Option<usize> {
        let candidates = self.signatures.candidates(name);
        match candidates {
            [] => None,
            [single] => (self.signatures.get(*single).param_types.len() == args.len()).then_some(*single),
            many => match callee {
                None => many.iter().copied().find(|&id| {
                    let sig = self.signatures.get(id);
                    sig.package == self.catalog.package
                        && self.scope.classes().contains(&sig.class)
                        && self.types_match(id, args)
                }),
                Some(callee) => {
                    let ty = self.type_of(callee)?;
                    let class = self.catalog.class_for_type(&ty)?;
                    if !class.has_method(name) {
                        return None;
                    }
                    many.iter().copied().find(|&id| {
                        let sig = self.signatures.get(id);
                        sig.package == class.package && sig.class == class.name && self.types_match(id, args)
                    })
                }
            },
        }
    }

    fn lookup_constructor(&self, class: &str, args: &[String]) -> Option<usize> {
        self.signatures.candidates(class).iter().copied().find(|&id| {
            let sig = self.signatures.get(id);
            sig.is_constructor() && sig.class == class && self.types_match(id, args)
        })
    }

    /// Canonical name of a resolved use, `None` when unresolved.
    fn canonical(&self, name: &str) -> Option<String> {
        match self.scope.resolve(self.catalog, name) {
            Resolution::Param(_) | Resolution::Local | Resolution::OuterField => Some(name.to_string()),
            Resolution::Field(field) => Some(format!("$THIS.{field}")),
            Resolution::Unresolved => {
                debug!(name, "Name not resolved");
                None
            }
        }
    }

    /// Resolves a definition and refines the mutation hints of the current
    /// member's signature.
    fn resolve_def(&mut self, name: &str) -> Option<String> {
        match self.scope.resolve(self.catalog, name) {
            Resolution::Param(pos) => {
                if let Some(sig) = self.current {
                    self.changed |= self.signatures.mark_out_arg(sig, pos);
                }
                Some(name.to_string())
            }
            Resolution::Field(field) => {
                if let Some(sig) = self.current {
                    self.changed |= self.signatures.mark_mutates(sig);
                }
                Some(format!("$THIS.{field}"))
            }
            Resolution::Local | Resolution::OuterField => Some(name.to_string()),
            Resolution::Unresolved => {
                debug!(name, "Definition not resolved");
                None
            }
        }
    }

    /// Resolves the pending names and merges them into the fact keyed by
    /// `key`.
    fn commit(&mut self, key: Node<'u>, normalized: String) {
        let pending = std::mem::take(&mut self.pending);
        let unit = self.unit;
        let Some(id) = unit.id(key) else {
            return;
        };
        let defs: Vec<String> = pending
            .defs
            .iter()
            .filter_map(|d| self.resolve_def(d))
            .collect();
        let uses: Vec<String> = pending
            .uses
            .iter()
            .filter_map(|u| self.canonical(u))
            .collect();
        let flows: Vec<String> = defs.iter().filter(|d| uses.contains(d)).cloned().collect();

        let fact = self.facts.entry(id).or_insert_with(|| {
            StatementNode::new(NodeKind::Statement, unit.line(key), unit.text(key)).with_key(Some(id))
        });
        let mut grew = false;
        for d in defs {
            grew |= fact.add_def(d);
        }
        for u in uses {
            grew |= fact.add_use(u);
        }
        for f in flows {
            grew |= fact.add_self_flow(f);
        }
        fact.normalized = Some(normalized);
        self.changed |= grew;
    }
}
