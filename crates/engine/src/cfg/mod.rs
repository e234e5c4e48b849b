//! Control flow graphs for Java method bodies.
//!
//! The builder visits one method-like member at a time. Every statement
//! handler receives the *open ends* of the graph built so far, that is the
//! nodes still waiting for a successor together with the label of the
//! pending edge, connects them to the first node it creates and returns the
//! open ends it leaves behind. Statements that never complete normally
//! (`return`, `throw`, `break`, `continue`) return no open ends.

use ir::{ControlFlowGraph, ControlLabel, NodeId, NodeKind, StatementNode};
use parsers::{type_text, JavaUnit};
use std::collections::HashSet;
use tracing::debug;
use tree_sitter::Node;

use crate::members::{members, Member, MemberKind};

type OpenEnds = Vec<(NodeId, ControlLabel)>;

const EPSILON: ControlLabel = ControlLabel::Epsilon;

/// Builds one control flow graph per method, constructor and initializer
/// block of every class declared in `unit`.
pub fn build_cfg(unit: &JavaUnit) -> Vec<ControlFlowGraph> {
    let graphs: Vec<_> = members(unit)
        .iter()
        .map(|m| build_member(unit, m))
        .collect();
    debug!(file = unit.path(), graphs = graphs.len(), "Control flow graphs built");
    graphs
}

fn build_member<'u>(unit: &'u JavaUnit, member: &Member<'u>) -> ControlFlowGraph {
    let mut builder = MethodBuilder::new(unit, member.qualified_name(unit));
    let entry = builder.entry(member);
    builder.statement(member.body, vec![(entry, EPSILON)]);
    builder.finish()
}

/// Targets of `break` and `continue` inside a loop, switch or labeled
/// statement.
struct JumpScope {
    label: Option<String>,
    break_target: NodeId,
    continue_target: Option<NodeId>,
}

struct SwitchGroup<'t> {
    labels: Vec<Node<'t>>,
    statements: Vec<Node<'t>>,
    arrow: bool,
}

struct CaseChain {
    head: NodeId,
    last_case: Option<NodeId>,
    default: Option<NodeId>,
}

struct MethodBuilder<'u> {
    unit: &'u JavaUnit,
    cfg: ControlFlowGraph,
    scopes: Vec<JumpScope>,
    catches: HashSet<NodeId>,
    /// `return` and `throw` nodes not yet routed through a `finally`.
    terminals: Vec<NodeId>,
}

impl<'u> MethodBuilder<'u> {
    fn new(unit: &'u JavaUnit, name: String) -> Self {
        Self {
            unit,
            cfg: ControlFlowGraph::new(name),
            scopes: Vec::new(),
            catches: HashSet::new(),
            terminals: Vec::new(),
        }
    }

    fn finish(mut self) -> ControlFlowGraph {
        let removed = self.cfg.retain_reachable();
        if removed > 0 {
            debug!(graph = %self.cfg.name, removed, "Unreachable nodes dropped");
        }
        self.cfg
    }

    fn entry(&mut self, member: &Member<'u>) -> NodeId {
        let unit = self.unit;
        let name = member.name(unit);
        let line = unit.line(member.node);
        let params = member.parameters().map(|p| unit.text(p)).unwrap_or("()");
        let node = match member.kind {
            MemberKind::Method => {
                let ret = member.return_type(unit).unwrap_or_default();
                StatementNode::new(NodeKind::Entry, line, format!("{ret} {name}{params}"))
                    .with_prop("type", ret)
            }
            MemberKind::Constructor => {
                StatementNode::new(NodeKind::Entry, line, format!("{name} {params}"))
            }
            MemberKind::StaticInitializer => StatementNode::new(NodeKind::Entry, line, "static"),
            MemberKind::InstanceInitializer => StatementNode::new(NodeKind::Entry, 0, "block"),
        };
        let node = node
            .with_key(unit.id(member.node))
            .with_prop("name", name)
            .with_prop("class", member.class())
            .with_prop("params", params);
        let id = self.cfg.add_node(node);
        self.cfg.entry = id;
        id
    }

    fn connect(&mut self, ends: &[(NodeId, ControlLabel)], target: NodeId) {
        for &(source, label) in ends {
            self.cfg.add_edge(source, target, label);
        }
    }

    /// Adds `node` and connects the incoming open ends to it.
    fn open(&mut self, node: StatementNode, incoming: &[(NodeId, ControlLabel)]) -> NodeId {
        let id = self.cfg.add_node(node);
        self.connect(incoming, id);
        id
    }

    fn stmt_node(&self, node: Node<'u>, code: impl Into<String>) -> StatementNode {
        StatementNode::new(NodeKind::Statement, self.unit.line(node), code).with_key(self.unit.id(node))
    }

    fn synthetic(&mut self, marker: &str, line: usize) -> NodeId {
        self.cfg
            .add_node(StatementNode::synthetic(format!("{marker}:{line}")))
    }

    fn statement(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        match node.kind() {
            "block" | "constructor_body" => self.sequence(&statements_of(node), incoming),
            "expression_statement"
            | "local_variable_declaration"
            | "explicit_constructor_invocation"
            | "assert_statement"
            | "yield_statement" => {
                let code = self.unit.text(node).to_string();
                let stmt = self.stmt_node(node, code);
                let id = self.open(stmt, &incoming);
                vec![(id, EPSILON)]
            }
            "if_statement" => self.if_statement(node, incoming),
            "while_statement" => self.while_statement(node, incoming),
            "do_statement" => self.do_statement(node, incoming),
            "for_statement" => self.for_statement(node, incoming),
            "enhanced_for_statement" => self.enhanced_for(node, incoming),
            "switch_expression" | "switch_statement" => self.switch(node, incoming),
            "labeled_statement" => self.labeled(node, incoming),
            "break_statement" => self.jump(node, incoming, true),
            "continue_statement" => self.jump(node, incoming, false),
            "return_statement" | "throw_statement" => {
                let code = self.unit.text(node).to_string();
                let stmt = self.stmt_node(node, code);
                let id = self.open(stmt, &incoming);
                self.terminals.push(id);
                Vec::new()
            }
            "synchronized_statement" => self.synchronized(node, incoming),
            "try_statement" | "try_with_resources_statement" => self.try_statement(node, incoming),
            "empty_statement" | "line_comment" | "block_comment" | "class_declaration"
            | "interface_declaration" | "enum_declaration" | "record_declaration"
            | "local_class_declaration" => incoming,
            other => {
                debug!(kind = other, line = self.unit.line(node), "Statement kind skipped");
                incoming
            }
        }
    }

    fn sequence(&mut self, statements: &[Node<'u>], incoming: OpenEnds) -> OpenEnds {
        let mut ends = incoming;
        for &stmt in statements {
            ends = self.statement(stmt, ends);
        }
        ends
    }

    fn body(&mut self, node: Option<Node<'u>>, incoming: OpenEnds) -> OpenEnds {
        match node {
            Some(n) => self.statement(n, incoming),
            None => incoming,
        }
    }

    fn if_statement(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let cond = field_text(unit, node, "condition");
        let head = self.stmt_node(node, format!("if {cond}"));
        let head = self.open(head, &incoming);
        let end = self.synthetic("end-if", unit.line(node));
        let mut tails = self.body(node.child_by_field_name("consequence"), vec![(head, ControlLabel::True)]);
        match node.child_by_field_name("alternative") {
            Some(alt) => tails.extend(self.statement(alt, vec![(head, ControlLabel::False)])),
            None => tails.push((head, ControlLabel::False)),
        }
        self.connect(&tails, end);
        vec![(end, EPSILON)]
    }

    fn while_statement(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let cond = field_text(unit, node, "condition");
        let head = self.stmt_node(node, format!("while {cond}"));
        let head = self.open(head, &incoming);
        let end = self.synthetic("end-while", unit.line(node));
        self.cfg.add_edge(head, end, ControlLabel::False);
        let tails = self.loop_body(
            node.child_by_field_name("body"),
            vec![(head, ControlLabel::True)],
            end,
            head,
        );
        self.connect(&tails, head);
        vec![(end, EPSILON)]
    }

    fn do_statement(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let do_node = StatementNode::new(NodeKind::Statement, unit.line(node), "do");
        let do_node = self.open(do_node, &incoming);
        let cond = node.child_by_field_name("condition");
        let while_line = cond.map(|c| unit.line(c)).unwrap_or_else(|| unit.line(node));
        let code = format!("while {}", cond.map(|c| unit.text(c)).unwrap_or(""));
        let while_node = self.cfg.add_node(
            StatementNode::new(NodeKind::Statement, while_line, code).with_key(unit.id(node)),
        );
        let end = self.synthetic("end-do-while", while_line);
        let tails = self.loop_body(
            node.child_by_field_name("body"),
            vec![(do_node, EPSILON)],
            end,
            while_node,
        );
        self.connect(&tails, while_node);
        self.cfg.add_edge(while_node, do_node, ControlLabel::True);
        self.cfg.add_edge(while_node, end, ControlLabel::False);
        vec![(end, EPSILON)]
    }

    fn for_statement(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let mut cursor = node.walk();
        let inits: Vec<_> = node.children_by_field_name("init", &mut cursor).collect();
        let updates: Vec<_> = node.children_by_field_name("update", &mut cursor).collect();
        let cond = node.child_by_field_name("condition");

        let mut ends = incoming;
        if let Some(&first) = inits.first() {
            let init = StatementNode::new(NodeKind::Statement, unit.line(first), joined(unit, &inits))
                .with_key(unit.id(first));
            let init = self.open(init, &ends);
            ends = vec![(init, EPSILON)];
        }
        let head = match cond {
            Some(c) => StatementNode::new(
                NodeKind::Statement,
                unit.line(c),
                format!("for ({})", unit.text(c)),
            )
            .with_key(unit.id(c)),
            None => StatementNode::new(NodeKind::Statement, unit.line(node), "for ( ; )"),
        };
        let head_line = head.line;
        let head = self.open(head, &ends);
        let update = match updates.first() {
            Some(&first) => StatementNode::new(NodeKind::Statement, unit.line(first), joined(unit, &updates))
                .with_key(unit.id(first)),
            None => StatementNode::new(NodeKind::Statement, unit.line(node), " ; "),
        };
        let update = self.cfg.add_node(update);
        let end = self.synthetic("end-for", head_line);
        self.cfg.add_edge(head, end, ControlLabel::False);
        let tails = self.loop_body(
            node.child_by_field_name("body"),
            vec![(head, ControlLabel::True)],
            end,
            update,
        );
        self.connect(&tails, update);
        self.cfg.add_edge(update, head, EPSILON);
        vec![(end, EPSILON)]
    }

    fn enhanced_for(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let head = self.stmt_node(node, format!("for ({})", enhanced_for_control(unit, node)));
        let head = self.open(head, &incoming);
        let end = self.synthetic("end-for", unit.line(node));
        self.cfg.add_edge(head, end, ControlLabel::False);
        let tails = self.loop_body(
            node.child_by_field_name("body"),
            vec![(head, ControlLabel::True)],
            end,
            head,
        );
        self.connect(&tails, head);
        vec![(end, EPSILON)]
    }

    /// Visits a loop body with `break` routed to `end` and `continue` to
    /// `next`.
    fn loop_body(&mut self, body: Option<Node<'u>>, seed: OpenEnds, end: NodeId, next: NodeId) -> OpenEnds {
        self.scopes.push(JumpScope {
            label: None,
            break_target: end,
            continue_target: Some(next),
        });
        let tails = self.body(body, seed);
        self.scopes.pop();
        tails
    }

    fn switch(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let cond = field_text(unit, node, "condition");
        let head = self.stmt_node(node, format!("switch {cond}"));
        let head = self.open(head, &incoming);
        let end = self.synthetic("end-switch", unit.line(node));
        let groups = node
            .child_by_field_name("body")
            .map(switch_groups)
            .unwrap_or_default();

        self.scopes.push(JumpScope {
            label: None,
            break_target: end,
            continue_target: None,
        });
        let mut chain = CaseChain {
            head,
            last_case: None,
            default: None,
        };
        let mut fallthrough = Vec::new();
        let mut exits = Vec::new();
        for group in groups {
            let entries: OpenEnds = group
                .labels
                .iter()
                .map(|&label| self.case_label(label, group.arrow, &mut chain))
                .collect();
            if group.arrow {
                exits.extend(self.sequence(&group.statements, entries));
            } else {
                let mut incoming = std::mem::take(&mut fallthrough);
                incoming.extend(entries);
                fallthrough = self.sequence(&group.statements, incoming);
            }
        }
        self.scopes.pop();
        exits.extend(fallthrough);

        match (chain.last_case, chain.default) {
            (Some(last), Some(default)) => self.cfg.add_edge(last, default, ControlLabel::False),
            (Some(last), None) => self.cfg.add_edge(last, end, ControlLabel::False),
            (None, Some(default)) => self.cfg.add_edge(head, default, EPSILON),
            (None, None) => self.cfg.add_edge(head, end, EPSILON),
        }
        self.connect(&exits, end);
        vec![(end, EPSILON)]
    }

    /// Creates a case label node, chains it after the previous case and
    /// returns the open end leading into the case body.
    fn case_label(&mut self, label: Node<'u>, arrow: bool, chain: &mut CaseChain) -> (NodeId, ControlLabel) {
        let unit = self.unit;
        let text = unit.text(label).trim();
        let code = if arrow { format!("{text} ->") } else { format!("{text}:") };
        let id = self
            .cfg
            .add_node(StatementNode::new(NodeKind::Statement, unit.line(label), code));
        if text.starts_with("default") {
            chain.default = Some(id);
            return (id, EPSILON);
        }
        match chain.last_case {
            Some(prev) => self.cfg.add_edge(prev, id, ControlLabel::False),
            None => self.cfg.add_edge(chain.head, id, EPSILON),
        }
        chain.last_case = Some(id);
        (id, ControlLabel::True)
    }

    fn labeled(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|n| !is_comment(n))
            .collect();
        let Some(label) = children.first().filter(|n| n.kind() == "identifier") else {
            return incoming;
        };
        let name = unit.text(*label).to_string();
        let start = StatementNode::new(NodeKind::Statement, unit.line(node), format!("{name}: "));
        let start = self.open(start, &incoming);
        let end = self.synthetic("end-label", unit.line(node));
        self.scopes.push(JumpScope {
            label: Some(name),
            break_target: end,
            continue_target: Some(start),
        });
        let tails = self.body(children.get(1).copied(), vec![(start, EPSILON)]);
        self.scopes.pop();
        self.connect(&tails, end);
        vec![(end, EPSILON)]
    }

    fn jump(&mut self, node: Node<'u>, incoming: OpenEnds, is_break: bool) -> OpenEnds {
        let unit = self.unit;
        let stmt = self.stmt_node(node, unit.text(node));
        let id = self.open(stmt, &incoming);
        let mut cursor = node.walk();
        let label = node
            .named_children(&mut cursor)
            .find(|n| n.kind() == "identifier")
            .map(|n| unit.text(n));
        match self.jump_target(label, is_break) {
            Some(target) => self.cfg.add_edge(id, target, EPSILON),
            None => debug!(line = unit.line(node), label = ?label, "Jump target not found"),
        }
        Vec::new()
    }

    fn jump_target(&self, label: Option<&str>, is_break: bool) -> Option<NodeId> {
        self.scopes.iter().rev().find_map(|scope| {
            let matches = match label {
                Some(l) => scope.label.as_deref() == Some(l),
                None => scope.label.is_none(),
            };
            if !matches {
                None
            } else if is_break {
                Some(scope.break_target)
            } else {
                scope.continue_target
            }
        })
    }

    fn synchronized(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let mut cursor = node.walk();
        let lock = node
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parenthesized_expression")
            .map(|n| unit.text(n))
            .unwrap_or("");
        let head = self.stmt_node(node, format!("synchronized {lock}"));
        let head = self.open(head, &incoming);
        let end = self.synthetic("end-synchronized", unit.line(node));
        let tails = self.body(node.child_by_field_name("body"), vec![(head, EPSILON)]);
        self.connect(&tails, end);
        vec![(end, EPSILON)]
    }

    fn try_statement(&mut self, node: Node<'u>, incoming: OpenEnds) -> OpenEnds {
        let unit = self.unit;
        let line = unit.line(node);
        let try_node = StatementNode::new(NodeKind::Statement, line, "try");
        let try_node = self.open(try_node, &incoming);
        let end_try = self.synthetic("end-try", line);

        let mut ends = vec![(try_node, EPSILON)];
        if let Some(list) = node.child_by_field_name("resources") {
            let mut cursor = list.walk();
            let resources: Vec<_> = list
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "resource")
                .collect();
            for resource in resources {
                let stmt = self.stmt_node(resource, unit.text(resource));
                let id = self.open(stmt, &ends);
                ends = vec![(id, EPSILON)];
            }
        }
        let tails = self.body(node.child_by_field_name("body"), ends);
        self.connect(&tails, end_try);
        let region_end = self.cfg.nodes.len();

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        let clauses: Vec<_> = children
            .iter()
            .copied()
            .filter(|n| n.kind() == "catch_clause")
            .collect();
        if !clauses.is_empty() {
            let uncaught: Vec<NodeId> = (try_node + 1..region_end)
                .filter(|&id| !self.cfg.nodes[id].is_synthetic())
                .filter(|&id| !self.cfg.successors(id).any(|(t, _)| self.catches.contains(&t)))
                .collect();
            let end_catch = self.synthetic("end-catch", line);
            for clause in clauses {
                let stmt = self.stmt_node(clause, catch_code(unit, clause));
                let catch_node = self.cfg.add_node(stmt);
                self.catches.insert(catch_node);
                for &n in &uncaught {
                    self.cfg.add_edge(n, catch_node, EPSILON);
                }
                let tails = self.body(clause.child_by_field_name("body"), vec![(catch_node, EPSILON)]);
                self.connect(&tails, end_catch);
            }
            self.cfg.add_edge(end_catch, end_try, EPSILON);
        }

        let Some(finally) = children.iter().copied().find(|n| n.kind() == "finally_clause") else {
            return vec![(end_try, EPSILON)];
        };
        let fin = StatementNode::new(NodeKind::Statement, unit.line(finally), "finally");
        let fin = self.cfg.add_node(fin);
        self.cfg.add_edge(end_try, fin, EPSILON);
        let routed: Vec<NodeId> = self
            .terminals
            .iter()
            .copied()
            .filter(|&t| t > try_node)
            .collect();
        self.terminals.retain(|&t| t < try_node);
        for t in routed {
            self.cfg.add_edge(t, fin, EPSILON);
        }
        let mut cursor = finally.walk();
        let block = finally.named_children(&mut cursor).find(|n| n.kind() == "block");
        let tails = self.body(block, vec![(fin, EPSILON)]);
        let end_finally = self.synthetic("end-finally", line);
        self.connect(&tails, end_finally);
        vec![(end_finally, EPSILON)]
    }
}

fn is_comment(node: &Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

fn statements_of(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let stmts = node
        .named_children(&mut cursor)
        .filter(|n| !is_comment(n))
        .collect();
    stmts
}

fn field_text<'a>(unit: &'a JavaUnit, node: Node<'_>, field: &str) -> &'a str {
    node.child_by_field_name(field)
        .map(|n| unit.text(n))
        .unwrap_or("")
}

/// Texts of `for` init or update parts joined into one node label.
fn joined(unit: &JavaUnit, parts: &[Node<'_>]) -> String {
    parts
        .iter()
        .map(|n| unit.text(*n).trim().trim_end_matches(';').trim_end())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Type var : expr` of an enhanced for statement, as written.
fn enhanced_for_control<'a>(unit: &'a JavaUnit, node: Node<'_>) -> &'a str {
    let mut cursor = node.walk();
    let start = node
        .named_children(&mut cursor)
        .find(|n| !is_comment(n))
        .map(|n| n.start_byte());
    let end = node.child_by_field_name("value").map(|n| n.end_byte());
    match (start, end) {
        (Some(s), Some(e)) if s <= e => unit.source().get(s..e).unwrap_or(""),
        _ => "",
    }
}

fn catch_code(unit: &JavaUnit, clause: Node<'_>) -> String {
    let mut cursor = clause.walk();
    let param = clause
        .named_children(&mut cursor)
        .find(|n| n.kind() == "catch_formal_parameter");
    let Some(param) = param else {
        return "catch".to_string();
    };
    let mut inner = param.walk();
    let ty = param
        .named_children(&mut inner)
        .find(|n| n.kind() == "catch_type")
        .map(|t| type_text(unit, t))
        .unwrap_or_default();
    let name = param
        .child_by_field_name("name")
        .map(|n| unit.text(n))
        .unwrap_or("");
    format!("catch ({ty} {name})")
}

/// Splits a switch block into label groups. Handles statement groups,
/// arrow rules and blocks whose labels and statements are direct children.
fn switch_groups(body: Node<'_>) -> Vec<SwitchGroup<'_>> {
    let mut groups: Vec<SwitchGroup<'_>> = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            "switch_block_statement_group" => {
                let mut inner = child.walk();
                let (labels, statements): (Vec<_>, Vec<_>) = child
                    .named_children(&mut inner)
                    .filter(|n| !is_comment(n))
                    .partition(|n| n.kind() == "switch_label");
                groups.push(SwitchGroup {
                    labels,
                    statements,
                    arrow: false,
                });
            }
            "switch_rule" => {
                let mut inner = child.walk();
                let (labels, statements): (Vec<_>, Vec<_>) = child
                    .named_children(&mut inner)
                    .filter(|n| !is_comment(n))
                    .partition(|n| n.kind() == "switch_label");
                groups.push(SwitchGroup {
                    labels,
                    statements,
                    arrow: true,
                });
            }
            "switch_label" => match groups.last_mut() {
                Some(g) if !g.arrow && g.statements.is_empty() => g.labels.push(child),
                _ => groups.push(SwitchGroup {
                    labels: vec![child],
                    statements: Vec::new(),
                    arrow: false,
                }),
            },
            _ if is_comment(&child) => {}
            _ => {
                if let Some(g) = groups.last_mut() {
                    g.statements.push(child);
                }
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests;
