//! Cross-tree reference resolver (spec §4.6). Runs after decorator
//! expansion: every `Ref` node's `resolved` cell is populated with the name
//! of the tree it points to, and the call graph is checked for cycles.

use crisp_core::diagnostics::DiagnosticCode;
use crisp_core::{Diagnostics, Span};
use crisp_syntax::ast_lower::{AstNode, AstNodeKind, AstProgram};
use indexmap::{IndexMap, IndexSet};

pub fn resolve_references(program: &AstProgram) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let tree_names: IndexSet<String> = program.trees.iter().map(|t| t.name.clone()).collect();

    let mut edges: IndexMap<String, Vec<(String, Span)>> = IndexMap::new();
    for tree in &program.trees {
        let mut refs = Vec::new();
        collect_refs(&tree.body, &mut refs);
        for (name, span) in &refs {
            if !tree_names.contains(name) {
                diagnostics
                    .report(DiagnosticCode::TREE_REF_UNDEFINED, *span)
                    .message(format!("undefined tree reference: {}", name))
                    .emit();
            }
        }
        edges.entry(tree.name.clone()).or_default().extend(refs);
    }

    for tree in &program.trees {
        resolve_node(&tree.body, &tree_names);
    }

    detect_cycles(&edges, &mut diagnostics);
    diagnostics
}

fn collect_refs(node: &AstNode, out: &mut Vec<(String, Span)>) {
    if let AstNodeKind::Ref { name, .. } = &node.kind {
        out.push((name.clone(), span_of(node)));
    }
    for child in children(node) {
        collect_refs(child, out);
    }
}

fn resolve_node(node: &AstNode, tree_names: &IndexSet<String>) {
    if let AstNodeKind::Ref { name, resolved } = &node.kind {
        if tree_names.contains(name) {
            *resolved.borrow_mut() = Some(name.clone());
        }
    }
    for child in children(node) {
        resolve_node(child, tree_names);
    }
}

fn children(node: &AstNode) -> Vec<&AstNode> {
    match &node.kind {
        AstNodeKind::Select(cs) | AstNodeKind::Sequence(cs) | AstNodeKind::ReactiveSelect(cs) => {
            cs.iter().collect()
        }
        AstNodeKind::Parallel { children, .. } => children.iter().collect(),
        AstNodeKind::Guard { body, .. }
        | AstNodeKind::Invert(body)
        | AstNodeKind::Repeat { body, .. }
        | AstNodeKind::Timeout { body, .. }
        | AstNodeKind::Cooldown { body, .. }
        | AstNodeKind::While { body, .. }
        | AstNodeKind::Reactive { body, .. } => vec![body.as_ref()],
        AstNodeKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            let mut v = vec![then_branch.as_ref()];
            if let Some(e) = else_branch {
                v.push(e.as_ref());
            }
            v
        }
        _ => Vec::new(),
    }
}

fn span_of(node: &AstNode) -> Span {
    let range = node.origin.text_range();
    Span::new(range.start().into(), range.end().into())
}

/// DFS with visited/on-stack sets (spec §4.6 phase 2). Continues across the
/// whole graph even after reporting a cycle so every cycle surfaces in one
/// pass, rather than stopping at the first one found.
fn detect_cycles(edges: &IndexMap<String, Vec<(String, Span)>>, diagnostics: &mut Diagnostics) {
    let mut visited: IndexSet<String> = IndexSet::new();
    for start in edges.keys() {
        if !visited.contains(start) {
            let mut on_stack: IndexSet<String> = IndexSet::new();
            let mut path: Vec<String> = Vec::new();
            dfs(start, edges, &mut visited, &mut on_stack, &mut path, diagnostics);
        }
    }
}

fn dfs(
    node: &str,
    edges: &IndexMap<String, Vec<(String, Span)>>,
    visited: &mut IndexSet<String>,
    on_stack: &mut IndexSet<String>,
    path: &mut Vec<String>,
    diagnostics: &mut Diagnostics,
) {
    visited.insert(node.to_string());
    on_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(neighbors) = edges.get(node) {
        for (to, span) in neighbors {
            if on_stack.contains(to) {
                let cycle_start = path.iter().position(|n| n == to).unwrap_or(0);
                let mut cycle: Vec<&str> = path[cycle_start..].iter().map(String::as_str).collect();
                cycle.push(to.as_str());
                diagnostics
                    .report(DiagnosticCode::TREE_REF_CYCLE, *span)
                    .message(format!("cycle: {}", cycle.join(" \u{2192} ")))
                    .emit();
            } else if !visited.contains(to) {
                dfs(to, edges, visited, on_stack, path, diagnostics);
            }
        }
    }

    on_stack.shift_remove(node);
    path.pop();
}

#[cfg(test)]
mod resolve_tests {
    use super::*;
    use crisp_syntax::ast_lower::lower as lower_ast;
    use crisp_syntax::parser::core::parse;

    fn resolve_source(source: &str) -> (AstProgram, Diagnostics) {
        let result = parse(source);
        let (ast, _) = lower_ast(&result.root);
        let diags = resolve_references(&ast);
        (ast, diags)
    }

    #[test]
    fn ref_to_an_existing_tree_resolves_without_diagnostics() {
        let (ast, diags) = resolve_source("(tree A (select (ref B))) (tree B (select (.Idle)))");
        assert!(diags.is_empty());
        let AstNodeKind::Ref { resolved, .. } = &ast.trees[0].body_first_child().kind else {
            panic!("expected Ref as first select child")
        };
        assert_eq!(resolved.borrow().as_deref(), Some("B"));
    }

    #[test]
    fn ref_to_a_missing_tree_is_reported() {
        let (_, diags) = resolve_source("(tree A (ref Missing))");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::TREE_REF_UNDEFINED));
    }

    #[test]
    fn mutual_references_are_reported_as_a_cycle() {
        let (_, diags) = resolve_source("(tree A (ref B)) (tree B (ref A))");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::TREE_REF_CYCLE));
    }

    #[test]
    fn self_reference_is_reported_as_a_cycle() {
        let (_, diags) = resolve_source("(tree A (ref A))");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::TREE_REF_CYCLE));
    }

    trait FirstChild {
        fn body_first_child(&self) -> &AstNode;
    }

    impl FirstChild for crisp_syntax::ast_lower::AstTree {
        fn body_first_child(&self) -> &AstNode {
            match &self.body.kind {
                AstNodeKind::Select(cs) => &cs[0],
                _ => &self.body,
            }
        }
    }
}
