//! Macro expansion (spec §4.4). Operates directly over AST trees rather
//! than round-tripping through CST text: a macro call's body is cloned,
//! `<body>`/parameter references are substituted, and the result is
//! recursively re-walked so macros may expand into other macros. Spec §9
//! notes the source's own parameter substitution is "simplified" and may
//! leave some forms unsubstituted; this follows the same contract rather
//! than inventing a stronger guarantee the source never made.

use crisp_core::diagnostics::DiagnosticCode;
use crisp_core::{Diagnostics, FuelLimits, FuelTracker, Span};
use crisp_syntax::ast_lower::{
    AstArg, AstDefmacro, AstExpr, AstExprKind, AstNode, AstNodeKind, AstProgram,
};
use indexmap::{IndexMap, IndexSet};

pub fn expand_macros(program: &AstProgram, limits: FuelLimits) -> (AstProgram, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let macros: IndexMap<String, &AstDefmacro> =
        program.defmacros.iter().map(|m| (m.name.clone(), m)).collect();

    let mut out = program.clone();
    for tree in &mut out.trees {
        let mut tracker = FuelTracker::new(limits);
        let mut expanding = IndexSet::new();
        tree.body = expand_node(&tree.body, &macros, &mut expanding, &mut tracker, &mut diagnostics);
    }
    (out, diagnostics)
}

fn origin_span(node: &AstNode) -> Span {
    let range = node.origin.text_range();
    Span::new(range.start().into(), range.end().into())
}

fn expand_node(
    node: &AstNode,
    macros: &IndexMap<String, &AstDefmacro>,
    expanding: &mut IndexSet<String>,
    tracker: &mut FuelTracker,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    if tracker.enter().is_err() {
        diagnostics
            .report(DiagnosticCode::MACRO_DEPTH, origin_span(node))
            .emit();
        return node.clone();
    }

    let expanded = if let AstNodeKind::DefdecCall { name, args } = &node.kind {
        if let Some(mac) = macros.get(name.as_str()) {
            expand_macro_call(node, mac, args, macros, expanding, tracker, diagnostics)
        } else {
            recurse_node(node, macros, expanding, tracker, diagnostics)
        }
    } else {
        recurse_node(node, macros, expanding, tracker, diagnostics)
    };

    tracker.exit();
    expanded
}

fn recurse_node(
    node: &AstNode,
    macros: &IndexMap<String, &AstDefmacro>,
    expanding: &mut IndexSet<String>,
    tracker: &mut FuelTracker,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    let mut out = node.clone();
    out.kind = map_children(&node.kind, |child| {
        expand_node(child, macros, expanding, tracker, diagnostics)
    });
    out
}

fn map_children(
    kind: &AstNodeKind,
    mut f: impl FnMut(&AstNode) -> AstNode,
) -> AstNodeKind {
    match kind {
        AstNodeKind::Select(cs) => AstNodeKind::Select(cs.iter().map(&mut f).collect()),
        AstNodeKind::Sequence(cs) => AstNodeKind::Sequence(cs.iter().map(&mut f).collect()),
        AstNodeKind::Parallel { policy, children } => AstNodeKind::Parallel {
            policy: *policy,
            children: children.iter().map(&mut f).collect(),
        },
        AstNodeKind::Guard { cond, body } => AstNodeKind::Guard {
            cond: cond.clone(),
            body: Box::new(f(body)),
        },
        AstNodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => AstNodeKind::If {
            cond: cond.clone(),
            then_branch: Box::new(f(then_branch)),
            else_branch: else_branch.as_ref().map(|e| Box::new(f(e))),
        },
        AstNodeKind::Invert(b) => AstNodeKind::Invert(Box::new(f(b))),
        AstNodeKind::Repeat { count, body } => AstNodeKind::Repeat {
            count: *count,
            body: Box::new(f(body)),
        },
        AstNodeKind::Timeout { seconds, body } => AstNodeKind::Timeout {
            seconds: *seconds,
            body: Box::new(f(body)),
        },
        AstNodeKind::Cooldown { seconds, body } => AstNodeKind::Cooldown {
            seconds: *seconds,
            body: Box::new(f(body)),
        },
        AstNodeKind::While { cond, body } => AstNodeKind::While {
            cond: cond.clone(),
            body: Box::new(f(body)),
        },
        AstNodeKind::Reactive { cond, body } => AstNodeKind::Reactive {
            cond: cond.clone(),
            body: Box::new(f(body)),
        },
        AstNodeKind::ReactiveSelect(cs) => AstNodeKind::ReactiveSelect(cs.iter().map(&mut f).collect()),
        AstNodeKind::DefdecCall { name, args } => AstNodeKind::DefdecCall {
            name: name.clone(),
            args: args
                .iter()
                .map(|a| match a {
                    AstArg::Node(n) => AstArg::Node(f(n)),
                    AstArg::Expr(e) => AstArg::Expr(e.clone()),
                })
                .collect(),
        },
        other => other.clone(),
    }
}

fn expand_macro_call(
    call_node: &AstNode,
    mac: &AstDefmacro,
    args: &[AstArg],
    macros: &IndexMap<String, &AstDefmacro>,
    expanding: &mut IndexSet<String>,
    tracker: &mut FuelTracker,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    if expanding.contains(&mac.name) {
        diagnostics
            .report(DiagnosticCode::MACRO_CYCLE, origin_span(call_node))
            .message(format!("macro {} expands into itself", mac.name))
            .emit();
        return error_node(call_node);
    }
    if args.len() < mac.params.len() {
        diagnostics
            .report(DiagnosticCode::MACRO_ARITY, origin_span(call_node))
            .message(format!(
                "macro {} expects {} arguments, found {}",
                mac.name,
                mac.params.len(),
                args.len()
            ))
            .emit();
        return error_node(call_node);
    }

    let param_args = &args[..mac.params.len()];
    let body_arg = args.get(mac.params.len());

    expanding.insert(mac.name.clone());
    let substituted = substitute_node(&mac.body, &mac.params, param_args, body_arg, diagnostics);
    let result = expand_node(&substituted, macros, expanding, tracker, diagnostics);
    expanding.shift_remove(&mac.name);
    result
}

fn substitute_node(
    template: &AstNode,
    params: &[String],
    param_args: &[AstArg],
    body_arg: Option<&AstArg>,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    match &template.kind {
        AstNodeKind::BodyPlaceholder => match body_arg {
            Some(AstArg::Node(n)) => n.clone(),
            Some(AstArg::Expr(e)) => AstNode {
                kind: AstNodeKind::Check(e.clone()),
                origin: template.origin.clone(),
            },
            None => {
                diagnostics
                    .report(DiagnosticCode::MACRO_LOWER_FAIL, origin_span(template))
                    .message("macro body placeholder has no corresponding call body")
                    .emit();
                error_node(template)
            }
        },
        AstNodeKind::Check(cond) => AstNode {
            kind: AstNodeKind::Check(substitute_expr(cond, params, param_args)),
            origin: template.origin.clone(),
        },
        _ => {
            let mut out = template.clone();
            out.kind = map_children(&template.kind, |child| {
                substitute_node(child, params, param_args, body_arg, diagnostics)
            });
            out = substitute_node_exprs(out, params, param_args);
            out
        }
    }
}

/// Substitutes parameter references inside the non-body expression fields
/// of composite forms (conditions, call arguments) that `map_children`
/// does not itself recurse into.
fn substitute_node_exprs(mut node: AstNode, params: &[String], param_args: &[AstArg]) -> AstNode {
    node.kind = match node.kind {
        AstNodeKind::Guard { cond, body } => AstNodeKind::Guard {
            cond: substitute_expr(&cond, params, param_args),
            body,
        },
        AstNodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => AstNodeKind::If {
            cond: substitute_expr(&cond, params, param_args),
            then_branch,
            else_branch,
        },
        AstNodeKind::While { cond, body } => AstNodeKind::While {
            cond: substitute_expr(&cond, params, param_args),
            body,
        },
        AstNodeKind::Reactive { cond, body } => AstNodeKind::Reactive {
            cond: substitute_expr(&cond, params, param_args),
            body,
        },
        AstNodeKind::ActionCall { member, args } => AstNodeKind::ActionCall {
            member,
            args: args.iter().map(|a| substitute_expr(a, params, param_args)).collect(),
        },
        AstNodeKind::DefdecCall { name, args } => AstNodeKind::DefdecCall {
            name,
            args: args
                .iter()
                .map(|a| match a {
                    AstArg::Expr(e) => AstArg::Expr(substitute_expr(e, params, param_args)),
                    AstArg::Node(n) => AstArg::Node(n.clone()),
                })
                .collect(),
        },
        other => other,
    };
    node
}

/// Substitutes a parameter identifier appearing in expression position
/// (spec §4.4). Only `AstArg::Expr` arguments substitute cleanly; a
/// `Node`-valued argument bound to an expression-position parameter is left
/// as `ParamRef`, matching the source's documented limitation (spec §9).
fn substitute_expr(expr: &AstExpr, params: &[String], param_args: &[AstArg]) -> AstExpr {
    match &expr.kind {
        AstExprKind::ParamRef(name) => {
            if let Some(idx) = params.iter().position(|p| p == name) {
                if let Some(AstArg::Expr(replacement)) = param_args.get(idx) {
                    return replacement.clone();
                }
            }
            expr.clone()
        }
        AstExprKind::BinaryExpr { op, lhs, rhs } => AstExpr {
            kind: AstExprKind::BinaryExpr {
                op: *op,
                lhs: Box::new(substitute_expr(lhs, params, param_args)),
                rhs: Box::new(substitute_expr(rhs, params, param_args)),
            },
            origin: expr.origin.clone(),
        },
        AstExprKind::UnaryExpr { op, operand } => AstExpr {
            kind: AstExprKind::UnaryExpr {
                op: *op,
                operand: Box::new(substitute_expr(operand, params, param_args)),
            },
            origin: expr.origin.clone(),
        },
        AstExprKind::LogicExpr { is_and, operands } => AstExpr {
            kind: AstExprKind::LogicExpr {
                is_and: *is_and,
                operands: operands.iter().map(|o| substitute_expr(o, params, param_args)).collect(),
            },
            origin: expr.origin.clone(),
        },
        AstExprKind::CallExpr { member, args } => AstExpr {
            kind: AstExprKind::CallExpr {
                member: member.clone(),
                args: args.iter().map(|a| substitute_expr(a, params, param_args)).collect(),
            },
            origin: expr.origin.clone(),
        },
        _ => expr.clone(),
    }
}

fn error_node(origin: &AstNode) -> AstNode {
    AstNode {
        kind: AstNodeKind::Error,
        origin: origin.origin.clone(),
    }
}

#[cfg(test)]
mod macro_expander_tests {
    use super::*;
    use crisp_core::FuelLimits;
    use crisp_syntax::ast_lower::{lower as lower_ast, AstNodeKind};
    use crisp_syntax::parser::core::parse;

    fn expand_source(source: &str) -> AstProgram {
        let result = parse(source);
        let (ast, _) = lower_ast(&result.root);
        let (expanded, _) = expand_macros(&ast, FuelLimits::default());
        expanded
    }

    #[test]
    fn retry_macro_substitutes_body_placeholder_with_the_call_body() {
        let expanded = expand_source("(defmacro retry () (repeat 3 <body>)) (tree Main (retry (.Attack)))");
        let tree = &expanded.trees[0];
        let AstNodeKind::Repeat { count, body } = &tree.body.kind else {
            panic!("expected Repeat, got {:?}", tree.body.kind)
        };
        assert_eq!(*count, 3);
        assert!(matches!(body.kind, AstNodeKind::ActionCall { .. }));
    }

    #[test]
    fn self_referential_macro_is_flagged_and_not_infinitely_expanded() {
        let expanded = expand_source(
            "(defmacro loopy () (seq (loopy (.X)))) (tree Main (loopy (.X)))",
        );
        // Expansion must terminate; the exact recovered shape is secondary.
        assert!(!expanded.trees.is_empty());
    }
}
