//! User-defined decorator expansion (spec §4.5). Runs after macro
//! expansion: any `DefdecCall` still present either names a `defdec` or is
//! genuinely unknown (BS0023). A decorator call's last argument is the node
//! it decorates and substitutes for `<body>`; leading arguments bind to the
//! decorator's declared parameters the same way a macro call's do.

use crisp_core::diagnostics::DiagnosticCode;
use crisp_core::{Diagnostics, FuelLimits, FuelTracker, Span};
use crisp_syntax::ast_lower::{AstArg, AstDefdec, AstNode, AstNodeKind, AstProgram};
use indexmap::{IndexMap, IndexSet};

pub fn expand_decorators(program: &AstProgram, limits: FuelLimits) -> (AstProgram, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let defdecs: IndexMap<String, &AstDefdec> =
        program.defdecs.iter().map(|d| (d.name.clone(), d)).collect();

    let mut out = program.clone();
    for tree in &mut out.trees {
        let mut tracker = FuelTracker::new(limits);
        let mut expanding = IndexSet::new();
        tree.body = expand_node(&tree.body, &defdecs, &mut expanding, &mut tracker, &mut diagnostics);
    }
    (out, diagnostics)
}

fn origin_span(node: &AstNode) -> Span {
    let range = node.origin.text_range();
    Span::new(range.start().into(), range.end().into())
}

fn expand_node(
    node: &AstNode,
    defdecs: &IndexMap<String, &AstDefdec>,
    expanding: &mut IndexSet<String>,
    tracker: &mut FuelTracker,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    if tracker.enter().is_err() {
        diagnostics
            .report(DiagnosticCode::MACRO_DEPTH, origin_span(node))
            .message("decorator expansion exceeded the depth limit")
            .emit();
        return node.clone();
    }

    let expanded = if let AstNodeKind::DefdecCall { name, args } = &node.kind {
        if let Some(dec) = defdecs.get(name.as_str()) {
            expand_decorator_call(node, dec, args, defdecs, expanding, tracker, diagnostics)
        } else {
            diagnostics
                .report(DiagnosticCode::UNKNOWN_DEFDEC, origin_span(node))
                .message(format!("unknown decorator: {}", name))
                .emit();
            recurse(node, defdecs, expanding, tracker, diagnostics)
        }
    } else {
        recurse(node, defdecs, expanding, tracker, diagnostics)
    };

    tracker.exit();
    expanded
}

fn recurse(
    node: &AstNode,
    defdecs: &IndexMap<String, &AstDefdec>,
    expanding: &mut IndexSet<String>,
    tracker: &mut FuelTracker,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    let mut out = node.clone();
    out.kind = map_children(&node.kind, |child| {
        expand_node(child, defdecs, expanding, tracker, diagnostics)
    });
    out
}

fn map_children(kind: &AstNodeKind, mut f: impl FnMut(&AstNode) -> AstNode) -> AstNodeKind {
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

fn expand_decorator_call(
    call_node: &AstNode,
    dec: &AstDefdec,
    args: &[AstArg],
    defdecs: &IndexMap<String, &AstDefdec>,
    expanding: &mut IndexSet<String>,
    tracker: &mut FuelTracker,
    diagnostics: &mut Diagnostics,
) -> AstNode {
    if expanding.contains(&dec.name) {
        diagnostics
            .report(DiagnosticCode::DEFDEC_CYCLE, origin_span(call_node))
            .message(format!("decorator {} is self-referential", dec.name))
            .emit();
        return error_node(call_node);
    }
    if args.len() < dec.params.len() + 1 {
        diagnostics
            .report(DiagnosticCode::DEFDEC_ARITY, origin_span(call_node))
            .message(format!(
                "decorator {} expects {} arguments, found {}",
                dec.name,
                dec.params.len() + 1,
                args.len()
            ))
            .emit();
        return error_node(call_node);
    }

    let param_args = &args[..dec.params.len()];
    let body_arg = args.get(dec.params.len());

    expanding.insert(dec.name.clone());
    let substituted = substitute_node(&dec.body, &dec.params, param_args, body_arg, diagnostics);
    let result = expand_node(&substituted, defdecs, expanding, tracker, diagnostics);
    expanding.shift_remove(&dec.name);
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
                    .message("decorator body placeholder has no corresponding decorated node")
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

fn substitute_node_exprs(
    mut node: AstNode,
    params: &[String],
    param_args: &[AstArg],
) -> AstNode {
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

fn substitute_expr(
    expr: &crisp_syntax::ast_lower::AstExpr,
    params: &[String],
    param_args: &[AstArg],
) -> crisp_syntax::ast_lower::AstExpr {
    use crisp_syntax::ast_lower::{AstExpr, AstExprKind};
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
mod decorator_expander_tests {
    use super::*;
    use crisp_core::FuelLimits;
    use crisp_syntax::ast_lower::{lower as lower_ast, AstNodeKind};
    use crisp_syntax::parser::core::parse;

    fn expand_source(source: &str) -> AstProgram {
        let result = parse(source);
        let (ast, _) = lower_ast(&result.root);
        let (expanded, _) = expand_decorators(&ast, FuelLimits::default());
        expanded
    }

    #[test]
    fn invert_decorator_wraps_the_decorated_node_in_its_body() {
        let expanded =
            expand_source("(defdec fails-loud () (invert <body>)) (tree Main (fails-loud (.Open)))");
        let tree = &expanded.trees[0];
        assert!(matches!(tree.body.kind, AstNodeKind::Invert(_)));
    }

    #[test]
    fn unknown_decorator_name_is_reported_and_left_in_place() {
        let result = parse("(tree Main (mystery-decorator (.Open)))");
        let (ast, _) = lower_ast(&result.root);
        let (expanded, diags) = expand_decorators(&ast, FuelLimits::default());
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::UNKNOWN_DEFDEC));
        assert!(matches!(expanded.trees[0].body.kind, AstNodeKind::DefdecCall { .. }));
    }
}
