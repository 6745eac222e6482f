//! AST→IR lowering (spec §4.7): bottom-up type assignment with implicit
//! numeric conversion insertion, followed by a pre-order id-assignment pass.

use crate::ir::{Ir, IrKind};
use crisp_core::diagnostics::DiagnosticCode;
use crisp_core::{Diagnostics, Span, TypeRef};
use crisp_syntax::ast_lower::{
    AstArg, AstExpr, AstExprKind, AstNode, AstNodeKind, AstProgram, BinaryOp, Literal, UnaryOp,
};

#[derive(Debug, Clone)]
pub struct IrTree {
    pub name: String,
    pub blackboard_type: Option<String>,
    pub body: Ir,
}

#[derive(Debug, Clone, Default)]
pub struct IrProgram {
    pub trees: Vec<IrTree>,
}

/// Lowers every tree in `program` to IR, then assigns stable pre-order ids
/// across the whole program (spec §4.7's "unique within a compilation
/// unit").
pub fn lower_program(program: &AstProgram) -> (IrProgram, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut trees = Vec::with_capacity(program.trees.len());
    for tree in &program.trees {
        let body = lower_node(&tree.body, &mut diagnostics);
        trees.push(IrTree {
            name: tree.name.clone(),
            blackboard_type: tree.blackboard_type.clone(),
            body,
        });
    }
    let mut next_id = 0u32;
    for tree in &mut trees {
        assign_ids(&mut tree.body, &mut next_id);
    }
    (IrProgram { trees }, diagnostics)
}

fn assign_ids(node: &mut Ir, next_id: &mut u32) {
    node.id = Some(*next_id);
    *next_id += 1;
    for child in children_mut(&mut node.kind) {
        assign_ids(child, next_id);
    }
}

fn children_mut(kind: &mut IrKind) -> Vec<&mut Ir> {
    use IrKind::*;
    match kind {
        Selector(cs) | Sequence(cs) | ReactiveSelect(cs) => cs.iter_mut().collect(),
        Parallel { children, .. } => children.iter_mut().collect(),
        Guard { cond, body } => vec![cond.as_mut(), body.as_mut()],
        If {
            cond,
            then_branch,
            else_branch,
        } => {
            let mut v = vec![cond.as_mut(), then_branch.as_mut()];
            if let Some(e) = else_branch {
                v.push(e.as_mut());
            }
            v
        }
        Invert(b) | Repeat { body: b, .. } | Timeout { body: b, .. } | Cooldown { body: b, .. } => {
            vec![b.as_mut()]
        }
        While { cond, body } | Reactive { cond, body } => vec![cond.as_mut(), body.as_mut()],
        Condition(e) => vec![e.as_mut()],
        Action { args, .. } | Call { args, .. } => args.iter_mut().collect(),
        BinaryOp { lhs, rhs, .. } => vec![lhs.as_mut(), rhs.as_mut()],
        UnaryOp { operand, .. } => vec![operand.as_mut()],
        LogicOp { operands, .. } => operands.iter_mut().collect(),
        Convert(inner, _) => vec![inner.as_mut()],
        TreeRef(_) | Literal(_) | MemberLoad(_) | BlackboardLoad(_) => vec![],
    }
}

fn span_of(node: &AstNode) -> Span {
    let range = node.origin.text_range();
    Span::new(range.start().into(), range.end().into())
}

fn span_of_expr(expr: &AstExpr) -> Span {
    let range = expr.origin.text_range();
    Span::new(range.start().into(), range.end().into())
}

fn lower_node(node: &AstNode, diagnostics: &mut Diagnostics) -> Ir {
    let span = span_of(node);
    let kind = match &node.kind {
        AstNodeKind::Select(children) => {
            IrKind::Selector(children.iter().map(|c| lower_node(c, diagnostics)).collect())
        }
        AstNodeKind::Sequence(children) => {
            IrKind::Sequence(children.iter().map(|c| lower_node(c, diagnostics)).collect())
        }
        AstNodeKind::Parallel { policy, children } => IrKind::Parallel {
            policy: *policy,
            children: children.iter().map(|c| lower_node(c, diagnostics)).collect(),
        },
        AstNodeKind::Check(cond) => {
            IrKind::Condition(Box::new(lower_expr(cond, diagnostics)))
        }
        AstNodeKind::Guard { cond, body } => IrKind::Guard {
            cond: Box::new(lower_expr(cond, diagnostics)),
            body: Box::new(lower_node(body, diagnostics)),
        },
        AstNodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => IrKind::If {
            cond: Box::new(lower_expr(cond, diagnostics)),
            then_branch: Box::new(lower_node(then_branch, diagnostics)),
            else_branch: else_branch.as_ref().map(|e| Box::new(lower_node(e, diagnostics))),
        },
        AstNodeKind::Invert(body) => IrKind::Invert(Box::new(lower_node(body, diagnostics))),
        AstNodeKind::Repeat { count, body } => IrKind::Repeat {
            count: *count,
            body: Box::new(lower_node(body, diagnostics)),
        },
        AstNodeKind::Timeout { seconds, body } => IrKind::Timeout {
            seconds: *seconds,
            body: Box::new(lower_node(body, diagnostics)),
        },
        AstNodeKind::Cooldown { seconds, body } => IrKind::Cooldown {
            seconds: *seconds,
            body: Box::new(lower_node(body, diagnostics)),
        },
        AstNodeKind::While { cond, body } => IrKind::While {
            cond: Box::new(lower_expr(cond, diagnostics)),
            body: Box::new(lower_node(body, diagnostics)),
        },
        AstNodeKind::Reactive { cond, body } => IrKind::Reactive {
            cond: Box::new(lower_expr(cond, diagnostics)),
            body: Box::new(lower_node(body, diagnostics)),
        },
        AstNodeKind::ReactiveSelect(children) => {
            IrKind::ReactiveSelect(children.iter().map(|c| lower_node(c, diagnostics)).collect())
        }
        AstNodeKind::Ref { name, .. } => IrKind::TreeRef(name.clone()),
        AstNodeKind::ActionCall { member, args } => {
            let (declaring_type, name) = split_member(member);
            IrKind::Action {
                declaring_type,
                name,
                args: args.iter().map(|a| lower_expr(a, diagnostics)).collect(),
            }
        }
        AstNodeKind::DefdecCall { name, args } => {
            // A leftover decorator call at IR-lowering time means the
            // decorator expander (spec §4.5) did not run or failed to
            // resolve it; lower conservatively as an opaque action so
            // lowering still produces a tree instead of aborting.
            IrKind::Action {
                declaring_type: "this".to_string(),
                name: name.clone(),
                args: args
                    .iter()
                    .filter_map(|a| match a {
                        AstArg::Expr(e) => Some(lower_expr(e, diagnostics)),
                        AstArg::Node(_) => None,
                    })
                    .collect(),
            }
        }
        AstNodeKind::BodyPlaceholder => IrKind::Literal(Literal::Null),
        AstNodeKind::Error => IrKind::Literal(Literal::Null),
    };
    let ty = infer_node_type(&kind);
    Ir {
        id: None,
        ty,
        span,
        kind,
    }
}

fn infer_node_type(kind: &IrKind) -> TypeRef {
    match kind {
        IrKind::Action { .. } => TypeRef::BtStatus,
        _ => TypeRef::Unknown,
    }
}

fn split_member(member: &[String]) -> (String, String) {
    match member.len() {
        0 => ("this".to_string(), String::new()),
        1 => ("this".to_string(), member[0].clone()),
        _ => (member[0].clone(), member[1..].join(".")),
    }
}

fn lower_expr(expr: &AstExpr, diagnostics: &mut Diagnostics) -> Ir {
    let span = span_of_expr(expr);
    match &expr.kind {
        AstExprKind::Literal(lit) => {
            let ty = literal_type(lit);
            Ir {
                id: None,
                ty,
                span,
                kind: IrKind::Literal(lit.clone()),
            }
        }
        AstExprKind::MemberAccess(chain) => Ir {
            id: None,
            ty: TypeRef::Unknown,
            span,
            kind: IrKind::MemberLoad(chain.clone()),
        },
        AstExprKind::BlackboardAccess(chain) => Ir {
            id: None,
            ty: TypeRef::Unknown,
            span,
            kind: IrKind::BlackboardLoad(chain.clone()),
        },
        AstExprKind::UnaryExpr { op, operand } => {
            let lowered_operand = lower_expr(operand, diagnostics);
            let ty = match op {
                UnaryOp::Not => TypeRef::Bool,
                UnaryOp::Negate => lowered_operand.ty.clone(),
            };
            Ir {
                id: None,
                ty,
                span,
                kind: IrKind::UnaryOp {
                    op: *op,
                    operand: Box::new(lowered_operand),
                },
            }
        }
        AstExprKind::LogicExpr { is_and, operands } => {
            let lowered = operands.iter().map(|o| lower_expr(o, diagnostics)).collect();
            Ir {
                id: None,
                ty: TypeRef::Bool,
                span,
                kind: IrKind::LogicOp {
                    is_and: *is_and,
                    operands: lowered,
                },
            }
        }
        AstExprKind::BinaryExpr { op, lhs, rhs } => lower_binary(*op, lhs, rhs, span, diagnostics),
        AstExprKind::CallExpr { member, args } => {
            let (declaring_type, name) = split_member(member);
            Ir {
                id: None,
                ty: TypeRef::Unknown,
                span,
                kind: IrKind::Call {
                    declaring_type,
                    name,
                    args: args.iter().map(|a| lower_expr(a, diagnostics)).collect(),
                },
            }
        }
        AstExprKind::ParamRef(name) => {
            diagnostics
                .report(DiagnosticCode::PARAM_UNSUBSTITUTED, span)
                .message(format!("parameter {} survived expansion into the final tree", name))
                .emit();
            Ir {
                id: None,
                ty: TypeRef::Unknown,
                span,
                kind: IrKind::Literal(Literal::Null),
            }
        }
        AstExprKind::Error => Ir {
            id: None,
            ty: TypeRef::Unknown,
            span,
            kind: IrKind::Literal(Literal::Null),
        },
    }
}

fn literal_type(lit: &Literal) -> TypeRef {
    match lit {
        Literal::Int(_) => TypeRef::Int,
        Literal::Float(_) => TypeRef::Float,
        Literal::String(_) => TypeRef::String,
        Literal::Bool(_) => TypeRef::Bool,
        Literal::Null => TypeRef::Null,
        Literal::Enum(type_name, _) => TypeRef::Enum(type_name.clone()),
    }
}

/// Implements the numeric-unification rule (spec §4.7): Int paired with
/// Float on either side gets the Int operand wrapped in `Convert(_, Float)`
/// and the outer type becomes Float. Comparisons are always Bool;
/// arithmetic on same-type or `unknown` operands carries the left type
/// through unconverted.
fn lower_binary(op: BinaryOp, lhs: &AstExpr, rhs: &AstExpr, span: Span, diagnostics: &mut Diagnostics) -> Ir {
    let mut lowered_lhs = lower_expr(lhs, diagnostics);
    let mut lowered_rhs = lower_expr(rhs, diagnostics);

    let (lhs_ty, rhs_ty) = (lowered_lhs.ty.clone(), lowered_rhs.ty.clone());
    let outer_ty = if op.is_comparison() {
        if (lhs_ty == TypeRef::Int && rhs_ty == TypeRef::Float) {
            lowered_lhs = convert(lowered_lhs, TypeRef::Float);
        } else if lhs_ty == TypeRef::Float && rhs_ty == TypeRef::Int {
            lowered_rhs = convert(lowered_rhs, TypeRef::Float);
        }
        TypeRef::Bool
    } else if lhs_ty == TypeRef::Int && rhs_ty == TypeRef::Float {
        lowered_lhs = convert(lowered_lhs, TypeRef::Float);
        TypeRef::Float
    } else if lhs_ty == TypeRef::Float && rhs_ty == TypeRef::Int {
        lowered_rhs = convert(lowered_rhs, TypeRef::Float);
        TypeRef::Float
    } else {
        lhs_ty
    };

    Ir {
        id: None,
        ty: outer_ty,
        span,
        kind: IrKind::BinaryOp {
            op,
            lhs: Box::new(lowered_lhs),
            rhs: Box::new(lowered_rhs),
        },
    }
}

fn convert(operand: Ir, target: TypeRef) -> Ir {
    let span = operand.span;
    Ir {
        id: None,
        ty: target.clone(),
        span,
        kind: IrKind::Convert(Box::new(operand), target),
    }
}

#[cfg(test)]
mod ast_to_ir_tests {
    use super::*;
    use crisp_syntax::ast_lower::lower as lower_ast;
    use crisp_syntax::parser::core::parse;

    fn lower_source(source: &str) -> IrProgram {
        let result = parse(source);
        let (ast, _) = lower_ast(&result.root);
        let (ir, _) = lower_program(&ast);
        ir
    }

    #[test]
    fn int_plus_float_inserts_a_convert_and_promotes_to_float() {
        let ir = lower_source("(tree T (check (< (+ 1 2.0) 5.0)))");
        let IrKind::Condition(cond) = &ir.trees[0].body.kind else {
            panic!()
        };
        let IrKind::BinaryOp { lhs, .. } = &cond.kind else {
            panic!()
        };
        assert_eq!(cond.ty, TypeRef::Bool);
        let IrKind::BinaryOp { lhs: inner_lhs, .. } = &lhs.kind else {
            panic!()
        };
        assert_eq!(lhs.ty, TypeRef::Float);
        assert!(matches!(inner_lhs.kind, IrKind::Convert(_, TypeRef::Float)));
    }

    #[test]
    fn action_call_return_type_is_bt_status() {
        let ir = lower_source("(tree T (select (.Patrol)))");
        let IrKind::Selector(children) = &ir.trees[0].body.kind else {
            panic!()
        };
        assert_eq!(children[0].ty, TypeRef::BtStatus);
    }

    #[test]
    fn ids_are_assigned_pre_order_and_unique() {
        let ir = lower_source("(tree T (select (.Flee) (.Patrol)))");
        let root = &ir.trees[0].body;
        assert_eq!(root.id, Some(0));
        let IrKind::Selector(children) = &root.kind else {
            panic!()
        };
        assert_eq!(children[0].id, Some(1));
        assert_eq!(children[1].id, Some(2));
    }
}
