//! Pass 4: convert fusion (spec §4.8). A doubled conversion to the same
//! type collapses to one; converting an Int literal to Float folds the
//! conversion into the literal itself rather than leaving it as a node.

use crate::ir::{Ir, IrKind};
use crisp_core::TypeRef;
use crisp_syntax::ast_lower::Literal;

pub fn fuse(ir: &Ir) -> Ir {
    let kind = fuse_children(&ir.kind);
    match &kind {
        IrKind::Convert(inner, to) => {
            if let IrKind::Convert(innermost, inner_to) = &inner.kind {
                if inner_to == to {
                    return Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind: IrKind::Convert(innermost.clone(), to.clone()) };
                }
            }
            if let (IrKind::Literal(Literal::Int(v)), TypeRef::Float) = (&inner.kind, to) {
                return Ir {
                    id: ir.id,
                    ty: TypeRef::Float,
                    span: ir.span,
                    kind: IrKind::Literal(Literal::Float(*v as f32)),
                };
            }
            Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind }
        }
        _ => Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind },
    }
}

fn fuse_children(kind: &IrKind) -> IrKind {
    use IrKind::*;
    match kind {
        Selector(cs) => Selector(cs.iter().map(fuse).collect()),
        Sequence(cs) => Sequence(cs.iter().map(fuse).collect()),
        ReactiveSelect(cs) => ReactiveSelect(cs.iter().map(fuse).collect()),
        Parallel { policy, children } => Parallel {
            policy: *policy,
            children: children.iter().map(fuse).collect(),
        },
        Guard { cond, body } => Guard { cond: Box::new(fuse(cond)), body: Box::new(fuse(body)) },
        If { cond, then_branch, else_branch } => If {
            cond: Box::new(fuse(cond)),
            then_branch: Box::new(fuse(then_branch)),
            else_branch: else_branch.as_ref().map(|e| Box::new(fuse(e))),
        },
        Invert(b) => Invert(Box::new(fuse(b))),
        Repeat { count, body } => Repeat { count: *count, body: Box::new(fuse(body)) },
        Timeout { seconds, body } => Timeout { seconds: *seconds, body: Box::new(fuse(body)) },
        Cooldown { seconds, body } => Cooldown { seconds: *seconds, body: Box::new(fuse(body)) },
        While { cond, body } => While { cond: Box::new(fuse(cond)), body: Box::new(fuse(body)) },
        Reactive { cond, body } => Reactive { cond: Box::new(fuse(cond)), body: Box::new(fuse(body)) },
        Condition(e) => Condition(Box::new(fuse(e))),
        Action { declaring_type, name, args } => Action {
            declaring_type: declaring_type.clone(),
            name: name.clone(),
            args: args.iter().map(fuse).collect(),
        },
        Call { declaring_type, name, args } => Call {
            declaring_type: declaring_type.clone(),
            name: name.clone(),
            args: args.iter().map(fuse).collect(),
        },
        BinaryOp { op, lhs, rhs } => BinaryOp { op: *op, lhs: Box::new(fuse(lhs)), rhs: Box::new(fuse(rhs)) },
        UnaryOp { op, operand } => UnaryOp { op: *op, operand: Box::new(fuse(operand)) },
        LogicOp { is_and, operands } => LogicOp { is_and: *is_and, operands: operands.iter().map(fuse).collect() },
        Convert(inner, to) => Convert(Box::new(fuse(inner)), to.clone()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod convert_fusion_tests {
    use super::*;
    use crisp_core::Span;

    #[test]
    fn doubled_conversion_to_the_same_type_collapses_to_one() {
        let innermost = Ir { id: None, ty: TypeRef::Int, span: Span::empty(0), kind: IrKind::MemberLoad(vec!["Ammo".into()]) };
        let once = Ir { id: Some(1), ty: TypeRef::Float, span: Span::empty(0), kind: IrKind::Convert(Box::new(innermost.clone()), TypeRef::Float) };
        let twice = Ir { id: Some(2), ty: TypeRef::Float, span: Span::empty(0), kind: IrKind::Convert(Box::new(once), TypeRef::Float) };
        let fused = fuse(&twice);
        let IrKind::Convert(inner, to) = fused.kind else { panic!() };
        assert_eq!(to, TypeRef::Float);
        assert!(matches!(inner.kind, IrKind::MemberLoad(_)));
    }

    #[test]
    fn converting_an_int_literal_to_float_folds_into_the_literal() {
        let int_lit = Ir { id: None, ty: TypeRef::Int, span: Span::empty(0), kind: IrKind::Literal(Literal::Int(3)) };
        let ir = Ir { id: Some(1), ty: TypeRef::Float, span: Span::empty(0), kind: IrKind::Convert(Box::new(int_lit), TypeRef::Float) };
        let fused = fuse(&ir);
        assert!(matches!(fused.kind, IrKind::Literal(Literal::Float(v)) if v == 3.0));
    }
}
